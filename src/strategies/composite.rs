//! Composite strategy: GF((2^32)^2) over an external base field.
//!
//! A 64-bit element is the pair (a0, a1) with a = a0 + a1*x in
//! GF(2^32)[x] / (x^2 + s*x + 1). All base-field arithmetic is delegated
//! to the [`BaseField32`](crate::base::BaseField32) collaborator; `s` is a
//! fixed constant chosen per base-field construction.

use crate::base::BaseField32;
use crate::region::{read_word, scalar_region, RegionSplit};

/// s for a primitive GF(2^32) base field.
pub(crate) const S_OVER_GF32: u32 = 1_000_012;

/// s when the base field is itself composite GF((2^16)^2).
pub(crate) const S_OVER_GF16_2: u32 = 1_000_587;

#[inline]
fn halves(a: u64) -> (u32, u32) {
    (a as u32, (a >> 32) as u32)
}

pub(crate) fn composite_multiply(base: &dyn BaseField32, s: u32, a: u64, b: u64) -> u64 {
    let (a0, a1) = halves(a);
    let (b0, b1) = halves(b);
    let a1b1 = base.multiply(a1, b1);

    let low = base.multiply(a0, b0) ^ a1b1;
    let high = base.multiply(a1, b0) ^ base.multiply(a0, b1) ^ base.multiply(a1b1, s);
    low as u64 | (high as u64) << 32
}

/// Inverse via the quadratic-extension identity: with d = a1*c1 chosen so
/// the x coefficient of a*c vanishes,
///   d = (a1*a0^-1) * (a1*a0^-1 + a0*a1^-1 + s)^-1,
///   c0 = (d + 1)*a0^-1,  c1 = d*a1^-1.
pub(crate) fn composite_inverse(base: &dyn BaseField32, s: u32, a: u64) -> u64 {
    let (a0, a1) = halves(a);
    let c0;
    let c1;

    if a0 == 0 {
        let a1inv = base.inverse(a1);
        c0 = base.multiply(a1inv, s);
        c1 = a1inv;
    } else if a1 == 0 {
        c0 = base.inverse(a0);
        c1 = 0;
    } else {
        let a1inv = base.inverse(a1);
        let a0inv = base.inverse(a0);

        let mut d = base.multiply(a1, a0inv);

        let tmp = base.multiply(a1, a0inv) ^ base.multiply(a0, a1inv) ^ s;
        let tmp = base.inverse(tmp);

        d = base.multiply(d, tmp);

        c0 = base.multiply(d ^ 1, a0inv);
        c1 = base.multiply(d, a1inv);
    }

    c0 as u64 | (c1 as u64) << 32
}

/// Stdmap region kernel: each word is split into its halves in place and
/// multiplied four-way through the base field.
pub(crate) fn composite_region_stdmap(base: &dyn BaseField32, s: u32, src: &[u8], dst: &mut [u8], val: u64, xor: bool) {
    let (b0, b1) = halves(val);
    let sw: &[u64] = bytemuck::cast_slice(src);
    let dw: &mut [u64] = bytemuck::cast_slice_mut(dst);

    for (d, &a) in dw.iter_mut().zip(sw) {
        let (a0, a1) = halves(a);
        let a1b1 = base.multiply(a1, b1);
        let low = base.multiply(a0, b0) ^ a1b1;
        let high = base.multiply(a1, b0) ^ base.multiply(a0, b1) ^ base.multiply(a1b1, s);
        let product = low as u64 | (high as u64) << 32;
        if xor {
            *d ^= product;
        } else {
            *d = product;
        }
    }
}

/// Altmap region kernel body: the aligned body stores every low half
/// contiguously, then every high half. The whole multiply becomes five
/// base-field region multiplies, which lets the base field bring its own
/// fast paths.
pub(crate) fn composite_region_altmap_body(
    base: &dyn BaseField32,
    s: u32,
    src: &[u8],
    dst: &mut [u8],
    val: u64,
    xor: bool,
) {
    let (val0, val1) = halves(val);
    let sub = dst.len() / 2;
    let (slow, shigh) = src.split_at(sub);
    let (dlow, dhigh) = dst.split_at_mut(sub);

    base.multiply_region(slow, dlow, val0, xor);
    base.multiply_region(shigh, dlow, val1, true);
    base.multiply_region(slow, dhigh, val1, xor);
    base.multiply_region(shigh, dhigh, val0, true);
    base.multiply_region(shigh, dhigh, base.multiply(s, val1), true);
}

/// Full altmap region call: heads and tails are plain words handled with
/// the scalar composite multiply; only the 32-aligned body is reordered.
pub(crate) fn composite_region_altmap(base: &dyn BaseField32, s: u32, src: &[u8], dst: &mut [u8], val: u64, xor: bool) {
    if !xor {
        dst.fill(0);
    }
    crate::region::with_region(
        src,
        dst,
        32,
        |sh, dh| scalar_region(sh, dh, xor, |w| composite_multiply(base, s, val, w)),
        |sb, db| composite_region_altmap_body(base, s, sb, db, val, xor),
    );
}

/// Element at logical `index` of an altmap-formatted buffer: inside the
/// 32-aligned body the low and high halves live in separate sub-regions;
/// outside it, plain linear words.
pub(crate) fn composite_extract_word(base: &dyn BaseField32, buf: &[u8], index: usize) -> u64 {
    let split = RegionSplit::new(buf.as_ptr(), buf.len(), 32);
    let head_words = split.head / 8;
    let body_words = split.body / 8;

    if index < head_words || index >= head_words + body_words {
        return read_word(&buf[index * 8..]);
    }

    let idx = index - head_words;
    let body = &buf[split.head..split.head + split.body];
    let sub = split.body / 2;
    let a = base.extract_word(&body[..sub], idx);
    let b = base.extract_word(&body[sub..], idx);
    a as u64 | (b as u64) << 32
}
