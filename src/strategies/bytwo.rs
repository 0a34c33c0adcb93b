//! ByTwo strategies: repeated doubling modulo the polynomial.
//!
//! ByTwo-b scans the scalar from the low bit up, doubling the source
//! operand and stopping as soon as the scalar runs out of bits. ByTwo-p
//! scans from the high bit down, doubling the running product. Both have
//! portable word-at-a-time region kernels and 128-bit SSE kernels that
//! process a pair of field elements per step.

use crate::polynomial::{multiply_by_two, HIGH_BIT};

pub(crate) fn bytwo_b_multiply(prim_poly: u64, a: u64, b: u64) -> u64 {
    let mut a = a;
    let mut b = b;
    let mut prod = 0u64;

    loop {
        if a & 1 != 0 {
            prod ^= b;
        }
        a >>= 1;
        if a == 0 {
            return prod;
        }
        b = multiply_by_two(b, prim_poly);
    }
}

pub(crate) fn bytwo_p_multiply(prim_poly: u64, a: u64, b: u64) -> u64 {
    let mut prod = 0u64;
    let mut amask = HIGH_BIT;

    while amask != 0 {
        prod = multiply_by_two(prod, prim_poly);
        if a & amask != 0 {
            prod ^= b;
        }
        amask >>= 1;
    }
    prod
}

/// Portable ByTwo-p kernel over an 8-aligned body.
pub(crate) fn bytwo_p_region_nosse(prim_poly: u64, src: &[u8], dst: &mut [u8], val: u64, xor: bool) {
    let s: &[u64] = bytemuck::cast_slice(src);
    let d: &mut [u64] = bytemuck::cast_slice_mut(dst);

    for (dw, &ta) in d.iter_mut().zip(s) {
        let mut prod = 0u64;
        let mut amask = HIGH_BIT;
        while amask != 0 {
            prod = multiply_by_two(prod, prim_poly);
            if val & amask != 0 {
                prod ^= ta;
            }
            amask >>= 1;
        }
        if xor {
            *dw ^= prod;
        } else {
            *dw = prod;
        }
    }
}

/// Portable ByTwo-b kernel over an 8-aligned body.
pub(crate) fn bytwo_b_region_nosse(prim_poly: u64, src: &[u8], dst: &mut [u8], val: u64, xor: bool) {
    let s: &[u64] = bytemuck::cast_slice(src);
    let d: &mut [u64] = bytemuck::cast_slice_mut(dst);

    for (dw, &sw) in d.iter_mut().zip(s) {
        let mut prod = 0u64;
        let mut tb = val;
        let mut ta = sw;
        loop {
            if tb & 1 != 0 {
                prod ^= ta;
            }
            tb >>= 1;
            if tb == 0 {
                break;
            }
            ta = multiply_by_two(ta, prim_poly);
        }
        if xor {
            *dw ^= prod;
        } else {
            *dw = prod;
        }
    }
}

#[cfg(target_arch = "x86_64")]
pub(crate) mod sse {
    //! 128-bit kernels: two field elements per vector. Doubling a vector
    //! lane folds the shifted-out high bit back in through a sign-extend
    //! trick: `(x & HIGH) * 2 - (x >> 63)` turns the high bit into an
    //! all-ones lane mask that gates the polynomial XOR.

    use std::arch::x86_64::*;

    /// One doubling step applied to both lanes of `va`.
    #[inline(always)]
    unsafe fn double_lanes(pp: __m128i, m1: __m128i, m2: __m128i, va: __m128i) -> __m128i {
        let t1 = _mm_and_si128(_mm_slli_epi64(va, 1), m1);
        let t2 = _mm_and_si128(va, m2);
        let t2 = _mm_sub_epi64(_mm_slli_epi64(t2, 1), _mm_srli_epi64(t2, 63));
        _mm_xor_si128(t1, _mm_and_si128(t2, pp))
    }

    /// ByTwo-p kernel over a 16-aligned body.
    ///
    /// Runs 64 identical rounds per vector. The scalar is bit-reversed and
    /// complemented up front so each round can turn the current bit into a
    /// branchless lane mask with `(v & 1) - 1`.
    ///
    /// # Safety
    /// Requires SSE2. `src` and `dst` must have equal lengths, a multiple
    /// of 16, and must not alias.
    #[target_feature(enable = "sse2")]
    pub(crate) unsafe fn bytwo_p_region(prim_poly: u64, src: &[u8], dst: &mut [u8], val: u64, xor: bool) {
        debug_assert_eq!(src.len() % 16, 0);

        let mut vrev = 0u64;
        for i in 0..64 {
            vrev <<= 1;
            if val & (1u64 << i) == 0 {
                vrev |= 1;
            }
        }

        let pp = _mm_set1_epi64x(prim_poly as i64);
        let m1 = _mm_set1_epi64x(!1i64);
        let m2 = _mm_set1_epi64x(i64::MIN);
        let one = _mm_set1_epi64x(1);

        let mut off = 0;
        while off < dst.len() {
            let mut prod = _mm_setzero_si128();
            let mut v = _mm_set1_epi64x(vrev as i64);
            let ta = _mm_loadu_si128(src.as_ptr().add(off) as *const __m128i);
            let tp = if xor {
                _mm_loadu_si128(dst.as_ptr().add(off) as *const __m128i)
            } else {
                _mm_setzero_si128()
            };
            for _ in 0..64 {
                prod = double_lanes(pp, m1, m2, prod);
                let mask = _mm_sub_epi64(_mm_and_si128(v, one), one);
                prod = _mm_xor_si128(prod, _mm_and_si128(mask, ta));
                v = _mm_srli_epi64(v, 1);
            }
            _mm_storeu_si128(dst.as_mut_ptr().add(off) as *mut __m128i, _mm_xor_si128(prod, tp));
            off += 16;
        }
    }

    /// ByTwo-b kernel over a 16-aligned body.
    ///
    /// # Safety
    /// Requires SSE2. `src` and `dst` must have equal lengths, a multiple
    /// of 16, and must not alias.
    #[target_feature(enable = "sse2")]
    pub(crate) unsafe fn bytwo_b_region(prim_poly: u64, src: &[u8], dst: &mut [u8], val: u64, xor: bool) {
        debug_assert_eq!(src.len() % 16, 0);

        let pp = _mm_set1_epi64x(prim_poly as i64);
        let m1 = _mm_set1_epi64x(!1i64);
        let m2 = _mm_set1_epi64x(i64::MIN);

        let mut off = 0;
        while off < dst.len() {
            let mut va = _mm_loadu_si128(src.as_ptr().add(off) as *const __m128i);
            let mut vb = if xor {
                _mm_loadu_si128(dst.as_ptr().add(off) as *const __m128i)
            } else {
                _mm_setzero_si128()
            };
            let mut itb = val;
            loop {
                if itb & 1 != 0 {
                    vb = _mm_xor_si128(vb, va);
                }
                itb >>= 1;
                if itb == 0 {
                    break;
                }
                va = double_lanes(pp, m1, m2, va);
            }
            _mm_storeu_si128(dst.as_mut_ptr().add(off) as *mut __m128i, vb);
            off += 16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::shift_multiply;

    const POLY: u64 = 0x1B;

    const SAMPLES: [u64; 6] = [
        0x1,
        0x2,
        0xFF,
        0x8000_0000_0000_0000,
        0xDEAD_BEEF_CAFE_BABE,
        0x0123_4567_89AB_CDEF,
    ];

    #[test]
    fn bytwo_b_agrees_with_shift() {
        for &a in &SAMPLES {
            for &b in &SAMPLES {
                assert_eq!(bytwo_b_multiply(POLY, a, b), shift_multiply(a, b, POLY));
            }
        }
    }

    #[test]
    fn bytwo_p_agrees_with_shift() {
        for &a in &SAMPLES {
            for &b in &SAMPLES {
                assert_eq!(bytwo_p_multiply(POLY, a, b), shift_multiply(a, b, POLY));
            }
        }
    }

    #[test]
    fn nosse_kernels_agree_with_scalar() {
        let src: Vec<u64> = (0..32).map(|i| 0x1111_2222_3333_4444u64.wrapping_mul(i + 1)).collect();
        let val = 0xBEEF_F00D_1234_5678u64;
        let mut dst_p = vec![0u64; 32];
        let mut dst_b = vec![0u64; 32];
        bytwo_p_region_nosse(POLY, bytemuck::cast_slice(&src), bytemuck::cast_slice_mut(&mut dst_p), val, false);
        bytwo_b_region_nosse(POLY, bytemuck::cast_slice(&src), bytemuck::cast_slice_mut(&mut dst_b), val, false);
        for i in 0..32 {
            let expect = shift_multiply(val, src[i], POLY);
            assert_eq!(dst_p[i], expect);
            assert_eq!(dst_b[i], expect);
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn sse_kernels_agree_with_nosse() {
        if !is_x86_feature_detected!("sse2") {
            return;
        }
        let src: Vec<u64> = (0..32).map(|i| 0x9E37_79B9_7F4A_7C15u64.wrapping_mul(i + 3)).collect();
        let val = 0xFEDC_BA98_7654_3210u64;
        for xor in [false, true] {
            let mut want = vec![0x55AAu64; 32];
            let mut got = vec![0x55AAu64; 32];
            bytwo_p_region_nosse(POLY, bytemuck::cast_slice(&src), bytemuck::cast_slice_mut(&mut want), val, xor);
            unsafe {
                sse::bytwo_p_region(POLY, bytemuck::cast_slice(&src), bytemuck::cast_slice_mut(&mut got), val, xor);
            }
            assert_eq!(want, got);

            let mut want = vec![0x55AAu64; 32];
            let mut got = vec![0x55AAu64; 32];
            bytwo_b_region_nosse(POLY, bytemuck::cast_slice(&src), bytemuck::cast_slice_mut(&mut want), val, xor);
            unsafe {
                sse::bytwo_b_region(POLY, bytemuck::cast_slice(&src), bytemuck::cast_slice_mut(&mut got), val, xor);
            }
            assert_eq!(want, got);
        }
    }
}
