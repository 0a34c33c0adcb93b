//! PSHUFB-based altmap kernel for the split 4x64 strategy.
//!
//! The altmap layout reshapes the region into 128-byte blocks of 16 lanes
//! by 8 byte-planes: byte k of field element j lives at offset k*16 + j
//! within its block. In that layout a 4-bit table lookup becomes a single
//! byte shuffle: for each nibble position i and output plane j there is a
//! 16-byte table holding byte j of `tables[i][v]` for v = 0..16, and
//! `_mm_shuffle_epi8` applies it to 16 lanes at once.
//!
//! This is the highest-throughput path; it is only valid when source and
//! destination are altmap-formatted, and it needs SSSE3 for the shuffle.

#[cfg(target_arch = "x86_64")]
pub(crate) use x86::split_4_64_altmap_region_sse;

#[cfg(target_arch = "x86_64")]
mod x86 {
    use std::arch::x86_64::*;

    use crate::strategies::split::SplitLazy;

    /// # Safety
    /// Requires SSSE3. `src` and `dst` must have equal lengths, a multiple
    /// of 128, and must not alias. `ld` must hold 4-bit tables already
    /// built for the region's scalar.
    #[target_feature(enable = "ssse3")]
    pub(crate) unsafe fn split_4_64_altmap_region_sse(ld: &SplitLazy, src: &[u8], dst: &mut [u8], xor: bool) {
        debug_assert_eq!(ld.digit_bits(), 4);
        debug_assert_eq!(src.len() % 128, 0);

        // One shuffle table per (nibble position, output plane) pair.
        let mut tables = [[_mm_setzero_si128(); 8]; 16];
        let mut btable = [0u8; 16];
        for i in 0..16 {
            let row = ld.row(i);
            for j in 0..8 {
                for (k, b) in btable.iter_mut().enumerate() {
                    *b = (row[k] >> (8 * j)) as u8;
                }
                tables[i][j] = _mm_loadu_si128(btable.as_ptr() as *const __m128i);
            }
        }

        let low_nibble = _mm_set1_epi8(0xf);

        let mut off = 0;
        while off < dst.len() {
            let mut p = [_mm_setzero_si128(); 8];
            if xor {
                for (j, pj) in p.iter_mut().enumerate() {
                    *pj = _mm_loadu_si128(dst.as_ptr().add(off + j * 16) as *const __m128i);
                }
            }

            let mut i = 0;
            for k in 0..8 {
                let v0 = _mm_loadu_si128(src.as_ptr().add(off + k * 16) as *const __m128i);

                let si = _mm_and_si128(v0, low_nibble);
                for (j, pj) in p.iter_mut().enumerate() {
                    *pj = _mm_xor_si128(*pj, _mm_shuffle_epi8(tables[i][j], si));
                }
                i += 1;

                let v0 = _mm_srli_epi32(v0, 4);
                let si = _mm_and_si128(v0, low_nibble);
                for (j, pj) in p.iter_mut().enumerate() {
                    *pj = _mm_xor_si128(*pj, _mm_shuffle_epi8(tables[i][j], si));
                }
                i += 1;
            }

            for (j, pj) in p.iter().enumerate() {
                _mm_storeu_si128(dst.as_mut_ptr().add(off + j * 16) as *mut __m128i, *pj);
            }
            off += 128;
        }
    }
}

#[cfg(all(test, target_arch = "x86_64"))]
mod tests {
    use super::*;
    use crate::strategies::split::{split_4_64_altmap_region_portable, SplitLazy};

    #[test]
    fn shuffle_kernel_matches_portable_kernel() {
        if !is_x86_feature_detected!("ssse3") {
            return;
        }
        let mut ld = SplitLazy::new(4);
        ld.ensure(0xDEAD_BEEF_CAFE_BABE, 0x1B);

        let src: Vec<u64> = (0..64).map(|i| 0x5851_F42D_4C95_7F2Du64.wrapping_mul(i + 1)).collect();
        let src_bytes: &[u8] = bytemuck::cast_slice(&src);

        for xor in [false, true] {
            let mut want = vec![0x3Cu8; 512];
            let mut got = vec![0x3Cu8; 512];
            split_4_64_altmap_region_portable(&ld, src_bytes, &mut want, xor);
            unsafe {
                split_4_64_altmap_region_sse(&ld, src_bytes, &mut got, xor);
            }
            assert_eq!(want, got, "xor={xor}");
        }
    }
}
