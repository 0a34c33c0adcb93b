//! The field handle: one primitive polynomial, one resolved strategy.
//!
//! A handle binds a strategy's kernels and scratch tables to a primitive
//! polynomial and exposes the five public operations. Strategies are a
//! tagged enum resolved once at construction; there is no global state and
//! no handle ever assumes another strategy is active.
//!
//! Lazy caches (split tables, the Group shift table) mutate inside calls
//! that look read-only, so they sit behind `RefCell` and the handle is not
//! `Sync`. Callers that want concurrency construct one handle per thread
//! or add their own locking.

use std::cell::RefCell;

use log::debug;

use crate::base::BaseField32;
use crate::config::{self, ConfigError, FieldOptions, MultType, RegionFlags};
use crate::polynomial::{euclid_inverse, shift_multiply};
use crate::region::{multby_one, multby_zero, read_word, scalar_region, with_region, WORD_BYTES};
use crate::simd::{detect_simd_support, SimdLevel};
use crate::strategies::bytwo;
use crate::strategies::composite;
use crate::strategies::group::{self, GroupTables};
use crate::strategies::shift;
use crate::strategies::split::{self, Split88Tables, SplitLazy};

pub use crate::polynomial::NO_INVERSE;

/// Compatibility placeholder used when the caller passes a zero
/// polynomial; real deployments supply their own degree-64 irreducible.
pub const DEFAULT_PRIM_POLY: u64 = 0x1B;

enum SplitRegionMode {
    /// Lazy table walk, word at a time.
    Lazy,
    /// Plain scalar loop (the 4x64 SSE configuration without altmap).
    Scalar,
    /// 128-byte-block shuffle kernel.
    AltmapSse,
    /// Bit-exact portable rendition of the altmap kernel.
    AltmapPortable,
}

enum Strategy {
    Shift,
    Bytwo {
        on_product: bool,
        sse: bool,
    },
    SplitLazy {
        scratch: RefCell<SplitLazy>,
        region_mode: SplitRegionMode,
    },
    Split88 {
        tables: Split88Tables,
    },
    Group {
        tables: GroupTables,
    },
    Composite {
        s: u32,
        altmap: bool,
        base: Box<dyn BaseField32>,
    },
}

/// A GF(2^64) field bound to one multiplication strategy.
pub struct GaloisField64 {
    prim_poly: u64,
    strategy: Strategy,
}

impl GaloisField64 {
    /// Construct a handle for any non-composite strategy.
    pub fn new(options: FieldOptions) -> Result<Self, ConfigError> {
        if options.mult_type == MultType::Composite {
            return Err(ConfigError::MissingBaseField);
        }
        Self::build(options, None)
    }

    /// Construct a composite handle over the given GF(2^32) base field.
    pub fn with_base_field(
        options: FieldOptions,
        base: Box<dyn BaseField32>,
    ) -> Result<Self, ConfigError> {
        if options.mult_type != MultType::Composite {
            return Err(ConfigError::UnexpectedBaseField);
        }
        Self::build(options, Some(base))
    }

    fn build(options: FieldOptions, base: Option<Box<dyn BaseField32>>) -> Result<Self, ConfigError> {
        config::scratch_size(
            options.mult_type,
            options.region,
            options.divide_type,
            options.arg1,
            options.arg2,
        )?;

        let prim_poly = if options.prim_poly == 0 { DEFAULT_PRIM_POLY } else { options.prim_poly };
        let simd = detect_simd_support();

        let strategy = match options.mult_type {
            MultType::Shift => Strategy::Shift,

            MultType::BytwoP | MultType::BytwoB => Strategy::Bytwo {
                on_product: options.mult_type == MultType::BytwoP,
                sse: options.region.contains(RegionFlags::SSE) && simd >= SimdLevel::Sse2,
            },

            MultType::SplitTable => {
                let args = (options.arg1.min(options.arg2), options.arg1.max(options.arg2));
                match args {
                    (8, 8) => Strategy::Split88 { tables: Split88Tables::build(prim_poly) },
                    (4, 64) => {
                        let region_mode = if options.region.contains(RegionFlags::SSE) {
                            if options.region.contains(RegionFlags::ALTMAP) {
                                if simd >= SimdLevel::Ssse3 {
                                    SplitRegionMode::AltmapSse
                                } else {
                                    SplitRegionMode::AltmapPortable
                                }
                            } else {
                                SplitRegionMode::Scalar
                            }
                        } else {
                            SplitRegionMode::Lazy
                        };
                        Strategy::SplitLazy { scratch: RefCell::new(SplitLazy::new(4)), region_mode }
                    }
                    (8, 64) => Strategy::SplitLazy {
                        scratch: RefCell::new(SplitLazy::new(8)),
                        region_mode: SplitRegionMode::Lazy,
                    },
                    (16, 64) => Strategy::SplitLazy {
                        scratch: RefCell::new(SplitLazy::new(16)),
                        region_mode: SplitRegionMode::Lazy,
                    },
                    _ => unreachable!("validated by scratch_size"),
                }
            }

            MultType::Group | MultType::Default => {
                let (g_s, g_r) = if options.mult_type == MultType::Default {
                    (4, 8)
                } else {
                    (options.arg1, options.arg2)
                };
                Strategy::Group { tables: GroupTables::new(g_s, g_r, prim_poly) }
            }

            MultType::Composite => {
                let base = base.ok_or(ConfigError::MissingBaseField)?;
                let s = if base.is_composite() {
                    composite::S_OVER_GF16_2
                } else {
                    composite::S_OVER_GF32
                };
                Strategy::Composite { s, altmap: options.region.contains(RegionFlags::ALTMAP), base }
            }
        };

        debug!(
            "constructed GF(2^64) handle: {:?} strategy, region {:?}, poly {prim_poly:#018x}, simd {simd:?}",
            options.mult_type, options.region
        );

        Ok(GaloisField64 { prim_poly, strategy })
    }

    pub fn prim_poly(&self) -> u64 {
        self.prim_poly
    }

    pub fn multiply(&self, a: u64, b: u64) -> u64 {
        match &self.strategy {
            Strategy::Shift => shift::multiply(self.prim_poly, a, b),
            // the lazy split variants keep the reference multiply for
            // their scalar path; only the tables accelerate regions
            Strategy::SplitLazy { .. } => shift_multiply(a, b, self.prim_poly),
            Strategy::Bytwo { on_product: true, .. } => bytwo::bytwo_p_multiply(self.prim_poly, a, b),
            Strategy::Bytwo { on_product: false, .. } => bytwo::bytwo_b_multiply(self.prim_poly, a, b),
            Strategy::Split88 { tables } => split::split_8_8_multiply(tables, a, b),
            Strategy::Group { tables } => {
                if tables.g_s == tables.g_r {
                    group::group_s_eq_r_multiply(tables, self.prim_poly, a, b)
                } else {
                    group::group_multiply(tables, self.prim_poly, a, b)
                }
            }
            Strategy::Composite { s, base, .. } => composite::composite_multiply(&**base, *s, a, b),
        }
    }

    /// Multiplicative inverse; [`NO_INVERSE`] for zero.
    ///
    /// Euclid everywhere except composite, whose elements are not in
    /// polynomial basis; it inverts through the quadratic-extension
    /// identity instead.
    pub fn inverse(&self, a: u64) -> u64 {
        if a == 0 {
            return NO_INVERSE;
        }
        match &self.strategy {
            Strategy::Composite { s, base, .. } => composite::composite_inverse(&**base, *s, a),
            _ => euclid_inverse(|x, y| self.multiply(x, y), self.prim_poly, a),
        }
    }

    /// a / b; [`NO_INVERSE`] when b is zero.
    pub fn divide(&self, a: u64, b: u64) -> u64 {
        if b == 0 {
            return NO_INVERSE;
        }
        let b_inv = self.inverse(b);
        self.multiply(a, b_inv)
    }

    /// Element-wise `dst = val * src`, or `dst ^= val * src` when `xor` is
    /// set. Lengths must match and be a multiple of 8; misaligned heads
    /// and tails go through the scalar multiply.
    pub fn multiply_region(&self, src: &[u8], dst: &mut [u8], val: u64, xor: bool) {
        assert_eq!(src.len(), dst.len());
        assert_eq!(src.len() % WORD_BYTES, 0);

        if val == 0 {
            multby_zero(dst, xor);
            return;
        }
        if val == 1 {
            multby_one(src, dst, xor);
            return;
        }

        let pp = self.prim_poly;
        let scalar = |s: &[u8], d: &mut [u8]| scalar_region(s, d, xor, |w| self.multiply(val, w));

        match &self.strategy {
            Strategy::Shift => shift::multiply_region(pp, src, dst, val, xor),

            // no region kernel for the full 8x8 tables; plain scalar loop
            Strategy::Split88 { .. } => scalar(src, dst),

            Strategy::Bytwo { on_product, sse } => {
                let on_product = *on_product;
                if *sse {
                    #[cfg(target_arch = "x86_64")]
                    {
                        with_region(src, dst, 16, scalar, |sb, db| unsafe {
                            if on_product {
                                bytwo::sse::bytwo_p_region(pp, sb, db, val, xor);
                            } else {
                                bytwo::sse::bytwo_b_region(pp, sb, db, val, xor);
                            }
                        });
                        return;
                    }
                }
                with_region(src, dst, WORD_BYTES, scalar, |sb, db| {
                    if on_product {
                        bytwo::bytwo_p_region_nosse(pp, sb, db, val, xor);
                    } else {
                        bytwo::bytwo_b_region_nosse(pp, sb, db, val, xor);
                    }
                });
            }

            Strategy::SplitLazy { scratch, region_mode } => match region_mode {
                SplitRegionMode::Scalar => scalar(src, dst),
                SplitRegionMode::Lazy => {
                    with_region(src, dst, WORD_BYTES, scalar, |sb, db| {
                        let mut ld = scratch.borrow_mut();
                        ld.ensure(val, pp);
                        split::split_lazy_region(&ld, sb, db, xor);
                    });
                }
                SplitRegionMode::AltmapSse => {
                    #[cfg(target_arch = "x86_64")]
                    with_region(src, dst, 128, scalar, |sb, db| {
                        let mut ld = scratch.borrow_mut();
                        ld.ensure(val, pp);
                        unsafe {
                            crate::strategies::simd_pshufb::split_4_64_altmap_region_sse(&ld, sb, db, xor);
                        }
                    });
                }
                SplitRegionMode::AltmapPortable => {
                    with_region(src, dst, 128, scalar, |sb, db| {
                        let mut ld = scratch.borrow_mut();
                        ld.ensure(val, pp);
                        split::split_4_64_altmap_region_portable(&ld, sb, db, xor);
                    });
                }
            },

            Strategy::Group { tables } => {
                with_region(src, dst, WORD_BYTES, scalar, |sb, db| {
                    if tables.g_s == tables.g_r {
                        group::group_s_eq_r_region(tables, pp, sb, db, val, xor);
                    } else {
                        group::group_region(tables, pp, sb, db, val, xor);
                    }
                });
            }

            Strategy::Composite { s, altmap, base } => {
                if *altmap {
                    composite::composite_region_altmap(&**base, *s, src, dst, val, xor);
                } else {
                    with_region(src, dst, WORD_BYTES, scalar, |sb, db| {
                        composite::composite_region_stdmap(&**base, *s, sb, db, val, xor);
                    });
                }
            }
        }
    }

    /// The 64-bit element at logical `index` of `buf`, honoring the
    /// strategy's in-memory layout. Altmap buffers are opaque packed
    /// forms; this is the only legal way to read one element back.
    pub fn extract_word(&self, buf: &[u8], index: usize) -> u64 {
        match &self.strategy {
            Strategy::Composite { altmap: true, base, .. } => {
                composite::composite_extract_word(&**base, buf, index)
            }
            Strategy::SplitLazy {
                region_mode: SplitRegionMode::AltmapSse | SplitRegionMode::AltmapPortable,
                ..
            } => split::split_extract_word(buf, index),
            _ => read_word(&buf[index * WORD_BYTES..]),
        }
    }
}
