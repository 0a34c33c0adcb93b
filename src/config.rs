//! Field configuration: strategy selection knobs and their validation.
//!
//! The validation rules mirror the strategy selector's acceptance matrix:
//! each strategy supports a specific set of region flags and argument
//! pairs, and everything else is rejected at construction with a single
//! "invalid configuration" error kind. [`scratch_size`] doubles as the
//! validator and reports how many bytes of per-handle scratch a
//! configuration needs (excluding the handle itself), for callers that
//! budget memory up front.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use thiserror::Error;

/// Multiplication strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultType {
    /// Reference shift multiply; zero precompute, slowest throughput.
    Shift,
    /// Double the product per bit of the scalar, MSB first.
    BytwoP,
    /// Double the source per bit of the scalar, LSB first.
    BytwoB,
    /// Digit-split tables; `arg1`/`arg2` select 4/8/16 x 64 lazy or 8x8 full.
    SplitTable,
    /// Group shift-and-reduce; `arg1` = shift digit bits, `arg2` = reduce digit bits.
    Group,
    /// GF((2^32)^2) over an external base field.
    Composite,
    /// Group(4, 8).
    Default,
}

/// How division is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DivideType {
    #[default]
    Default,
    /// Force the extended-Euclid inverse even where a strategy has its own.
    Euclid,
    /// Unsupported here; construction fails.
    Matrix,
}

/// Region-kernel flag bitmask. Only selector-validated combinations are
/// legal; see [`scratch_size`].
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionFlags(u32);

impl RegionFlags {
    pub const DEFAULT: RegionFlags = RegionFlags(0);
    pub const SSE: RegionFlags = RegionFlags(1);
    pub const NOSSE: RegionFlags = RegionFlags(2);
    pub const STDMAP: RegionFlags = RegionFlags(4);
    pub const ALTMAP: RegionFlags = RegionFlags(8);
    pub const CAUCHY: RegionFlags = RegionFlags(16);
    pub const LAZY: RegionFlags = RegionFlags(32);

    #[inline]
    pub fn contains(self, other: RegionFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn intersects(self, other: RegionFlags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn without(self, other: RegionFlags) -> RegionFlags {
        RegionFlags(self.0 & !other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for RegionFlags {
    type Output = RegionFlags;

    fn bitor(self, rhs: RegionFlags) -> RegionFlags {
        RegionFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for RegionFlags {
    fn bitor_assign(&mut self, rhs: RegionFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for RegionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "DEFAULT");
        }
        let names = [
            (RegionFlags::SSE, "SSE"),
            (RegionFlags::NOSSE, "NOSSE"),
            (RegionFlags::STDMAP, "STDMAP"),
            (RegionFlags::ALTMAP, "ALTMAP"),
            (RegionFlags::CAUCHY, "CAUCHY"),
            (RegionFlags::LAZY, "LAZY"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors rejected at construction; no partial handle is ever produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("matrix division is not supported")]
    MatrixDivide,

    #[error("arguments {arg1}/{arg2} are invalid for {mult:?}")]
    BadArguments { mult: MultType, arg1: u32, arg2: u32 },

    #[error("region flags {0:?} are invalid for this strategy")]
    BadRegionFlags(RegionFlags),

    #[error("composite strategy requires a base field")]
    MissingBaseField,

    #[error("base field supplied for a non-composite strategy")]
    UnexpectedBaseField,
}

/// Everything needed to construct a field handle.
#[derive(Debug, Clone, Copy)]
pub struct FieldOptions {
    pub mult_type: MultType,
    pub region: RegionFlags,
    pub divide_type: DivideType,
    pub arg1: u32,
    pub arg2: u32,
    /// Primitive polynomial with the x^64 term implicit; zero selects the
    /// compatibility placeholder 0x1B.
    pub prim_poly: u64,
}

impl FieldOptions {
    pub fn new(mult_type: MultType) -> Self {
        FieldOptions {
            mult_type,
            region: RegionFlags::DEFAULT,
            divide_type: DivideType::Default,
            arg1: 0,
            arg2: 0,
            prim_poly: 0,
        }
    }

    pub fn region(mut self, region: RegionFlags) -> Self {
        self.region = region;
        self
    }

    pub fn divide_type(mut self, divide_type: DivideType) -> Self {
        self.divide_type = divide_type;
        self
    }

    pub fn args(mut self, arg1: u32, arg2: u32) -> Self {
        self.arg1 = arg1;
        self.arg2 = arg2;
        self
    }

    pub fn prim_poly(mut self, prim_poly: u64) -> Self {
        self.prim_poly = prim_poly;
        self
    }
}

impl Default for FieldOptions {
    fn default() -> Self {
        FieldOptions::new(MultType::Default)
    }
}

const TABLE_PAD: usize = 64;

/// Validate a configuration and report its scratch requirement in bytes.
pub fn scratch_size(
    mult_type: MultType,
    region: RegionFlags,
    divide_type: DivideType,
    arg1: u32,
    arg2: u32,
) -> Result<usize, ConfigError> {
    let ss = RegionFlags::SSE | RegionFlags::NOSSE;
    let sa = RegionFlags::STDMAP | RegionFlags::ALTMAP;
    let bad_args = ConfigError::BadArguments { mult: mult_type, arg1, arg2 };

    if divide_type == DivideType::Matrix {
        return Err(ConfigError::MatrixDivide);
    }

    match mult_type {
        MultType::Shift => {
            if arg1 != 0 || arg2 != 0 {
                return Err(bad_args);
            }
            if !region.is_empty() {
                return Err(ConfigError::BadRegionFlags(region));
            }
            Ok(0)
        }

        MultType::BytwoP | MultType::BytwoB => {
            if arg1 != 0 || arg2 != 0 {
                return Err(bad_args);
            }
            if region != RegionFlags::CAUCHY {
                let both = region.contains(ss);
                let outside = !region.without(ss).is_empty();
                if both || outside {
                    return Err(ConfigError::BadRegionFlags(region));
                }
            }
            Ok(0)
        }

        MultType::SplitTable => {
            let args = (arg1.min(arg2), arg1.max(arg2));
            match args {
                (8, 8) => {
                    if !region.without(RegionFlags::LAZY).is_empty() {
                        return Err(ConfigError::BadRegionFlags(region));
                    }
                    Ok(15 * 256 * 256 * 8 + TABLE_PAD)
                }
                (16, 64) => {
                    if !region.without(RegionFlags::LAZY).is_empty() {
                        return Err(ConfigError::BadRegionFlags(region));
                    }
                    Ok(4 * 65536 * 8 + 8 + TABLE_PAD)
                }
                (8, 64) => {
                    if !region.without(RegionFlags::LAZY).is_empty() {
                        return Err(ConfigError::BadRegionFlags(region));
                    }
                    Ok(8 * 256 * 8 + 8 + TABLE_PAD)
                }
                (4, 64) => {
                    let region = region.without(RegionFlags::LAZY);
                    if region.contains(ss) || region.contains(sa) {
                        return Err(ConfigError::BadRegionFlags(region));
                    }
                    if !region.without(ss | sa).is_empty() {
                        return Err(ConfigError::BadRegionFlags(region));
                    }
                    if region.contains(RegionFlags::ALTMAP) && !region.contains(RegionFlags::SSE) {
                        // altmap layout only exists for the shuffle kernel
                        return Err(ConfigError::BadRegionFlags(region));
                    }
                    Ok(16 * 16 * 8 + 8 + TABLE_PAD)
                }
                _ => Err(bad_args),
            }
        }

        MultType::Group | MultType::Default => {
            let (g_s, g_r) = if mult_type == MultType::Default { (4, 8) } else { (arg1, arg2) };
            if g_s == 0 || g_r == 0 || g_s > 32 || g_r > 32 {
                return Err(bad_args);
            }
            if !region.is_empty() && region != RegionFlags::CAUCHY {
                return Err(ConfigError::BadRegionFlags(region));
            }
            Ok(8 * ((1usize << g_s) + (1usize << g_r)) + TABLE_PAD)
        }

        MultType::Composite => {
            if !region.without(RegionFlags::STDMAP | RegionFlags::ALTMAP).is_empty() {
                return Err(ConfigError::BadRegionFlags(region));
            }
            if arg1 == 2 && (arg2 == 0 || arg2 == 1) {
                Ok(std::mem::size_of::<u32>() + 4)
            } else {
                Err(bad_args)
            }
        }
    }
}
