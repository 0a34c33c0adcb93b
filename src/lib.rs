//! gf64rs - GF(2^64) Galois Field arithmetic
//!
//! ## Strategies
//!
//! Multiplication over GF(2^64) is offered through several interchangeable
//! strategies with different precompute/throughput tradeoffs: the
//! reference shift multiply, iterative doubling (ByTwo), lazy digit-split
//! tables (4/8/16-bit), eager 8x8 tables, group shift-and-reduce, and a
//! composite GF((2^32)^2) construction over an external base field. For
//! one primitive polynomial every strategy produces bit-identical
//! products.
//!
//! ## Region operations
//!
//! Bulk multiply-and-XOR over byte buffers runs through per-strategy
//! kernels, including 128-bit SSE kernels selected by runtime CPU probing
//! (PSHUFB nibble lookups for the split tables, in the style of the
//! "Screaming Fast Galois Field Arithmetic" technique). The altmap
//! kernels use a packed in-memory layout; treat those buffers as opaque
//! and read them back through `extract_word`.
//!
//! ## Concurrency
//!
//! Handles are not `Sync`: lazy strategy tables mutate inside calls that
//! look read-only. Construct one handle per thread or wrap the handle in
//! a lock.

pub mod base;
pub mod config;
pub mod field;
pub mod polynomial;
pub mod simd;

mod region;
mod strategies;

pub use base::{BaseField32, ShiftBase32};
pub use config::{ConfigError, DivideType, FieldOptions, MultType, RegionFlags};
pub use field::{GaloisField64, DEFAULT_PRIM_POLY, NO_INVERSE};
pub use simd::{detect_simd_support, SimdLevel};
