//! Runtime detection of CPU SIMD features.
//!
//! Kernels are selected at runtime so that a binary built on one machine
//! behaves correctly on another; every SIMD kernel has a bit-exact scalar
//! fallback.

/// Runtime detection of CPU SIMD features
pub fn detect_simd_support() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("ssse3") {
            return SimdLevel::Ssse3;
        }
        if is_x86_feature_detected!("sse2") {
            return SimdLevel::Sse2;
        }
    }
    SimdLevel::None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimdLevel {
    None,
    /// 128-bit integer ops: enough for the ByTwo kernels.
    Sse2,
    /// Adds byte shuffles: required by the split 4x64 altmap kernel.
    Ssse3,
}
