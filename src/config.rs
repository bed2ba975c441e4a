//! Configuration types for size-targeted PDF compression.
//!
//! [`CompressionConfig`] carries every knob of one compression call and is
//! built via [`CompressionConfigBuilder`], which validates the three numeric
//! parameters up front. Each attempt of the retry loop works from an
//! immutable [`CompressionParameters`] snapshot; only `quality` differs
//! between attempts.

use crate::error::CompressError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount subtracted from `quality` after each attempt that misses the target.
pub const QUALITY_STEP: u8 = 10;

/// Lowest JPEG quality the encoder accepts.
pub const MIN_QUALITY: u8 = 1;

/// Highest JPEG quality the encoder accepts.
pub const MAX_QUALITY: u8 = 100;

/// Configuration for one compression call.
///
/// # Example
/// ```rust
/// use pdfsqueeze::CompressionConfig;
///
/// let config = CompressionConfig::builder()
///     .target_max_size_kb(500.0)
///     .scale_factor(0.75)
///     .quality(85)
///     .build()
///     .unwrap();
/// assert_eq!(config.quality, 85);
/// ```
#[derive(Clone)]
pub struct CompressionConfig {
    /// Largest acceptable output size in kilobytes (1 KB = 1024 bytes),
    /// inclusive. Default: 1000.
    pub target_max_size_kb: f64,

    /// Uniform rasterisation scale, in (0, 1]. Default: 0.5.
    ///
    /// At 1.0 a page renders at one pixel per PDF point (72 DPI). The scale
    /// is never changed by the retry loop.
    pub scale_factor: f32,

    /// Initial JPEG quality, 1–100. Default: 75.
    ///
    /// Lowered by [`QUALITY_STEP`] after each attempt that misses the target.
    pub quality: u8,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Optional progress observer. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            target_max_size_kb: 1000.0,
            scale_factor: 0.5,
            quality: 75,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CompressionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionConfig")
            .field("target_max_size_kb", &self.target_max_size_kb)
            .field("scale_factor", &self.scale_factor)
            .field("quality", &self.quality)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn CompressionProgressCallback>"),
            )
            .finish()
    }
}

impl CompressionConfig {
    /// Create a new builder for `CompressionConfig`.
    pub fn builder() -> CompressionConfigBuilder {
        CompressionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Parameters for the first attempt.
    pub fn parameters(&self) -> CompressionParameters {
        CompressionParameters {
            target_max_size_kb: self.target_max_size_kb,
            scale_factor: self.scale_factor,
            quality: self.quality,
        }
    }

    /// Check every numeric field against its valid domain.
    pub fn validate(&self) -> Result<(), CompressError> {
        self.parameters().validate()
    }
}

/// Builder for [`CompressionConfig`].
#[derive(Debug)]
pub struct CompressionConfigBuilder {
    config: CompressionConfig,
}

impl CompressionConfigBuilder {
    pub fn target_max_size_kb(mut self, kb: f64) -> Self {
        self.config.target_max_size_kb = kb;
        self
    }

    pub fn scale_factor(mut self, scale: f32) -> Self {
        self.config.scale_factor = scale;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CompressionConfig, CompressError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The immutable inputs of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionParameters {
    pub target_max_size_kb: f64,
    pub scale_factor: f32,
    pub quality: u8,
}

impl CompressionParameters {
    pub fn validate(&self) -> Result<(), CompressError> {
        if !self.target_max_size_kb.is_finite() || self.target_max_size_kb <= 0.0 {
            return Err(CompressError::InvalidParameter(format!(
                "target size must be a positive number of KB, got {}",
                self.target_max_size_kb
            )));
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 || self.scale_factor > 1.0 {
            return Err(CompressError::InvalidParameter(format!(
                "scale factor must be in (0, 1], got {}",
                self.scale_factor
            )));
        }
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(CompressError::InvalidParameter(format!(
                "quality must be {MIN_QUALITY}–{MAX_QUALITY}, got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// Parameters for the attempt after this one, or `None` once the next
    /// quality would fall below [`MIN_QUALITY`].
    pub fn next_attempt(&self) -> Option<Self> {
        self.quality
            .checked_sub(QUALITY_STEP)
            .filter(|q| *q >= MIN_QUALITY)
            .map(|quality| Self { quality, ..*self })
    }

    /// Upper bound on the number of attempts starting from `self.quality`.
    pub fn max_attempts(&self) -> usize {
        (self.quality.saturating_sub(MIN_QUALITY) / QUALITY_STEP) as usize + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = CompressionConfig::default();
        assert_eq!(c.target_max_size_kb, 1000.0);
        assert_eq!(c.scale_factor, 0.5);
        assert_eq!(c.quality, 75);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn builder_rejects_non_positive_target() {
        for kb in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = CompressionConfig::builder()
                .target_max_size_kb(kb)
                .build()
                .unwrap_err();
            assert!(matches!(err, CompressError::InvalidParameter(_)), "kb={kb}");
        }
    }

    #[test]
    fn builder_rejects_scale_outside_unit_interval() {
        assert!(CompressionConfig::builder().scale_factor(0.0).build().is_err());
        assert!(CompressionConfig::builder().scale_factor(1.01).build().is_err());
        assert!(CompressionConfig::builder().scale_factor(1.0).build().is_ok());
    }

    #[test]
    fn builder_rejects_quality_out_of_range() {
        assert!(CompressionConfig::builder().quality(0).build().is_err());
        assert!(CompressionConfig::builder().quality(101).build().is_err());
        assert!(CompressionConfig::builder().quality(1).build().is_ok());
        assert!(CompressionConfig::builder().quality(100).build().is_ok());
    }

    #[test]
    fn next_attempt_steps_by_ten_and_stops_at_floor() {
        let mut p = CompressionConfig::default().parameters();
        let mut seen = vec![p.quality];
        while let Some(next) = p.next_attempt() {
            assert_eq!(next.scale_factor, p.scale_factor);
            assert_eq!(next.target_max_size_kb, p.target_max_size_kb);
            p = next;
            seen.push(p.quality);
        }
        assert_eq!(seen, vec![75, 65, 55, 45, 35, 25, 15, 5]);
    }

    #[test]
    fn next_attempt_allows_quality_one() {
        let p = CompressionParameters {
            target_max_size_kb: 1.0,
            scale_factor: 0.5,
            quality: 11,
        };
        assert_eq!(p.next_attempt().map(|n| n.quality), Some(1));
        assert_eq!(p.next_attempt().and_then(|n| n.next_attempt()), None);
    }

    #[test]
    fn max_attempts_bounds() {
        let p = |quality| CompressionParameters {
            target_max_size_kb: 1.0,
            scale_factor: 0.5,
            quality,
        };
        assert_eq!(p(75).max_attempts(), 8);
        assert_eq!(p(100).max_attempts(), 10);
        assert_eq!(p(10).max_attempts(), 1);
        assert_eq!(p(1).max_attempts(), 1);
    }

    #[test]
    fn debug_redacts_password() {
        let c = CompressionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
