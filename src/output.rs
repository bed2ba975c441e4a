//! Result types reported by a compression call.

use crate::error::CompressError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal state of the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStatus {
    /// The output is at or below the target size.
    Done,
    /// Quality hit its floor before the output fit the target.
    TargetUnreachable,
}

/// One rasterise → encode → assemble → measure pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-indexed attempt number.
    pub attempt: usize,
    pub quality: u8,
    /// Measured size of the file this attempt wrote, in KB.
    pub size_kb: f64,
    pub duration_ms: u64,
}

/// Outcome of a compression call that did not hit a fatal error.
///
/// The file at `output_path` is always the one written by the last attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionReport {
    pub output_path: PathBuf,
    pub status: CompressionStatus,
    /// Size of the file left on disk, in KB.
    pub final_size_kb: f64,
    /// Quality of the attempt that produced the file left on disk.
    pub final_quality: u8,
    pub target_max_size_kb: f64,
    pub scale_factor: f32,
    pub page_count: usize,
    pub attempts: Vec<AttemptRecord>,
    pub total_duration_ms: u64,
}

impl CompressionReport {
    pub fn is_success(&self) -> bool {
        self.status == CompressionStatus::Done
    }

    /// Human-readable one-line outcome.
    pub fn summary(&self) -> String {
        match self.status {
            CompressionStatus::Done => format!(
                "Compressed PDF saved at {}, Size: {:.2} KB (quality {}, {} attempt{})",
                self.output_path.display(),
                self.final_size_kb,
                self.final_quality,
                self.attempts.len(),
                if self.attempts.len() == 1 { "" } else { "s" },
            ),
            CompressionStatus::TargetUnreachable => format!(
                "Could not reach target of {:.2} KB at scale {}: best achieved was {:.2} KB \
at quality {} (saved at {})",
                self.target_max_size_kb,
                self.scale_factor,
                self.final_size_kb,
                self.final_quality,
                self.output_path.display(),
            ),
        }
    }

    /// Treat an unreachable target as an error.
    pub fn into_result(self) -> Result<Self, CompressError> {
        match self.status {
            CompressionStatus::Done => Ok(self),
            CompressionStatus::TargetUnreachable => Err(CompressError::TargetUnreachable {
                target_kb: self.target_max_size_kb,
                achieved_kb: self.final_size_kb,
                quality: self.final_quality,
                path: self.output_path,
            }),
        }
    }
}
