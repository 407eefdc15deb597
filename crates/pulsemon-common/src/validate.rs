//! Range validation for incoming metric samples.
//!
//! Structural problems (missing fields, wrong JSON types) are rejected by
//! serde before a [`SamplePayload`] exists; this module only checks domain
//! bounds. Field names in error messages follow the data model
//! (`cpuUsagePercent`, ...) rather than the wire names, so a violation is
//! unambiguous regardless of which client sent it.

use crate::types::SamplePayload;
use thiserror::Error;

/// A single out-of-range field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One or more sample fields violate their domain bounds.
///
/// All violations are collected so an agent author sees every problem in a
/// single rejection.
#[derive(Debug, Clone, Error)]
#[error("invalid sample: {}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

/// Check a candidate sample against the domain bounds.
///
/// Pure function of the payload; no side effects.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every violated field when any of the
/// following does not hold: `0 <= cpuUsagePercent <= 100`,
/// `0 <= memoryUsagePercent <= 100`, `memoryTotalBytes >= 0`,
/// `0 <= memoryUsedBytes <= memoryTotalBytes`. Non-finite percentages are
/// rejected as out of range.
pub fn validate_sample(payload: &SamplePayload) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    if !payload.cpu_usage.is_finite() || !(0.0..=100.0).contains(&payload.cpu_usage) {
        errors.push(FieldError {
            field: "cpuUsagePercent",
            message: format!("must be between 0 and 100, got {}", payload.cpu_usage),
        });
    }
    if !payload.memory_usage.is_finite() || !(0.0..=100.0).contains(&payload.memory_usage) {
        errors.push(FieldError {
            field: "memoryUsagePercent",
            message: format!("must be between 0 and 100, got {}", payload.memory_usage),
        });
    }
    if payload.memory_total < 0 {
        errors.push(FieldError {
            field: "memoryTotalBytes",
            message: format!("must be non-negative, got {}", payload.memory_total),
        });
    }
    if payload.memory_used < 0 {
        errors.push(FieldError {
            field: "memoryUsedBytes",
            message: format!("must be non-negative, got {}", payload.memory_used),
        });
    } else if payload.memory_total >= 0 && payload.memory_used > payload.memory_total {
        errors.push(FieldError {
            field: "memoryUsedBytes",
            message: format!(
                "must not exceed memoryTotalBytes ({} > {})",
                payload.memory_used, payload.memory_total
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}
