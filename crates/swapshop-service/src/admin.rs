// crates/swapshop-service/src/admin.rs
//
// Admin request types and their validation.
//
// Everything here runs before any record is loaded, so a rejected request
// leaves no partial state behind.

use serde::{Deserialize, Serialize};

use swapshop_core::event::{MAX_ADMIN_NOTES_LEN, MAX_DESCRIPTION_LEN};
use swapshop_core::SwapshopError;

use crate::config::ServiceConfig;

/// Admin penalty against a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRequest {
    /// Required; stored as the event description.
    pub reason: String,
    #[serde(default)]
    pub admin_notes: Option<String>,
    /// Overrides the configured default penalty. Must be negative.
    #[serde(default)]
    pub custom_impact: Option<i32>,
}

impl PenaltyRequest {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            admin_notes: None,
            custom_impact: None,
        }
    }

    pub fn with_impact(mut self, impact: i32) -> Self {
        self.custom_impact = Some(impact);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.admin_notes = Some(notes.into());
        self
    }

    /// Check the request and return the impact to apply.
    pub fn validate(&self, config: &ServiceConfig) -> Result<i32, SwapshopError> {
        require_reason(&self.reason)?;
        check_notes(self.admin_notes.as_deref())?;

        match self.custom_impact {
            None => Ok(config.default_penalty),
            Some(impact) if impact >= 0 => Err(SwapshopError::Validation(format!(
                "Penalty impact must be negative, got {}",
                impact
            ))),
            Some(impact) if impact.unsigned_abs() > config.max_adjustment.unsigned_abs() => {
                Err(SwapshopError::Validation(format!(
                    "Penalty impact {} exceeds the maximum of {} points",
                    impact, config.max_adjustment
                )))
            }
            Some(impact) => Ok(impact),
        }
    }
}

/// Admin manual adjustment of a user's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub impact: i32,
    /// Required; stored as the event description.
    pub reason: String,
    /// Defaults to a note that repeats the reason.
    #[serde(default)]
    pub admin_notes: Option<String>,
}

impl AdjustmentRequest {
    pub fn new(impact: i32, reason: impl Into<String>) -> Self {
        Self {
            impact,
            reason: reason.into(),
            admin_notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.admin_notes = Some(notes.into());
        self
    }

    pub fn validate(&self, config: &ServiceConfig) -> Result<(), SwapshopError> {
        require_reason(&self.reason)?;
        check_notes(self.admin_notes.as_deref())?;

        if self.impact.unsigned_abs() > config.max_adjustment.unsigned_abs() {
            return Err(SwapshopError::Validation(format!(
                "Adjustment cannot exceed ±{} points, got {}",
                config.max_adjustment, self.impact
            )));
        }
        Ok(())
    }

    /// Admin notes to store: the supplied notes, or one naming the reason.
    pub fn notes_or_default(&self) -> String {
        match self.admin_notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => notes.to_string(),
            _ => format!("Manual adjustment by admin. Reason: {}", self.reason.trim()),
        }
    }
}

/// Reject a blank reason or one too long to store as a description.
pub fn require_reason(reason: &str) -> Result<(), SwapshopError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(SwapshopError::Validation("A reason is required".to_string()));
    }
    if reason.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(SwapshopError::Validation(format!(
            "Reason exceeds {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

fn check_notes(notes: Option<&str>) -> Result<(), SwapshopError> {
    match notes {
        Some(n) if n.chars().count() > MAX_ADMIN_NOTES_LEN => Err(SwapshopError::Validation(
            format!("Admin notes exceed {} characters", MAX_ADMIN_NOTES_LEN),
        )),
        _ => Ok(()),
    }
}
