// crates/swapshop-core/src/event.rs
//
// Reputation ledger entries and the fixed impact table.
//
// Base points per event kind:
//   lender_ontime_return    +80
//   borrower_ontime_return  +40
//   borrower_early_return   +60   (40 base + 20 early bonus)
//   fulfilled_request       +60
//   first_transaction       +30   (bonus folded into the first positive event)
//   late_return             -50
//   non_return_dispute     -100
//   lender_unfair_cancel    -40
//   admin_penalty           -70   (admin may override)
//   manual_adjustment         0   (admin supplies the value)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SwapshopError;
use crate::identity::{RequestRef, TransactionRef};

/// Maximum length of an event description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Maximum length of admin notes, in characters.
pub const MAX_ADMIN_NOTES_LEN: usize = 500;

/// Cut `text` to at most `max` characters.
pub fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Kind of reputation-affecting occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LenderOntimeReturn,
    BorrowerOntimeReturn,
    BorrowerEarlyReturn,
    FulfilledRequest,
    FirstTransaction,
    LateReturn,
    NonReturnDispute,
    LenderUnfairCancel,
    AdminPenalty,
    ManualAdjustment,
}

impl EventKind {
    /// All kinds, in impact-table order.
    pub const ALL: [EventKind; 10] = [
        EventKind::LenderOntimeReturn,
        EventKind::BorrowerOntimeReturn,
        EventKind::BorrowerEarlyReturn,
        EventKind::FulfilledRequest,
        EventKind::FirstTransaction,
        EventKind::LateReturn,
        EventKind::NonReturnDispute,
        EventKind::LenderUnfairCancel,
        EventKind::AdminPenalty,
        EventKind::ManualAdjustment,
    ];

    /// Fixed base points used when an event is appended without an override.
    pub fn base_impact(&self) -> i32 {
        match self {
            EventKind::LenderOntimeReturn => 80,
            EventKind::BorrowerOntimeReturn => 40,
            EventKind::BorrowerEarlyReturn => 60,
            EventKind::FulfilledRequest => 60,
            EventKind::FirstTransaction => 30,
            EventKind::LateReturn => -50,
            EventKind::NonReturnDispute => -100,
            EventKind::LenderUnfairCancel => -40,
            EventKind::AdminPenalty => -70,
            EventKind::ManualAdjustment => 0,
        }
    }

    /// Stable wire tag, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::LenderOntimeReturn => "lender_ontime_return",
            EventKind::BorrowerOntimeReturn => "borrower_ontime_return",
            EventKind::BorrowerEarlyReturn => "borrower_early_return",
            EventKind::FulfilledRequest => "fulfilled_request",
            EventKind::FirstTransaction => "first_transaction",
            EventKind::LateReturn => "late_return",
            EventKind::NonReturnDispute => "non_return_dispute",
            EventKind::LenderUnfairCancel => "lender_unfair_cancel",
            EventKind::AdminPenalty => "admin_penalty",
            EventKind::ManualAdjustment => "manual_adjustment",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = SwapshopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SwapshopError::Validation(format!("Unknown event kind: {}", s)))
    }
}

/// Optional references tying an event back to the marketplace entity that caused it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRefs {
    /// Transaction that triggered the event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<TransactionRef>,
    /// Request that triggered the event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_ref: Option<RequestRef>,
}

impl EventRefs {
    pub fn transaction(id: TransactionRef) -> Self {
        Self {
            transaction_ref: Some(id),
            request_ref: None,
        }
    }

    pub fn request(id: RequestRef) -> Self {
        Self {
            transaction_ref: None,
            request_ref: Some(id),
        }
    }
}

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustEvent {
    pub kind: EventKind,
    /// Effective impact, including any first-transaction bonus.
    pub impact: i32,
    #[serde(flatten)]
    pub refs: EventRefs,
    pub description: String,
    /// Internal notes, hidden from public summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TrustEvent {
    /// Copy of this event with admin notes removed, safe for other users to see.
    pub fn redacted(&self) -> TrustEvent {
        TrustEvent {
            admin_notes: None,
            ..self.clone()
        }
    }
}

/// Result of appending one event to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedEvent {
    /// The entry as stored in the ledger.
    pub event: TrustEvent,
    /// Whether the one-time first-transaction bonus was folded into `event.impact`.
    pub bonus_applied: bool,
    pub previous_score: u16,
    pub new_score: u16,
    pub star_rating: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_table_values() {
        assert_eq!(EventKind::LenderOntimeReturn.base_impact(), 80);
        assert_eq!(EventKind::BorrowerOntimeReturn.base_impact(), 40);
        assert_eq!(EventKind::BorrowerEarlyReturn.base_impact(), 60);
        assert_eq!(EventKind::FulfilledRequest.base_impact(), 60);
        assert_eq!(EventKind::FirstTransaction.base_impact(), 30);
        assert_eq!(EventKind::LateReturn.base_impact(), -50);
        assert_eq!(EventKind::NonReturnDispute.base_impact(), -100);
        assert_eq!(EventKind::LenderUnfairCancel.base_impact(), -40);
        assert_eq!(EventKind::AdminPenalty.base_impact(), -70);
        assert_eq!(EventKind::ManualAdjustment.base_impact(), 0);
    }

    #[test]
    fn test_kind_tags_match_serde() {
        for kind in EventKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_validation_error() {
        let err = "borrow_forever".parse::<EventKind>().unwrap_err();
        assert!(matches!(err, SwapshopError::Validation(_)));
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_text("short", 200), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc");
        assert_eq!(truncate_text("ééé", 2), "éé");
    }

    #[test]
    fn test_redacted_drops_admin_notes() {
        let event = TrustEvent {
            kind: EventKind::AdminPenalty,
            impact: -70,
            refs: EventRefs::default(),
            description: "Spam listings".to_string(),
            admin_notes: Some("third warning".to_string()),
            occurred_at: Utc::now(),
        };
        let public = event.redacted();
        assert!(public.admin_notes.is_none());
        assert_eq!(public.description, "Spam listings");
        assert_eq!(public.impact, -70);
    }
}
