// crates/swapshop-service/src/lifecycle.rs
//
// LifecycleHook: trust updates triggered as a side effect of marketplace
// actions (returns, disputes, fulfilled requests, cancellations).
//
// The triggering action has already succeeded by the time the hook runs,
// so a trust-score failure here must not fail it. `handle` logs and
// reports success as a bool; it never returns an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use swapshop_core::{RequestRef, Summary, SwapshopError, TransactionRef, UserId};

use crate::service::TrustScoreService;

/// A completed marketplace action that affects trust scores.
///
/// Serialized with an `action` tag carrying the action name, e.g.
/// `{"action": "item_returned_late", "borrower_id": "...", "transaction_ref": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LifecycleAction {
    ItemReturnedOntime {
        lender_id: UserId,
        borrower_id: UserId,
        #[serde(default)]
        transaction_ref: Option<TransactionRef>,
    },
    ItemReturnedEarly {
        borrower_id: UserId,
        #[serde(default)]
        transaction_ref: Option<TransactionRef>,
    },
    ItemReturnedLate {
        borrower_id: UserId,
        #[serde(default)]
        transaction_ref: Option<TransactionRef>,
    },
    ItemNotReturned {
        borrower_id: UserId,
        #[serde(default)]
        transaction_ref: Option<TransactionRef>,
    },
    RequestFulfilled {
        helper_id: UserId,
        #[serde(default)]
        request_ref: Option<RequestRef>,
        #[serde(default)]
        request_title: Option<String>,
    },
    LendingCancelledUnfairly {
        lender_id: UserId,
        #[serde(default)]
        transaction_ref: Option<TransactionRef>,
    },
}

impl LifecycleAction {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleAction::ItemReturnedOntime { .. } => "item_returned_ontime",
            LifecycleAction::ItemReturnedEarly { .. } => "item_returned_early",
            LifecycleAction::ItemReturnedLate { .. } => "item_returned_late",
            LifecycleAction::ItemNotReturned { .. } => "item_not_returned",
            LifecycleAction::RequestFulfilled { .. } => "request_fulfilled",
            LifecycleAction::LendingCancelledUnfairly { .. } => "lending_cancelled_unfairly",
        }
    }
}

/// Best-effort bridge from lifecycle actions to `TrustScoreService`.
#[derive(Debug, Clone)]
pub struct LifecycleHook {
    service: Arc<TrustScoreService>,
}

impl LifecycleHook {
    pub fn new(service: Arc<TrustScoreService>) -> Self {
        Self { service }
    }

    /// Apply the trust update for `action`. Returns whether it was recorded.
    pub async fn handle(&self, action: LifecycleAction) -> bool {
        let name = action.name();
        match self.dispatch(action).await {
            Ok(summaries) => {
                debug!(action = name, updated = summaries.len(), "Lifecycle trust update applied");
                true
            }
            Err(e) => {
                error!(action = name, "Lifecycle trust update failed: {}", e);
                false
            }
        }
    }

    /// Run `handle` on a background task so the caller does not wait.
    pub fn spawn(&self, action: LifecycleAction) -> tokio::task::JoinHandle<bool> {
        let hook = self.clone();
        tokio::spawn(async move { hook.handle(action).await })
    }

    async fn dispatch(&self, action: LifecycleAction) -> Result<Vec<Summary>, SwapshopError> {
        let svc = &self.service;
        match action {
            LifecycleAction::ItemReturnedOntime {
                lender_id,
                borrower_id,
                transaction_ref,
            } => {
                let outcome = svc
                    .record_lending_success(&lender_id, &borrower_id, transaction_ref)
                    .await?;
                Ok(vec![outcome.lender, outcome.borrower])
            }
            LifecycleAction::ItemReturnedEarly {
                borrower_id,
                transaction_ref,
            } => Ok(vec![svc.record_early_return(&borrower_id, transaction_ref).await?]),
            LifecycleAction::ItemReturnedLate {
                borrower_id,
                transaction_ref,
            } => Ok(vec![svc.record_late_return(&borrower_id, transaction_ref).await?]),
            LifecycleAction::ItemNotReturned {
                borrower_id,
                transaction_ref,
            } => Ok(vec![svc.record_non_return(&borrower_id, transaction_ref).await?]),
            LifecycleAction::RequestFulfilled {
                helper_id,
                request_ref,
                request_title,
            } => Ok(vec![
                svc.record_fulfilled_request(&helper_id, request_ref, request_title.as_deref())
                    .await?,
            ]),
            LifecycleAction::LendingCancelledUnfairly {
                lender_id,
                transaction_ref,
            } => Ok(vec![svc.record_unfair_cancel(&lender_id, transaction_ref).await?]),
        }
    }
}
