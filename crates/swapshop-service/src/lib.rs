// crates/swapshop-service/src/lib.rs
//
// swapshop-service: Trust-score orchestration for SwapShop.
//
// TrustScoreService is the one entry point collaborators call: lifecycle
// event recording, admin adjustments and resets, eligibility checks,
// leaderboard/statistics/browse queries, the batch inactivity sweep, and
// projection resync. LifecycleHook wraps it for side-effect callers that
// must never see a trust-score failure.

pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod service;

pub use admin::{AdjustmentRequest, PenaltyRequest};
pub use config::ServiceConfig;
pub use lifecycle::{LifecycleAction, LifecycleHook};
pub use service::{
    DecayedUser, InitFailure, InitReport, LendingOutcome, SweepReport, SyncReport,
    TrustScoreService,
};
