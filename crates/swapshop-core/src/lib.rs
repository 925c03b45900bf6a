// crates/swapshop-core/src/lib.rs
//
// swapshop-core: Core types, traits, and trust-score primitives for SwapShop.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the reputation ledger (ScoreRecord), the scoring engine that
// derives a score from that ledger, the error type, and the storage and
// projection traits implemented by swapshop-store.

pub mod decay;
pub mod error;
pub mod event;
pub mod identity;
pub mod record;
pub mod scoring;
pub mod summary;
pub mod tier;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use swapshop_core::ScoreRecord;`

// Ledger types
pub use event::{AppliedEvent, EventKind, EventRefs, TrustEvent};
pub use record::ScoreRecord;

// Identity types
pub use identity::{RequestRef, TransactionRef, UserId};

// Scoring
pub use scoring::{recalculate, ScoreOutcome};
pub use tier::{star_rating, TrustLevel};

// Read models
pub use summary::{DetailedSummary, ProjectionUpdate, PublicSummary, Summary, UserProjection};

// Error type
pub use error::SwapshopError;

// Traits
pub use traits::{ProjectionSink, ScoreStore};
