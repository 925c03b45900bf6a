// crates/swapshop-store/src/lib.rs
//
// swapshop-store: Storage layer for SwapShop trust scores.
//
// Provides a RocksDB-backed ScoreStore using optimistic transactions (unique
// creation and versioned saves are enforced inside RocksDB), an in-memory
// ScoreStore for tests and embedding, projection stores for the
// denormalized user profile fields, and TrustScoreStore, which layers the
// get-or-create and bounded-retry update cycle on top of any backend.

pub mod memory;
pub mod projection;
pub mod retry;
pub mod rocks;
pub mod trust_store;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::InMemoryScoreStore;
pub use projection::{InMemoryProjectionStore, RocksProjectionStore};
pub use retry::RetryPolicy;
pub use rocks::RocksScoreStore;
pub use trust_store::TrustScoreStore;
