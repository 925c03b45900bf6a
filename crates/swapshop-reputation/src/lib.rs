// crates/swapshop-reputation/src/lib.rs
//
// swapshop-reputation: Policy over trust-score records.
//
// Everything here is a pure function of one or more ScoreRecords: whether a
// user may transact, how the population of scores is distributed, and how
// admins page through records by tier. No I/O.

pub mod browse;
pub mod eligibility;
pub mod stats;

pub use browse::{paginate, AdminRow, Page, Pagination};
pub use eligibility::{evaluate, Eligibility, TransactionIntent};
pub use stats::{AggregateStats, TierHistogram};
