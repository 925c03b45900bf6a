// crates/swapshop-reputation/src/browse.rs
//
// Admin browsing: rows, trust-level filters, and 1-based pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use swapshop_core::{ScoreRecord, TrustLevel, UserId};

/// One row of the admin record listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRow {
    pub user_id: UserId,
    pub current_score: u16,
    pub star_rating: u8,
    pub trust_level: TrustLevel,
    pub total_transactions: u64,
    pub positive_transactions: u64,
    pub negative_transactions: u64,
    pub last_activity_at: DateTime<Utc>,
    pub months_inactive: u32,
    pub is_first_transaction: bool,
}

impl From<&ScoreRecord> for AdminRow {
    fn from(r: &ScoreRecord) -> Self {
        Self {
            user_id: r.user_id,
            current_score: r.current_score(),
            star_rating: r.star_rating(),
            trust_level: r.trust_level(),
            total_transactions: r.total_transactions,
            positive_transactions: r.positive_transactions,
            negative_transactions: r.negative_transactions,
            last_activity_at: r.last_activity_at,
            months_inactive: r.months_inactive,
            is_first_transaction: r.is_first_transaction,
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, 1-based.
    pub current: usize,
    pub total_pages: usize,
    /// Rows on this page.
    pub count: usize,
    /// Rows across all pages.
    pub total_count: usize,
}

/// A page of items plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Slice `items` into a 1-based page. `page` 0 is treated as 1, `limit` 0 as 1.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total_count = items.len();
    let total_pages = total_count.div_ceil(limit);

    let items: Vec<T> = items
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    Page {
        pagination: Pagination {
            current: page,
            total_pages,
            count: items.len(),
            total_count,
        },
        items,
    }
}
