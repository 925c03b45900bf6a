// crates/swapshop-reputation/src/stats.rs
//
// Aggregate statistics over all trust-score records.

use serde::{Deserialize, Serialize};

use swapshop_core::tier::BASE_SCORE;
use swapshop_core::{ScoreRecord, TrustLevel};

/// Count of records per trust tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierHistogram {
    pub excellent: u64,
    pub good: u64,
    pub fair: u64,
    pub risky: u64,
    pub very_poor: u64,
}

impl TierHistogram {
    pub fn record(&mut self, level: TrustLevel) {
        match level {
            TrustLevel::Excellent => self.excellent += 1,
            TrustLevel::Good => self.good += 1,
            TrustLevel::Fair => self.fair += 1,
            TrustLevel::Risky => self.risky += 1,
            TrustLevel::VeryPoor => self.very_poor += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.excellent + self.good + self.fair + self.risky + self.very_poor
    }
}

/// Population-wide score statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_users: u64,
    pub average_score: f64,
    pub highest_score: u16,
    pub lowest_score: u16,
    pub total_transactions: u64,
    pub total_positive_transactions: u64,
    pub total_negative_transactions: u64,
    pub tiers: TierHistogram,
}

impl AggregateStats {
    /// Statistics for an empty population: base score everywhere, zero counts.
    pub fn empty() -> Self {
        Self {
            total_users: 0,
            average_score: BASE_SCORE as f64,
            highest_score: BASE_SCORE,
            lowest_score: BASE_SCORE,
            total_transactions: 0,
            total_positive_transactions: 0,
            total_negative_transactions: 0,
            tiers: TierHistogram::default(),
        }
    }

    /// Fold a set of records into statistics.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ScoreRecord>,
    {
        let mut stats = Self::empty();
        let mut score_sum: u64 = 0;

        for record in records {
            let score = record.current_score();
            if stats.total_users == 0 {
                stats.highest_score = score;
                stats.lowest_score = score;
            } else {
                stats.highest_score = stats.highest_score.max(score);
                stats.lowest_score = stats.lowest_score.min(score);
            }
            stats.total_users += 1;
            score_sum += score as u64;
            stats.total_transactions += record.total_transactions;
            stats.total_positive_transactions += record.positive_transactions;
            stats.total_negative_transactions += record.negative_transactions;
            stats.tiers.record(record.trust_level());
        }

        if stats.total_users > 0 {
            stats.average_score = score_sum as f64 / stats.total_users as f64;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use swapshop_core::{EventKind, EventRefs};
    use uuid::Uuid;

    fn record_with(impacts: &[i32]) -> ScoreRecord {
        let mut r = ScoreRecord::new(Uuid::now_v7(), Utc::now());
        for &impact in impacts {
            r.append_event(
                EventKind::ManualAdjustment,
                Some(impact),
                EventRefs::default(),
                "seed",
                None,
                Utc::now(),
            );
        }
        r
    }

    #[test]
    fn test_empty_population_defaults() {
        let stats = AggregateStats::from_records(std::iter::empty());
        assert_eq!(stats, AggregateStats::empty());
        assert_eq!(stats.average_score, 650.0);
        assert_eq!(stats.highest_score, 650);
        assert_eq!(stats.lowest_score, 650);
    }

    #[test]
    fn test_aggregates_scores_counts_and_tiers() {
        let records = vec![
            record_with(&[]),          // 650 fair
            record_with(&[-500]),      // 450 risky
            record_with(&[-30, 300]),  // 300 gets the +30 bonus: 650 + 2*(-30+330)/5 = 770 good
        ];
        let stats = AggregateStats::from_records(&records);
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.highest_score, 770);
        assert_eq!(stats.lowest_score, 450);
        assert!((stats.average_score - (650.0 + 450.0 + 770.0) / 3.0).abs() < 1e-9);
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.total_positive_transactions, 1);
        assert_eq!(stats.total_negative_transactions, 2);
        assert_eq!(stats.tiers.fair, 1);
        assert_eq!(stats.tiers.risky, 1);
        assert_eq!(stats.tiers.good, 1);
        assert_eq!(stats.tiers.total(), 3);
    }

    #[test]
    fn test_serializes_flat_field_names() {
        let json = serde_json::to_value(AggregateStats::empty()).unwrap();
        assert_eq!(json["total_users"], 0);
        assert_eq!(json["tiers"]["very_poor"], 0);
    }
}
