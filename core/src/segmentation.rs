//! Segmentation engine: assigns every record exactly one market segment.
//!
//! Decision policy, evaluated in this fixed order (first match wins):
//!   1. bank AND mobile AND literacy >= digital_threshold → DigitalChampion
//!   2. mobile AND NOT bank                               → MobileOnly
//!   3. bank AND NOT mobile                               → TraditionalBanking
//!   4. otherwise                                         → FinanciallyExcluded
//!
//! The predicates are mutually exclusive, so order only documents
//! precedence should a predicate ever change.

use crate::{
    config::SegmentationConfig,
    features::{derive, DerivedFeatures},
    record::Record,
    types::AreaType,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    DigitalChampion,
    MobileOnly,
    TraditionalBanking,
    FinanciallyExcluded,
}

impl Segment {
    /// Presentation order. Distributions are always reported in this order.
    pub const ALL: [Segment; 4] = [
        Self::DigitalChampion,
        Self::MobileOnly,
        Self::TraditionalBanking,
        Self::FinanciallyExcluded,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::DigitalChampion => "Digital Champion",
            Self::MobileOnly => "Mobile-Only User",
            Self::TraditionalBanking => "Traditional Banking User",
            Self::FinanciallyExcluded => "Financially Excluded",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(record: &Record, config: &SegmentationConfig) -> Segment {
    let bank = record.has_bank_account;
    let mobile = record.uses_mobile_money;
    let literacy = record.financial_literacy_score;

    if bank && mobile && literacy >= config.digital_threshold {
        Segment::DigitalChampion
    } else if mobile && !bank {
        Segment::MobileOnly
    } else if bank && !mobile {
        Segment::TraditionalBanking
    } else {
        Segment::FinanciallyExcluded
    }
}

/// A cleaned record with its derived features and segment attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedRecord {
    pub record: Record,
    pub features: DerivedFeatures,
    pub segment: Segment,
}

impl AnalyzedRecord {
    pub fn new(record: Record, config: &SegmentationConfig) -> Self {
        let features = derive(&record);
        let segment = classify(&record, config);
        Self {
            record,
            features,
            segment,
        }
    }
}

/// Derive features and classify every record. Order is preserved.
pub fn classify_all(records: &[Record], config: &SegmentationConfig) -> Vec<AnalyzedRecord> {
    let analyzed: Vec<AnalyzedRecord> = records
        .iter()
        .cloned()
        .map(|r| AnalyzedRecord::new(r, config))
        .collect();

    let mut counts = [0usize; 4];
    for a in &analyzed {
        counts[a.segment.index()] += 1;
    }
    log::info!(
        "Segmented {} records at digital_threshold={}: {}",
        analyzed.len(),
        config.digital_threshold,
        Segment::ALL
            .iter()
            .map(|s| format!("{}={}", s.label(), counts[s.index()]))
            .collect::<Vec<_>>()
            .join(", ")
    );
    analyzed
}

/// Characteristics of one non-empty segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentProfile {
    pub segment: Segment,
    pub size: usize,
    /// Percentage of the whole population, unrounded.
    pub share_pct: f64,
    pub mean_income_rwf: f64,
    /// Percentage of segment members living in urban areas.
    pub urban_pct: f64,
    pub mean_literacy: f64,
}

/// Profile every segment that has at least one member, in segment order.
pub fn segment_profiles(records: &[AnalyzedRecord]) -> Vec<SegmentProfile> {
    let total = records.len();
    Segment::ALL
        .iter()
        .filter_map(|&segment| {
            let members: Vec<&Record> = records
                .iter()
                .filter(|a| a.segment == segment)
                .map(|a| &a.record)
                .collect();
            if members.is_empty() {
                return None;
            }
            let n = members.len() as f64;
            let urban = members.iter().filter(|r| r.area == AreaType::Urban).count();
            Some(SegmentProfile {
                segment,
                size: members.len(),
                share_pct: members.len() as f64 / total as f64 * 100.0,
                mean_income_rwf: members.iter().map(|r| r.monthly_income_rwf).sum::<f64>() / n,
                urban_pct: urban as f64 / n * 100.0,
                mean_literacy: members.iter().map(|r| r.financial_literacy_score).sum::<f64>() / n,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold(t: f64) -> SegmentationConfig {
        SegmentationConfig {
            digital_threshold: t,
        }
    }

    #[test]
    fn dual_user_above_threshold_is_digital_champion() {
        let r = Record::sample("r1").with_services(true, true).with_literacy(90.0);
        assert_eq!(classify(&r, &threshold(80.0)), Segment::DigitalChampion);
    }

    #[test]
    fn threshold_is_inclusive() {
        let r = Record::sample("r1").with_services(true, true).with_literacy(80.0);
        assert_eq!(classify(&r, &threshold(80.0)), Segment::DigitalChampion);
    }

    #[test]
    fn dual_user_below_threshold_falls_through_to_excluded() {
        let r = Record::sample("r1").with_services(true, true).with_literacy(40.0);
        assert_eq!(classify(&r, &threshold(80.0)), Segment::FinanciallyExcluded);
    }

    #[test]
    fn segment_order_is_presentation_order() {
        for (i, s) in Segment::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn profiles_skip_empty_segments() {
        let config = threshold(0.0);
        let records = classify_all(
            &[
                Record::sample("a").with_services(false, true),
                Record::sample("b").with_services(false, true).with_area(AreaType::Urban),
            ],
            &config,
        );
        let profiles = segment_profiles(&records);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].segment, Segment::MobileOnly);
        assert_eq!(profiles[0].size, 2);
        assert_eq!(profiles[0].share_pct, 100.0);
        assert_eq!(profiles[0].urban_pct, 50.0);
    }
}
