//! Aggregator: population and group-level summary statistics.
//!
//! Reports are recomputed from the analyzed record set on every call and
//! never updated incrementally. All values are kept unrounded; rounding
//! to one decimal happens only in the presentation helpers at the bottom
//! of this file.

use crate::{
    error::InvalidGroupingError,
    segmentation::{AnalyzedRecord, Segment},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Key of the single report returned when no grouping is requested.
pub const OVERALL_KEY: &str = "overall";

/// Histogram bins for service_count: 0 through 5 services used.
pub const SERVICE_COUNT_BINS: usize = 6;

// ── Grouping dimension ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingDimension {
    Province,
    Gender,
    Education,
    Area,
    AgeGroup,
    IncomeBracket,
}

impl GroupingDimension {
    pub const ALL: [GroupingDimension; 6] = [
        Self::Province,
        Self::Gender,
        Self::Education,
        Self::Area,
        Self::AgeGroup,
        Self::IncomeBracket,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::Gender => "gender",
            Self::Education => "education",
            Self::Area => "area",
            Self::AgeGroup => "age_group",
            Self::IncomeBracket => "income_bracket",
        }
    }

    /// Group label of one analyzed record under this dimension.
    pub fn key_of(&self, analyzed: &AnalyzedRecord) -> &'static str {
        let record = &analyzed.record;
        match self {
            Self::Province => record.province.label(),
            Self::Gender => record.gender.label(),
            Self::Education => analyzed.features.education_bucket.label(),
            Self::Area => record.area.label(),
            Self::AgeGroup => analyzed.features.age_group.label(),
            Self::IncomeBracket => record.income_bracket.label(),
        }
    }
}

impl fmt::Display for GroupingDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GroupingDimension {
    type Err = InvalidGroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "province" => Ok(Self::Province),
            "gender" => Ok(Self::Gender),
            "education" | "education_bucket" => Ok(Self::Education),
            "area" | "urban_rural" => Ok(Self::Area),
            "age_group" => Ok(Self::AgeGroup),
            "income_bracket" | "income_quintile" => Ok(Self::IncomeBracket),
            _ => Err(InvalidGroupingError {
                requested: s.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|d| d.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

// ── Reports ──────────────────────────────────────────────────────────────────

/// Adoption rate of each tracked service, as fractions in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAdoption {
    pub bank_account: f64,
    pub mobile_money: f64,
    pub savings: f64,
    pub loan: f64,
    pub insurance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub record_count: usize,
    /// Fraction formally included, in [0, 1].
    pub inclusion_rate: f64,
    /// Segment → percentage of this partition. Sums to 100 when non-empty;
    /// empty for an empty partition.
    pub segment_distribution: BTreeMap<Segment, f64>,
    pub mean_literacy: f64,
    pub adoption: ServiceAdoption,
    /// Records not formally included.
    pub excluded_count: usize,
    pub mean_income_rwf: f64,
    pub mean_service_count: f64,
    /// Respondents by number of services used; index is the count.
    /// Sums to `record_count`.
    pub service_count_distribution: [usize; SERVICE_COUNT_BINS],
}

impl AggregateReport {
    pub fn from_partition(members: &[&AnalyzedRecord]) -> Self {
        if members.is_empty() {
            return Self::default();
        }
        let n = members.len() as f64;

        let mut segment_counts = [0usize; 4];
        for a in members {
            segment_counts[a.segment.index()] += 1;
        }
        let segment_distribution = Segment::ALL
            .iter()
            .map(|&s| (s, segment_counts[s.index()] as f64 / n * 100.0))
            .collect();

        let included = members
            .iter()
            .filter(|a| a.features.is_formally_included)
            .count();

        let mut service_count_distribution = [0usize; SERVICE_COUNT_BINS];
        for a in members {
            let bin = usize::from(a.features.service_count).min(SERVICE_COUNT_BINS - 1);
            service_count_distribution[bin] += 1;
        }

        Self {
            record_count: members.len(),
            inclusion_rate: included as f64 / n,
            segment_distribution,
            mean_literacy: mean(members, |a| a.record.financial_literacy_score),
            adoption: ServiceAdoption {
                bank_account: share(members, |a| a.record.has_bank_account),
                mobile_money: share(members, |a| a.record.uses_mobile_money),
                savings: share(members, |a| a.record.has_savings),
                loan: share(members, |a| a.record.has_loan),
                insurance: share(members, |a| a.record.uses_insurance),
            },
            excluded_count: members.len() - included,
            mean_income_rwf: mean(members, |a| a.record.monthly_income_rwf),
            mean_service_count: mean(members, |a| a.features.service_count as f64),
            service_count_distribution,
        }
    }

    pub fn segment_pct(&self, segment: Segment) -> f64 {
        self.segment_distribution.get(&segment).copied().unwrap_or(0.0)
    }

    pub fn distribution_total(&self) -> f64 {
        self.segment_distribution.values().sum()
    }
}

fn share(members: &[&AnalyzedRecord], pred: impl Fn(&AnalyzedRecord) -> bool) -> f64 {
    members.iter().filter(|a| pred(a)).count() as f64 / members.len() as f64
}

fn mean(members: &[&AnalyzedRecord], value: impl Fn(&AnalyzedRecord) -> f64) -> f64 {
    members.iter().map(|a| value(a)).sum::<f64>() / members.len() as f64
}

/// Reports keyed by group label, in first-appearance order of the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedReports {
    pub dimension: Option<GroupingDimension>,
    pub groups: IndexMap<String, AggregateReport>,
}

impl GroupedReports {
    pub fn get(&self, key: &str) -> Option<&AggregateReport> {
        self.groups.get(key)
    }

    pub fn overall(&self) -> Option<&AggregateReport> {
        self.get(OVERALL_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateReport)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of record counts across every group.
    pub fn total_records(&self) -> usize {
        self.groups.values().map(|r| r.record_count).sum()
    }
}

// ── Aggregation ──────────────────────────────────────────────────────────────

/// Aggregate the whole population (`None`) or one report per group.
pub fn aggregate(
    records: &[AnalyzedRecord],
    group_by: Option<GroupingDimension>,
) -> GroupedReports {
    let Some(dimension) = group_by else {
        let everyone: Vec<&AnalyzedRecord> = records.iter().collect();
        let mut groups = IndexMap::with_capacity(1);
        groups.insert(OVERALL_KEY.to_string(), AggregateReport::from_partition(&everyone));
        return GroupedReports {
            dimension: None,
            groups,
        };
    };

    let mut partitions: IndexMap<&'static str, Vec<&AnalyzedRecord>> = IndexMap::new();
    for analyzed in records {
        partitions
            .entry(dimension.key_of(analyzed))
            .or_default()
            .push(analyzed);
    }

    let groups: IndexMap<String, AggregateReport> = partitions
        .iter()
        .map(|(key, members)| {
            let report = AggregateReport::from_partition(members);
            log::debug!(
                "{dimension}={key}: n={} inclusion={:.3}",
                report.record_count,
                report.inclusion_rate
            );
            (key.to_string(), report)
        })
        .collect();

    GroupedReports {
        dimension: Some(dimension),
        groups,
    }
}

/// Like `aggregate`, with the dimension given by name.
pub fn aggregate_by_name(
    records: &[AnalyzedRecord],
    group_by: Option<&str>,
) -> Result<GroupedReports, InvalidGroupingError> {
    let dimension = group_by.map(str::parse::<GroupingDimension>).transpose()?;
    Ok(aggregate(records, dimension))
}

// ── Presentation ─────────────────────────────────────────────────────────────

/// Round to one decimal place. Presentation only.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} inclusion={:.1}% literacy={:.1}",
            self.record_count,
            self.inclusion_rate * 100.0,
            self.mean_literacy
        )?;
        for (segment, pct) in &self.segment_distribution {
            write!(f, " | {}: {:.1}%", segment, pct)?;
        }
        Ok(())
    }
}
