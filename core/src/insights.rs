//! Policy insight generator: fixed rule table over aggregate reports.
//!
//! This module is REACTIVE. It never touches records; it reads the
//! overall report and the urban/rural split and decides which canned
//! recommendations apply.
//!
//! Rules are evaluated in table order and each fires at most once:
//!   1. rural inclusion trails urban by more than `urban_rural_gap_pp`
//!   2. mean literacy is below `literacy_target`
//!   3. mobile money adoption exceeds bank account adoption
//!   4. overall inclusion is below `inclusion_target`

use crate::{
    aggregation::{AggregateReport, GroupedReports},
    config::InsightConfig,
    types::AreaType,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub rule: &'static str,
    pub title: &'static str,
    pub priority: Priority,
    pub description: &'static str,
    /// Population the recommendation targets, e.g. "1,204 rural residents".
    pub target: String,
    pub impact: &'static str,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} Target population: {}. Expected impact: {}.",
            self.priority.label(),
            self.title,
            self.description,
            self.target,
            self.impact
        )
    }
}

/// Everything the rule table reads. Built from aggregator outputs only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightInput {
    pub overall: AggregateReport,
    pub urban: Option<AggregateReport>,
    pub rural: Option<AggregateReport>,
    /// Respondents scoring below `low_literacy_threshold`.
    pub low_literacy_count: usize,
}

impl InsightInput {
    /// `by_area` must be grouped by `GroupingDimension::Area`.
    pub fn new(overall: AggregateReport, by_area: &GroupedReports, low_literacy_count: usize) -> Self {
        Self {
            overall,
            urban: by_area.get(AreaType::Urban.label()).cloned(),
            rural: by_area.get(AreaType::Rural.label()).cloned(),
            low_literacy_count,
        }
    }

    /// Urban minus rural inclusion in percentage points, when both exist.
    pub fn urban_rural_gap_pp(&self) -> Option<f64> {
        match (&self.urban, &self.rural) {
            (Some(urban), Some(rural)) => Some((urban.inclusion_rate - rural.inclusion_rate) * 100.0),
            _ => None,
        }
    }
}

struct Rule {
    id: &'static str,
    fires: fn(&InsightInput, &InsightConfig) -> bool,
    build: fn(&InsightInput) -> Recommendation,
}

const RULES: [Rule; 4] = [
    Rule {
        id: "urban_rural_gap",
        fires: |input, config| {
            input
                .urban_rural_gap_pp()
                .is_some_and(|gap| gap > config.urban_rural_gap_pp)
        },
        build: |input| Recommendation {
            rule: "urban_rural_gap",
            title: "Rural Mobile Money Agent Expansion",
            priority: Priority::High,
            description: "Expand mobile money agent networks in rural areas to bridge the urban-rural inclusion gap.",
            target: format!(
                "{} rural residents",
                thousands(input.rural.as_ref().map_or(0, |r| r.excluded_count))
            ),
            impact: "Could increase national inclusion by 8-12%",
        },
    },
    Rule {
        id: "literacy_gap",
        fires: |input, config| {
            input.overall.record_count > 0 && input.overall.mean_literacy < config.literacy_target
        },
        build: |input| Recommendation {
            rule: "literacy_gap",
            title: "Financial Literacy Programs",
            priority: Priority::High,
            description: "Implement targeted financial education for low-education demographics.",
            target: format!(
                "{} individuals with low financial literacy",
                thousands(input.low_literacy_count)
            ),
            impact: "Could improve literacy scores by 2-3 points",
        },
    },
    Rule {
        id: "mobile_advantage",
        fires: |input, _| input.overall.adoption.mobile_money > input.overall.adoption.bank_account,
        build: |input| {
            let overall = &input.overall;
            let non_users =
                overall.record_count - (overall.adoption.mobile_money * overall.record_count as f64).round() as usize;
            Recommendation {
                rule: "mobile_advantage",
                title: "Digital-First Service Strategy",
                priority: Priority::Medium,
                description: "Prioritize mobile-based financial services over traditional banking infrastructure.",
                target: format!("{} non-mobile money users", thousands(non_users)),
                impact: "More cost-effective reach than traditional banking",
            }
        },
    },
    Rule {
        id: "inclusion_target",
        fires: |input, config| {
            input.overall.record_count > 0 && input.overall.inclusion_rate < config.inclusion_target
        },
        build: |input| Recommendation {
            rule: "inclusion_target",
            title: "Close the National Inclusion Gap",
            priority: Priority::Medium,
            description: "Bring financially excluded adults into at least one formal service through simplified account opening.",
            target: format!("{} financially excluded adults", thousands(input.overall.excluded_count)),
            impact: "Moves formal inclusion toward the national target",
        },
    },
];

/// Apply the rule table. Empty when no rule fires.
pub fn generate_insights(input: &InsightInput, config: &InsightConfig) -> Vec<Recommendation> {
    let recommendations: Vec<Recommendation> = RULES
        .iter()
        .filter(|rule| (rule.fires)(input, config))
        .map(|rule| {
            log::debug!("Insight rule '{}' fired", rule.id);
            (rule.build)(input)
        })
        .collect();
    log::info!("{} of {} insight rules fired", recommendations.len(), RULES.len());
    recommendations
}

/// Headline numbers shown alongside the recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFindings {
    /// Urban minus rural inclusion, percentage points.
    pub urban_rural_gap_pp: Option<f64>,
    pub excluded_rural_residents: usize,
    /// Mobile money minus bank adoption, percentage points.
    pub mobile_money_advantage_pp: f64,
}

pub fn key_findings(input: &InsightInput) -> KeyFindings {
    let adoption = &input.overall.adoption;
    KeyFindings {
        urban_rural_gap_pp: input.urban_rural_gap_pp(),
        excluded_rural_residents: input.rural.as_ref().map_or(0, |r| r.excluded_count),
        mobile_money_advantage_pp: (adoption.mobile_money - adoption.bank_account) * 100.0,
    }
}

/// 1234567 → "1,234,567".
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
