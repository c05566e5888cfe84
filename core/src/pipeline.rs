//! Analysis pipeline: the explicitly constructed data context.
//!
//! RULE: There is no global dataset. Callers build an AnalysisContext
//! from a RecordStore and an AnalysisConfig and pass it around.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Record store   (load + clean, done when the context is built)
//!   2. Population filter
//!   3. Feature deriver
//!   4. Segmentation engine
//!   5. Aggregator     (overall, by area, then each requested dimension)
//!   6. Insight generator

use crate::{
    aggregation::{aggregate, AggregateReport, GroupedReports, GroupingDimension},
    config::{AnalysisConfig, PopulationFilter},
    error::AnalysisResult,
    insights::{generate_insights, key_findings, InsightInput, KeyFindings, Recommendation},
    record::Record,
    segmentation::{classify_all, segment_profiles, AnalyzedRecord, SegmentProfile},
    store::RecordStore,
};
use serde::Serialize;
use std::path::Path;

/// Everything one run produces. Consumers render this; they never
/// recompute it from records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub digital_threshold: f64,
    pub filter: PopulationFilter,
    /// Records left after the population filter.
    pub record_count: usize,
    pub overall: AggregateReport,
    pub breakdowns: Vec<GroupedReports>,
    pub segment_profiles: Vec<SegmentProfile>,
    pub key_findings: KeyFindings,
    pub recommendations: Vec<Recommendation>,
}

impl PipelineOutput {
    pub fn breakdown(&self, dimension: GroupingDimension) -> Option<&GroupedReports> {
        self.breakdowns.iter().find(|g| g.dimension == Some(dimension))
    }
}

pub struct AnalysisContext {
    store: RecordStore,
    config: AnalysisConfig,
}

impl AnalysisContext {
    pub fn new(store: RecordStore, config: AnalysisConfig) -> Self {
        Self { store, config }
    }

    /// Load and clean both survey files into a fresh context.
    pub fn open(
        demographics: &Path,
        services: &Path,
        config: AnalysisConfig,
    ) -> AnalysisResult<Self> {
        let store = RecordStore::open(demographics, services, &config.cleaning)?;
        Ok(Self::new(store, config))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Stages 2 to 4: filter, derive features and classify.
    pub fn analyze(&self) -> Vec<AnalyzedRecord> {
        let filter = &self.config.filter;
        if filter.is_unrestricted() {
            return classify_all(self.store.records(), &self.config.segmentation);
        }
        let population: Vec<Record> = self
            .store
            .records()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        log::info!(
            "Population filter kept {} of {} records",
            population.len(),
            self.store.len()
        );
        classify_all(&population, &self.config.segmentation)
    }

    /// Run every stage. `group_by` selects the extra breakdowns to
    /// include; duplicates are reported once.
    pub fn run(&self, group_by: &[GroupingDimension]) -> PipelineOutput {
        let analyzed = self.analyze();

        let overall = aggregate(&analyzed, None)
            .overall()
            .cloned()
            .unwrap_or_default();
        let by_area = aggregate(&analyzed, Some(GroupingDimension::Area));

        let mut breakdowns: Vec<GroupedReports> = Vec::with_capacity(group_by.len());
        for &dimension in group_by {
            if breakdowns.iter().any(|g| g.dimension == Some(dimension)) {
                continue;
            }
            breakdowns.push(aggregate(&analyzed, Some(dimension)));
        }

        let threshold = self.config.insights.low_literacy_threshold;
        let low_literacy_count = analyzed
            .iter()
            .filter(|a| a.record.financial_literacy_score < threshold)
            .count();
        let input = InsightInput::new(overall.clone(), &by_area, low_literacy_count);
        let recommendations = generate_insights(&input, &self.config.insights);

        log::info!(
            "Pipeline complete: {} records, inclusion {:.1}%, {} breakdowns, {} recommendations",
            overall.record_count,
            overall.inclusion_rate * 100.0,
            breakdowns.len(),
            recommendations.len()
        );

        PipelineOutput {
            digital_threshold: self.config.segmentation.digital_threshold,
            filter: self.config.filter.clone(),
            record_count: analyzed.len(),
            overall,
            breakdowns,
            segment_profiles: segment_profiles(&analyzed),
            key_findings: key_findings(&input),
            recommendations,
        }
    }

    /// Like `run`, with dimensions given by name. Fails on the first
    /// unknown name before any stage runs.
    pub fn run_by_name(&self, group_by: &[&str]) -> AnalysisResult<PipelineOutput> {
        let dimensions = group_by
            .iter()
            .map(|name| name.parse::<GroupingDimension>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.run(&dimensions))
    }
}
