//! Record store: flat-file loading, validation and cleaning.
//!
//! RULE: Only the store validates input.
//! Everything downstream of `clean` works on `Record` and may assume
//! every field is present and in domain.

pub mod cleaning;
pub mod source;

use crate::{
    config::CleaningConfig,
    error::{AnalysisResult, DataFormatError},
    record::{Record, SurveyRow},
};
use polars::prelude::DataFrame;
use std::path::Path;

/// Owns the cleaned record set for the lifetime of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Load, join and validate both survey files.
    pub fn load(
        demographics: &Path,
        services: &Path,
    ) -> Result<Vec<SurveyRow>, DataFormatError> {
        let demographics_frame = source::read_text_csv(demographics)?;
        let services_frame = source::read_text_csv(services)?;
        let rows = Self::load_frames(&demographics_frame, &services_frame)?;
        log::info!(
            "Loaded {} respondents from {} + {}",
            rows.len(),
            demographics.display(),
            services.display()
        );
        Ok(rows)
    }

    /// Same as `load`, over frames already in memory.
    pub fn load_frames(
        demographics: &DataFrame,
        services: &DataFrame,
    ) -> Result<Vec<SurveyRow>, DataFormatError> {
        source::join_frames(demographics, services)
    }

    /// Apply the documented cleaning policy. Produces a new set.
    pub fn clean(rows: &[SurveyRow], config: &CleaningConfig) -> Vec<Record> {
        cleaning::clean_rows(rows, config)
    }

    /// Load and clean in one step.
    pub fn open(
        demographics: &Path,
        services: &Path,
        config: &CleaningConfig,
    ) -> AnalysisResult<Self> {
        let rows = Self::load(demographics, services)?;
        let records = Self::clean(&rows, config);
        log::info!("Cleaning kept {} of {} respondents", records.len(), rows.len());
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
