//! Financial inclusion survey analysis.
//!
//! Loads a demographics / financial-services survey pair, cleans it,
//! derives per-respondent features, assigns market segments and turns
//! the result into population statistics and policy recommendations.

pub mod aggregation;
pub mod config;
pub mod error;
pub mod features;
pub mod generator;
pub mod insights;
pub mod pipeline;
pub mod record;
pub mod rng;
pub mod segmentation;
pub mod store;
pub mod types;

pub use aggregation::{aggregate, aggregate_by_name, AggregateReport, GroupedReports, GroupingDimension};
pub use config::{AnalysisConfig, PopulationFilter};
pub use error::{AnalysisError, AnalysisResult, DataFormatError, InvalidGroupingError};
pub use features::{derive, DerivedFeatures};
pub use insights::{generate_insights, InsightInput, Recommendation};
pub use pipeline::{AnalysisContext, PipelineOutput};
pub use record::{Record, SurveyRow};
pub use segmentation::{classify, AnalyzedRecord, Segment};
pub use store::RecordStore;
