//! Analysis configuration.
//!
//! RULE: Every threshold the pipeline applies lives here.
//! Stages receive their section explicitly; nothing reads config
//! from ambient or global state.

use crate::{
    record::Record,
    types::{AreaType, Province},
};
use serde::{Deserialize, Serialize};

/// Segmentation boundary. A respondent with both a bank account and
/// mobile money is a Digital Champion only at or above this literacy score.
/// 0.0 admits every dual user, which reproduces the reference segment mix.
pub const DEFAULT_DIGITAL_THRESHOLD: f64 = 0.0;

/// Rule 1 fires when rural inclusion trails urban by more than this
/// many percentage points.
pub const DEFAULT_URBAN_RURAL_GAP_PP: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub digital_threshold: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            digital_threshold: DEFAULT_DIGITAL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Rows below this age are dropped before imputation.
    pub min_age: u32,
    /// Rows above this age are dropped before imputation.
    pub max_age: u32,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Percentage points. Rule 1: rural < urban - gap.
    pub urban_rural_gap_pp: f64,
    /// Rule 2: mean literacy below this target.
    pub literacy_target: f64,
    /// Scores strictly below this count as low literacy.
    pub low_literacy_threshold: f64,
    /// Fraction in [0, 1]. Rule 4: overall inclusion below target.
    pub inclusion_target: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            urban_rural_gap_pp: DEFAULT_URBAN_RURAL_GAP_PP,
            literacy_target: 80.0,
            low_literacy_threshold: 50.0,
            inclusion_target: 0.75,
        }
    }
}

/// Narrows the cleaned population before classification.
/// Applied after cleaning, so imputation and income brackets always
/// describe the full survey.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationFilter {
    /// `None` keeps every province. An empty list keeps nobody.
    pub provinces: Option<Vec<Province>>,
    /// `None` keeps both areas.
    pub area: Option<AreaType>,
}

impl PopulationFilter {
    pub fn provinces(mut self, provinces: impl IntoIterator<Item = Province>) -> Self {
        self.provinces = Some(provinces.into_iter().collect());
        self
    }

    pub fn area(mut self, area: AreaType) -> Self {
        self.area = Some(area);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.provinces.is_none() && self.area.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        let province_ok = self
            .provinces
            .as_ref()
            .map_or(true, |p| p.contains(&record.province));
        let area_ok = self.area.map_or(true, |a| a == record.area);
        province_ok && area_ok
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub segmentation: SegmentationConfig,
    pub cleaning: CleaningConfig,
    pub insights: InsightConfig,
    pub filter: PopulationFilter,
}

impl AnalysisConfig {
    /// Load from a JSON file. Missing sections and fields fall back to
    /// their defaults. In tests, use AnalysisConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Test configuration: the defaults, spelled out so tests do not
    /// silently shift when a default changes.
    pub fn default_test() -> Self {
        Self {
            segmentation: SegmentationConfig {
                digital_threshold: 0.0,
            },
            cleaning: CleaningConfig {
                min_age: 18,
                max_age: 100,
            },
            insights: InsightConfig {
                urban_rural_gap_pp: 15.0,
                literacy_target: 80.0,
                low_literacy_threshold: 50.0,
                inclusion_target: 0.75,
            },
            filter: PopulationFilter::default(),
        }
    }

    pub fn with_digital_threshold(mut self, threshold: f64) -> Self {
        self.segmentation.digital_threshold = threshold;
        self
    }

    pub fn with_filter(mut self, filter: PopulationFilter) -> Self {
        self.filter = filter;
        self
    }

    fn validate(&self) -> anyhow::Result<()> {
        let threshold = self.segmentation.digital_threshold;
        if !threshold.is_finite() {
            anyhow::bail!("segmentation.digital_threshold must be finite, got {threshold}");
        }
        if self.cleaning.min_age > self.cleaning.max_age {
            anyhow::bail!(
                "cleaning.min_age ({}) exceeds cleaning.max_age ({})",
                self.cleaning.min_age,
                self.cleaning.max_age
            );
        }
        if !(0.0..=1.0).contains(&self.insights.inclusion_target) {
            anyhow::bail!(
                "insights.inclusion_target must be a fraction in [0, 1], got {}",
                self.insights.inclusion_target
            );
        }
        Ok(())
    }
}
