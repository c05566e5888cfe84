//! Synthetic survey generator.
//!
//! Produces a reproducible demographics / financial-services file pair
//! from a seed. Same seed + same respondent count = byte-identical files.
//!
//! The joint (bank, mobile) mix is calibrated per area so the national
//! mix lands near 20.1 / 35.7 / 11.5 / 32.7 (dual / mobile-only /
//! bank-only / neither) with a 30% urban share.

use crate::{
    error::AnalysisResult,
    record::SurveyRow,
    rng::{StreamRng, StreamSlot},
    store::source::{
        DEMOGRAPHIC_COLUMNS, ID_COLUMN, LITERACY_COLUMN, OPTIONAL_SERVICE_COLUMNS,
        SERVICE_COLUMNS,
    },
    types::{AreaType, EducationLevel, Gender, Province},
};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const DEMOGRAPHICS_FILE: &str = "demographics.csv";
pub const SERVICES_FILE: &str = "financial_services.csv";

const URBAN_SHARE: f64 = 0.30;

/// P(dual, mobile-only, bank-only, neither) by area.
const URBAN_SERVICE_MIX: [f64; 4] = [0.35, 0.38, 0.15, 0.12];
const RURAL_SERVICE_MIX: [f64; 4] = [0.1371, 0.3471, 0.10, 0.4158];

const EDUCATION_LEVELS: [EducationLevel; 5] = [
    EducationLevel::NoFormal,
    EducationLevel::Primary,
    EducationLevel::Secondary,
    EducationLevel::Vocational,
    EducationLevel::Tertiary,
];
const EDUCATION_WEIGHTS: [f64; 5] = [0.12, 0.45, 0.28, 0.08, 0.07];

/// Kigali City first, then Northern, Southern, Eastern, Western.
const URBAN_PROVINCE_WEIGHTS: [f64; 5] = [0.60, 0.08, 0.10, 0.12, 0.10];
const RURAL_PROVINCE_WEIGHTS: [f64; 5] = [0.04, 0.22, 0.26, 0.26, 0.22];

/// Share of respondents whose literacy score is left blank.
const MISSING_LITERACY_RATE: f64 = 0.03;

pub struct SurveyGenerator {
    seed: u64,
}

impl SurveyGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generate `n` respondents. Streams are re-derived on every call,
    /// so repeated calls return identical rows.
    pub fn generate(&self, n: usize) -> Vec<SurveyRow> {
        let mut demo_rng = StreamSlot::Demographics.rng(self.seed);
        let mut income_rng = StreamSlot::Income.rng(self.seed);
        let mut service_rng = StreamSlot::Services.rng(self.seed);
        let mut literacy_rng = StreamSlot::Literacy.rng(self.seed);

        let rows: Vec<SurveyRow> = (0..n)
            .map(|i| {
                let area = if demo_rng.chance(URBAN_SHARE) {
                    AreaType::Urban
                } else {
                    AreaType::Rural
                };
                let province_weights = match area {
                    AreaType::Urban => &URBAN_PROVINCE_WEIGHTS,
                    AreaType::Rural => &RURAL_PROVINCE_WEIGHTS,
                };
                let province = Province::ALL[demo_rng.pick_weighted(province_weights)];
                let gender = if demo_rng.chance(0.5) {
                    Gender::Male
                } else {
                    Gender::Female
                };
                let age = 18 + demo_rng.below(53);
                let education = EDUCATION_LEVELS[demo_rng.pick_weighted(&EDUCATION_WEIGHTS)];

                let monthly_income_rwf = sample_income(&mut income_rng, area, education);
                let (bank_account, mobile_money) = sample_core_services(&mut service_rng, area);
                let banked = if bank_account { 1.0 } else { 0.0 };
                let has_savings = service_rng.chance(0.15 + 0.35 * banked);
                let has_loan = service_rng.chance(0.05 + 0.15 * banked);
                let uses_insurance = service_rng.chance(0.08 + 0.20 * banked);

                let literacy = sample_literacy(&mut literacy_rng, education, bank_account, mobile_money);

                SurveyRow {
                    respondent_id: format!("R{i:06}"),
                    province,
                    area,
                    gender,
                    age,
                    education,
                    monthly_income_rwf,
                    financial_literacy_score: literacy,
                    has_bank_account: Some(bank_account),
                    uses_mobile_money: Some(mobile_money),
                    has_savings: Some(has_savings),
                    has_loan: Some(has_loan),
                    uses_insurance: Some(uses_insurance),
                }
            })
            .collect();

        log::info!("Generated {} synthetic respondents (seed {})", rows.len(), self.seed);
        rows
    }

    /// Write `n` generated respondents to `dir` as the two survey files.
    /// Returns (demographics path, services path).
    pub fn write_csv(&self, n: usize, dir: &Path) -> AnalysisResult<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir)?;
        let rows = self.generate(n);
        let (mut demographics, mut services) = to_frames(&rows)?;

        let demographics_path = dir.join(DEMOGRAPHICS_FILE);
        let services_path = dir.join(SERVICES_FILE);
        write_frame(&mut demographics, &demographics_path)?;
        write_frame(&mut services, &services_path)?;
        log::info!(
            "Wrote {} and {}",
            demographics_path.display(),
            services_path.display()
        );
        Ok((demographics_path, services_path))
    }
}

/// Split rows into the two source frames, in the on-disk column layout.
pub fn to_frames(rows: &[SurveyRow]) -> PolarsResult<(DataFrame, DataFrame)> {
    let ids: Vec<&str> = rows.iter().map(|r| r.respondent_id.as_str()).collect();
    let text = |f: fn(&SurveyRow) -> &'static str| rows.iter().map(f).collect::<Vec<&str>>();
    let flag = |f: fn(&SurveyRow) -> Option<bool>| {
        rows.iter()
            .map(|r| f(r).map(i64::from))
            .collect::<Vec<Option<i64>>>()
    };

    let demographics = DataFrame::new(vec![
        Series::new(DEMOGRAPHIC_COLUMNS[0], ids.clone()),
        Series::new(DEMOGRAPHIC_COLUMNS[1], text(|r| r.province.label())),
        Series::new(DEMOGRAPHIC_COLUMNS[2], text(|r| r.area.label())),
        Series::new(DEMOGRAPHIC_COLUMNS[3], text(|r| r.gender.label())),
        Series::new(
            DEMOGRAPHIC_COLUMNS[4],
            rows.iter().map(|r| r.age as i64).collect::<Vec<i64>>(),
        ),
        Series::new(DEMOGRAPHIC_COLUMNS[5], text(|r| r.education.label())),
        Series::new(
            DEMOGRAPHIC_COLUMNS[6],
            rows.iter().map(|r| r.monthly_income_rwf).collect::<Vec<f64>>(),
        ),
        Series::new(
            LITERACY_COLUMN,
            rows.iter()
                .map(|r| r.financial_literacy_score)
                .collect::<Vec<Option<f64>>>(),
        ),
    ])?;

    let services = DataFrame::new(vec![
        Series::new(ID_COLUMN, ids),
        Series::new(SERVICE_COLUMNS[1], flag(|r| r.has_bank_account)),
        Series::new(SERVICE_COLUMNS[2], flag(|r| r.uses_mobile_money)),
        Series::new(OPTIONAL_SERVICE_COLUMNS[0], flag(|r| r.has_savings)),
        Series::new(OPTIONAL_SERVICE_COLUMNS[1], flag(|r| r.has_loan)),
        Series::new(OPTIONAL_SERVICE_COLUMNS[2], flag(|r| r.uses_insurance)),
    ])?;

    Ok((demographics, services))
}

fn write_frame(frame: &mut DataFrame, path: &Path) -> AnalysisResult<()> {
    CsvWriter::new(File::create(path)?)
        .include_header(true)
        .finish(frame)?;
    Ok(())
}

fn sample_income(rng: &mut StreamRng, area: AreaType, education: EducationLevel) -> f64 {
    let rank = EDUCATION_LEVELS
        .iter()
        .position(|&e| e == education)
        .unwrap_or(0) as f64;
    let area_factor = match area {
        AreaType::Urban => 1.6,
        AreaType::Rural => 1.0,
    };
    let x_min = 20_000.0 * (1.0 + 0.5 * rank) * area_factor;
    rng.pareto(x_min, 2.5).min(x_min * 20.0).round()
}

fn sample_core_services(rng: &mut StreamRng, area: AreaType) -> (bool, bool) {
    let mix = match area {
        AreaType::Urban => &URBAN_SERVICE_MIX,
        AreaType::Rural => &RURAL_SERVICE_MIX,
    };
    match rng.pick_weighted(mix) {
        0 => (true, true),
        1 => (false, true),
        2 => (true, false),
        _ => (false, false),
    }
}

fn sample_literacy(
    rng: &mut StreamRng,
    education: EducationLevel,
    bank_account: bool,
    mobile_money: bool,
) -> Option<f64> {
    if rng.chance(MISSING_LITERACY_RATE) {
        return None;
    }
    let rank = EDUCATION_LEVELS
        .iter()
        .position(|&e| e == education)
        .unwrap_or(0) as f64;
    let mut score = 30.0 + 8.0 * rank + rng.uniform(-15.0, 15.0);
    if bank_account {
        score += 10.0;
    }
    if mobile_money {
        score += 5.0;
    }
    Some((score.clamp(0.0, 100.0) * 10.0).round() / 10.0)
}
