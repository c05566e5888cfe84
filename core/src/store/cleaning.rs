//! Cleaning policy: drop invalid rows, impute, bracket incomes.
//!
//! Order matters and is fixed:
//!   1. drop rows outside the configured age range
//!   2. compute the literacy median over the surviving rows only
//!   3. compute income quintile edges over the surviving rows only
//!   4. build records, imputing missing values

use crate::{
    config::CleaningConfig,
    record::{Record, SurveyRow},
    types::IncomeBracket,
};

/// Apply the cleaning policy. The input rows are never mutated.
pub fn clean_rows(rows: &[SurveyRow], config: &CleaningConfig) -> Vec<Record> {
    let survivors: Vec<&SurveyRow> = rows
        .iter()
        .filter(|r| (config.min_age..=config.max_age).contains(&r.age))
        .collect();

    let dropped = rows.len() - survivors.len();
    if dropped > 0 {
        log::warn!(
            "Dropped {dropped} rows with age outside {}..={}",
            config.min_age,
            config.max_age
        );
    }

    let observed: Vec<f64> = survivors
        .iter()
        .filter_map(|r| r.financial_literacy_score)
        .collect();
    let literacy_fill = median(&observed).unwrap_or(0.0);
    let imputed = survivors.len() - observed.len();
    if imputed > 0 {
        log::warn!("Imputed {imputed} missing literacy scores with median {literacy_fill:.2}");
    }

    let incomes: Vec<f64> = survivors.iter().map(|r| r.monthly_income_rwf).collect();
    let quintiles = IncomeQuintiles::from_incomes(&incomes);

    survivors
        .into_iter()
        .map(|r| Record {
            respondent_id: r.respondent_id.clone(),
            province: r.province,
            area: r.area,
            gender: r.gender,
            age: r.age,
            education: r.education,
            monthly_income_rwf: r.monthly_income_rwf,
            income_bracket: quintiles.bracket(r.monthly_income_rwf),
            has_bank_account: r.has_bank_account.unwrap_or(false),
            uses_mobile_money: r.uses_mobile_money.unwrap_or(false),
            has_savings: r.has_savings.unwrap_or(false),
            has_loan: r.has_loan.unwrap_or(false),
            uses_insurance: r.uses_insurance.unwrap_or(false),
            financial_literacy_score: r.financial_literacy_score.unwrap_or(literacy_fill),
        })
        .collect()
}

/// Median of the values, or None when empty.
/// Even-length input averages the middle pair.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Quantile with linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Upper edges of Q1..Q4. Anything above the Q4 edge is Q5.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeQuintiles {
    upper_edges: [f64; 4],
}

impl IncomeQuintiles {
    pub fn from_incomes(incomes: &[f64]) -> Self {
        if incomes.is_empty() {
            return Self {
                upper_edges: [0.0; 4],
            };
        }
        let mut sorted = incomes.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            upper_edges: [0.2, 0.4, 0.6, 0.8].map(|q| quantile(&sorted, q)),
        }
    }

    pub fn upper_edges(&self) -> &[f64; 4] {
        &self.upper_edges
    }

    pub fn bracket(&self, income: f64) -> IncomeBracket {
        self.upper_edges
            .iter()
            .position(|&edge| income <= edge)
            .map(|i| IncomeBracket::ALL[i])
            .unwrap_or(IncomeBracket::Q5)
    }
}
