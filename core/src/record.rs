//! Survey records before and after cleaning.

use crate::types::{
    AreaType, EducationLevel, Gender, IncomeBracket, Province, RespondentId,
};
use serde::{Deserialize, Serialize};

/// One joined input row, validated but not yet cleaned.
/// Missing literacy scores and service flags are still `None` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRow {
    pub respondent_id: RespondentId,
    pub province: Province,
    pub area: AreaType,
    pub gender: Gender,
    pub age: u32,
    pub education: EducationLevel,
    pub monthly_income_rwf: f64,
    pub financial_literacy_score: Option<f64>,
    pub has_bank_account: Option<bool>,
    pub uses_mobile_money: Option<bool>,
    pub has_savings: Option<bool>,
    pub has_loan: Option<bool>,
    pub uses_insurance: Option<bool>,
}

/// One cleaned survey respondent. Every field is populated and in domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub respondent_id: RespondentId,
    pub province: Province,
    pub area: AreaType,
    pub gender: Gender,
    pub age: u32,
    pub education: EducationLevel,
    pub monthly_income_rwf: f64,
    pub income_bracket: IncomeBracket,
    pub has_bank_account: bool,
    pub uses_mobile_money: bool,
    pub has_savings: bool,
    pub has_loan: bool,
    pub uses_insurance: bool,
    /// 0-100.
    pub financial_literacy_score: f64,
}

impl Record {
    /// Builder used by tests and fixtures: a rural, primary-educated
    /// Kigali respondent with no services and a literacy score of 50.
    pub fn sample(respondent_id: impl Into<RespondentId>) -> Self {
        Self {
            respondent_id: respondent_id.into(),
            province: Province::KigaliCity,
            area: AreaType::Rural,
            gender: Gender::Female,
            age: 30,
            education: EducationLevel::Primary,
            monthly_income_rwf: 50_000.0,
            income_bracket: IncomeBracket::Q3,
            has_bank_account: false,
            uses_mobile_money: false,
            has_savings: false,
            has_loan: false,
            uses_insurance: false,
            financial_literacy_score: 50.0,
        }
    }

    pub fn with_services(mut self, bank: bool, mobile: bool) -> Self {
        self.has_bank_account = bank;
        self.uses_mobile_money = mobile;
        self
    }

    pub fn with_literacy(mut self, score: f64) -> Self {
        self.financial_literacy_score = score;
        self
    }

    pub fn with_area(mut self, area: AreaType) -> Self {
        self.area = area;
        self
    }

    pub fn with_province(mut self, province: Province) -> Self {
        self.province = province;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_education(mut self, education: EducationLevel) -> Self {
        self.education = education;
        self
    }
}
