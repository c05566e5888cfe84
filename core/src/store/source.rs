//! CSV sources and row-level parsing.
//!
//! Both files are read with every column as text. Each cell is then
//! parsed by the field parsers below so a failure can name the exact
//! source, row, respondent and field.

use crate::{
    error::DataFormatError,
    record::SurveyRow,
    types::{AreaType, EducationLevel, Gender, Province, LITERACY_MAX, LITERACY_MIN},
};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const DEMOGRAPHICS: &str = "demographics";
pub const SERVICES: &str = "financial_services";

pub const ID_COLUMN: &str = "respondent_id";
pub const LITERACY_COLUMN: &str = "financial_literacy_score";

pub const DEMOGRAPHIC_COLUMNS: [&str; 7] = [
    ID_COLUMN,
    "province",
    "urban_rural",
    "gender",
    "age",
    "education",
    "monthly_income_rwf",
];

pub const SERVICE_COLUMNS: [&str; 3] = [ID_COLUMN, "has_bank_account", "uses_mobile_money"];

pub const OPTIONAL_SERVICE_COLUMNS: [&str; 3] = ["has_savings", "has_loan", "uses_insurance"];

/// Read a CSV file with every column typed as text.
pub fn read_text_csv(path: &Path) -> Result<DataFrame, DataFormatError> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .and_then(|frame| frame.collect())
        .map_err(|e| DataFormatError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// One source frame viewed as trimmed text cells. Empty cells are `None`.
struct TextTable<'a> {
    source_name: &'static str,
    frame: &'a DataFrame,
}

type TextColumn = Vec<Option<String>>;

impl<'a> TextTable<'a> {
    fn new(source_name: &'static str, frame: &'a DataFrame) -> Self {
        Self { source_name, frame }
    }

    fn height(&self) -> usize {
        self.frame.height()
    }

    fn required(&self, column: &str) -> Result<TextColumn, DataFormatError> {
        self.optional(column)?
            .ok_or_else(|| DataFormatError::MissingColumn {
                source_name: self.source_name.to_string(),
                column: column.to_string(),
            })
    }

    fn optional(&self, column: &str) -> Result<Option<TextColumn>, DataFormatError> {
        let Ok(series) = self.frame.column(column) else {
            return Ok(None);
        };
        let unreadable = |e: PolarsError| DataFormatError::Unreadable {
            path: format!("{}.{column}", self.source_name),
            message: e.to_string(),
        };
        let text = series.cast(&DataType::String).map_err(unreadable)?;
        let cells = text
            .str()
            .map_err(unreadable)?
            .into_iter()
            .map(|cell| {
                cell.map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_owned)
            })
            .collect();
        Ok(Some(cells))
    }
}

/// Parsing context for one cell.
struct Cell<'a> {
    source_name: &'static str,
    row: usize,
    respondent_id: &'a str,
    field: &'static str,
    value: Option<&'a str>,
}

impl<'a> Cell<'a> {
    fn invalid(&self, reason: &str) -> DataFormatError {
        DataFormatError::InvalidValue {
            source_name: self.source_name.to_string(),
            row: self.row,
            respondent_id: self.respondent_id.to_string(),
            field: self.field.to_string(),
            value: self.value.unwrap_or_default().to_string(),
            reason: reason.to_string(),
        }
    }

    fn present(&self) -> Result<&'a str, DataFormatError> {
        self.value.ok_or_else(|| self.invalid("value is missing"))
    }

    fn enumerated<T>(&self, parse: impl Fn(&str) -> Option<T>) -> Result<T, DataFormatError> {
        let raw = self.present()?;
        parse(raw).ok_or_else(|| self.invalid("not one of the enumerated values"))
    }

    fn non_negative(&self) -> Result<f64, DataFormatError> {
        let raw = self.present()?;
        let value: f64 = raw.parse().map_err(|_| self.invalid("not a number"))?;
        if !value.is_finite() {
            return Err(self.invalid("not a finite number"));
        }
        if value < 0.0 {
            return Err(self.invalid("must be non-negative"));
        }
        Ok(value)
    }

    fn whole_years(&self) -> Result<u32, DataFormatError> {
        let value = self.non_negative()?;
        if value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(self.invalid("must be a whole number of years"));
        }
        Ok(value as u32)
    }

    fn literacy(&self) -> Result<Option<f64>, DataFormatError> {
        if self.value.is_none() {
            return Ok(None);
        }
        let score = self.non_negative()?;
        if !(LITERACY_MIN..=LITERACY_MAX).contains(&score) {
            return Err(self.invalid("must lie between 0 and 100"));
        }
        Ok(Some(score))
    }

    fn flag(&self) -> Result<Option<bool>, DataFormatError> {
        let Some(raw) = self.value else {
            return Ok(None);
        };
        match raw.to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" | "yes" | "y" => Ok(Some(true)),
            "0" | "0.0" | "false" | "no" | "n" => Ok(Some(false)),
            _ => Err(self.invalid("not a boolean flag (expected 0/1, true/false or yes/no)")),
        }
    }
}

/// Position of the row being parsed, for error reporting.
struct RowCursor<'a> {
    source_name: &'static str,
    row: usize,
    respondent_id: &'a str,
}

impl<'a> RowCursor<'a> {
    fn cell(&self, field: &'static str, column: Option<&'a TextColumn>) -> Cell<'a> {
        Cell {
            source_name: self.source_name,
            row: self.row,
            respondent_id: self.respondent_id,
            field,
            value: column.and_then(|c| c[self.row].as_deref()),
        }
    }
}

/// Parsed service-usage cells for one respondent.
struct ServiceCells {
    literacy: Option<f64>,
    flags: [Option<bool>; 5],
}

/// Inner-join the demographics and services frames on respondent_id,
/// validating every cell. Output follows demographics row order.
pub fn join_frames(
    demographics: &DataFrame,
    services: &DataFrame,
) -> Result<Vec<SurveyRow>, DataFormatError> {
    let services = parse_services(&TextTable::new(SERVICES, services))?;

    let demo = TextTable::new(DEMOGRAPHICS, demographics);
    let [id_col, province_col, area_col, gender_col, age_col, education_col, income_col] =
        DEMOGRAPHIC_COLUMNS;
    let ids = demo.required(id_col)?;
    let provinces = demo.required(province_col)?;
    let areas = demo.required(area_col)?;
    let genders = demo.required(gender_col)?;
    let ages = demo.required(age_col)?;
    let educations = demo.required(education_col)?;
    let incomes = demo.required(income_col)?;
    let literacy = demo.optional(LITERACY_COLUMN)?;

    let mut seen = HashSet::with_capacity(demo.height());
    let mut rows = Vec::with_capacity(demo.height());

    for row in 0..demo.height() {
        let respondent_id = required_id(DEMOGRAPHICS, row, ids[row].as_deref())?;
        if !seen.insert(respondent_id) {
            return Err(DataFormatError::DuplicateRespondent {
                source_name: DEMOGRAPHICS.to_string(),
                row,
                respondent_id: respondent_id.to_string(),
            });
        }
        let at = RowCursor {
            source_name: DEMOGRAPHICS,
            row,
            respondent_id,
        };

        let province = at.cell(province_col, Some(&provinces)).enumerated(Province::parse)?;
        let area = at.cell(area_col, Some(&areas)).enumerated(AreaType::parse)?;
        let gender = at.cell(gender_col, Some(&genders)).enumerated(Gender::parse)?;
        let age = at.cell(age_col, Some(&ages)).whole_years()?;
        let education = at
            .cell(education_col, Some(&educations))
            .enumerated(EducationLevel::parse)?;
        let monthly_income_rwf = at.cell(income_col, Some(&incomes)).non_negative()?;
        let own_literacy = at.cell(LITERACY_COLUMN, literacy.as_ref()).literacy()?;

        let Some(usage) = services.get(respondent_id) else {
            continue;
        };
        let [bank, mobile, savings, loan, insurance] = usage.flags;

        rows.push(SurveyRow {
            respondent_id: respondent_id.to_string(),
            province,
            area,
            gender,
            age,
            education,
            monthly_income_rwf,
            financial_literacy_score: own_literacy.or(usage.literacy),
            has_bank_account: bank,
            uses_mobile_money: mobile,
            has_savings: savings,
            has_loan: loan,
            uses_insurance: insurance,
        });
    }

    let unmatched = demo.height() - rows.len();
    if unmatched > 0 {
        log::info!("{unmatched} demographic rows had no services row and were left out of the join");
    }
    log::debug!(
        "Joined {} respondents from {} demographic and {} services rows",
        rows.len(),
        demo.height(),
        services.len()
    );
    Ok(rows)
}

fn parse_services(table: &TextTable<'_>) -> Result<HashMap<String, ServiceCells>, DataFormatError> {
    let ids = table.required(ID_COLUMN)?;
    let bank = table.required(SERVICE_COLUMNS[1])?;
    let mobile = table.required(SERVICE_COLUMNS[2])?;
    let [savings, loan, insurance] = [
        table.optional(OPTIONAL_SERVICE_COLUMNS[0])?,
        table.optional(OPTIONAL_SERVICE_COLUMNS[1])?,
        table.optional(OPTIONAL_SERVICE_COLUMNS[2])?,
    ];
    let literacy = table.optional(LITERACY_COLUMN)?;

    let mut by_id = HashMap::with_capacity(table.height());
    for row in 0..table.height() {
        let respondent_id = required_id(table.source_name, row, ids[row].as_deref())?;
        let at = RowCursor {
            source_name: table.source_name,
            row,
            respondent_id,
        };

        let flags = [
            at.cell(SERVICE_COLUMNS[1], Some(&bank)).flag()?,
            at.cell(SERVICE_COLUMNS[2], Some(&mobile)).flag()?,
            at.cell(OPTIONAL_SERVICE_COLUMNS[0], savings.as_ref()).flag()?,
            at.cell(OPTIONAL_SERVICE_COLUMNS[1], loan.as_ref()).flag()?,
            at.cell(OPTIONAL_SERVICE_COLUMNS[2], insurance.as_ref()).flag()?,
        ];
        let literacy = at.cell(LITERACY_COLUMN, literacy.as_ref()).literacy()?;

        if by_id.contains_key(respondent_id) {
            return Err(DataFormatError::DuplicateRespondent {
                source_name: table.source_name.to_string(),
                row,
                respondent_id: respondent_id.to_string(),
            });
        }
        by_id.insert(respondent_id.to_string(), ServiceCells { literacy, flags });
    }
    Ok(by_id)
}

fn required_id<'a>(
    source_name: &'static str,
    row: usize,
    value: Option<&'a str>,
) -> Result<&'a str, DataFormatError> {
    value.ok_or_else(|| DataFormatError::InvalidValue {
        source_name: source_name.to_string(),
        row,
        respondent_id: String::new(),
        field: ID_COLUMN.to_string(),
        value: String::new(),
        reason: "value is missing".to_string(),
    })
}
