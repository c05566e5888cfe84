//! Feature deriver: per-record fields computed from a cleaned record.
//!
//! Every function here is pure and total. Derived features are never
//! stored independently of the record that produced them.

use crate::{
    record::Record,
    types::{AgeGroup, EducationBucket, EducationLevel},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub is_digitally_included: bool,
    pub is_formally_included: bool,
    /// How many of {bank account, mobile money} are used (0-2).
    pub inclusion_breadth: u8,
    /// How many of all five tracked services are used (0-5).
    pub service_count: u8,
    pub education_bucket: EducationBucket,
    pub age_group: AgeGroup,
}

pub fn derive(record: &Record) -> DerivedFeatures {
    let core_services = [record.has_bank_account, record.uses_mobile_money];
    let all_services = [
        record.has_bank_account,
        record.uses_mobile_money,
        record.has_savings,
        record.has_loan,
        record.uses_insurance,
    ];

    DerivedFeatures {
        is_digitally_included: record.uses_mobile_money,
        is_formally_included: record.has_bank_account || record.uses_mobile_money,
        inclusion_breadth: count_true(&core_services),
        service_count: count_true(&all_services),
        education_bucket: education_bucket(record.education),
        age_group: age_group(record.age),
    }
}

pub fn education_bucket(level: EducationLevel) -> EducationBucket {
    match level {
        EducationLevel::NoFormal | EducationLevel::Primary => EducationBucket::Basic,
        EducationLevel::Secondary | EducationLevel::Vocational => EducationBucket::Intermediate,
        EducationLevel::Tertiary => EducationBucket::Advanced,
    }
}

/// Bins (0,25], (25,35], (35,45], (45,55], (55,..).
pub fn age_group(age: u32) -> AgeGroup {
    match age {
        0..=25 => AgeGroup::UpTo25,
        26..=35 => AgeGroup::From26To35,
        36..=45 => AgeGroup::From36To45,
        46..=55 => AgeGroup::From46To55,
        _ => AgeGroup::Over55,
    }
}

fn count_true(flags: &[bool]) -> u8 {
    flags.iter().filter(|&&f| f).count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formal_inclusion_requires_bank_or_mobile() {
        let none = derive(&Record::sample("r1"));
        assert!(!none.is_formally_included);
        assert!(!none.is_digitally_included);
        assert_eq!(none.inclusion_breadth, 0);

        let mobile = derive(&Record::sample("r2").with_services(false, true));
        assert!(mobile.is_formally_included);
        assert!(mobile.is_digitally_included);
        assert_eq!(mobile.inclusion_breadth, 1);

        let bank = derive(&Record::sample("r3").with_services(true, false));
        assert!(bank.is_formally_included);
        assert!(!bank.is_digitally_included);

        let both = derive(&Record::sample("r4").with_services(true, true));
        assert_eq!(both.inclusion_breadth, 2);
    }

    #[test]
    fn savings_alone_is_not_formal_inclusion() {
        let mut record = Record::sample("r5");
        record.has_savings = true;
        record.uses_insurance = true;

        let features = derive(&record);
        assert!(!features.is_formally_included);
        assert_eq!(features.inclusion_breadth, 0);
        assert_eq!(features.service_count, 2);
    }

    #[test]
    fn age_bins_match_survey_bands() {
        assert_eq!(age_group(18), AgeGroup::UpTo25);
        assert_eq!(age_group(25), AgeGroup::UpTo25);
        assert_eq!(age_group(26), AgeGroup::From26To35);
        assert_eq!(age_group(55), AgeGroup::From46To55);
        assert_eq!(age_group(56), AgeGroup::Over55);
    }

    #[test]
    fn education_buckets_cover_every_level() {
        assert_eq!(education_bucket(EducationLevel::NoFormal), EducationBucket::Basic);
        assert_eq!(education_bucket(EducationLevel::Vocational), EducationBucket::Intermediate);
        assert_eq!(education_bucket(EducationLevel::Tertiary), EducationBucket::Advanced);
    }
}
