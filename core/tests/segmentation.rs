//! Segmentation engine tests: rule precedence, threshold behaviour and
//! the reference segment mix.

use finclusion_core::{
    aggregation::{aggregate, round1},
    config::SegmentationConfig,
    segmentation::{classify_all, segment_profiles},
    types::AreaType,
    classify, Record, Segment,
};

// ── Helpers ───────────────────────────────────────────────────────

fn at_threshold(threshold: f64) -> SegmentationConfig {
    SegmentationConfig {
        digital_threshold: threshold,
    }
}

/// 1000 respondents: 201 dual users, 357 mobile-only, 115 bank-only,
/// 327 with neither service.
fn reference_population() -> Vec<Record> {
    let mut records = Vec::with_capacity(1000);
    let mut push = |count: usize, bank: bool, mobile: bool| {
        for _ in 0..count {
            let id = format!("R{:04}", records.len());
            records.push(Record::sample(id).with_services(bank, mobile).with_literacy(60.0));
        }
    };
    push(201, true, true);
    push(357, false, true);
    push(115, true, false);
    push(327, false, false);
    records
}

// ── Classification ────────────────────────────────────────────────

#[test]
fn dual_user_above_threshold_is_a_digital_champion() {
    let record = Record::sample("R1").with_services(true, true).with_literacy(90.0);
    assert_eq!(classify(&record, &at_threshold(80.0)), Segment::DigitalChampion);
}

#[test]
fn threshold_is_inclusive() {
    let record = Record::sample("R1").with_services(true, true).with_literacy(80.0);
    assert_eq!(classify(&record, &at_threshold(80.0)), Segment::DigitalChampion);
}

#[test]
fn dual_user_below_threshold_falls_through_to_excluded() {
    let record = Record::sample("R1").with_services(true, true).with_literacy(79.9);
    assert_eq!(
        classify(&record, &at_threshold(80.0)),
        Segment::FinanciallyExcluded
    );
}

#[test]
fn single_service_users_ignore_the_threshold() {
    let mobile = Record::sample("R1").with_services(false, true).with_literacy(5.0);
    let bank = Record::sample("R2").with_services(true, false).with_literacy(5.0);
    let config = at_threshold(95.0);

    assert_eq!(classify(&mobile, &config), Segment::MobileOnly);
    assert_eq!(classify(&bank, &config), Segment::TraditionalBanking);
}

#[test]
fn no_services_is_excluded() {
    let record = Record::sample("R1").with_literacy(100.0);
    assert_eq!(
        classify(&record, &SegmentationConfig::default()),
        Segment::FinanciallyExcluded
    );
}

#[test]
fn every_record_gets_exactly_one_segment() {
    let records = reference_population();
    let analyzed = classify_all(&records, &SegmentationConfig::default());

    assert_eq!(analyzed.len(), records.len());
    for (a, r) in analyzed.iter().zip(&records) {
        assert_eq!(a.record.respondent_id, r.respondent_id, "order must be preserved");
    }
}

// ── Reference mix ─────────────────────────────────────────────────

#[test]
fn reference_population_reproduces_the_published_mix() {
    let analyzed = classify_all(&reference_population(), &SegmentationConfig::default());
    let report = aggregate(&analyzed, None).overall().cloned().unwrap();

    assert_eq!(round1(report.segment_pct(Segment::DigitalChampion)), 20.1);
    assert_eq!(round1(report.segment_pct(Segment::MobileOnly)), 35.7);
    assert_eq!(round1(report.segment_pct(Segment::TraditionalBanking)), 11.5);
    assert_eq!(round1(report.segment_pct(Segment::FinanciallyExcluded)), 32.7);
    assert!((report.distribution_total() - 100.0).abs() < 1e-9);
}

#[test]
fn raising_the_threshold_moves_champions_to_excluded() {
    let analyzed = classify_all(&reference_population(), &at_threshold(70.0));
    let report = aggregate(&analyzed, None).overall().cloned().unwrap();

    assert_eq!(report.segment_pct(Segment::DigitalChampion), 0.0);
    assert_eq!(round1(report.segment_pct(Segment::FinanciallyExcluded)), 52.8);
    assert_eq!(
        round1(report.segment_pct(Segment::MobileOnly)),
        35.7,
        "single-service segments must not move"
    );
}

// ── Profiles ──────────────────────────────────────────────────────

#[test]
fn profiles_cover_only_non_empty_segments() {
    let records = vec![
        Record::sample("R1").with_services(false, true).with_area(AreaType::Urban),
        Record::sample("R2").with_services(false, true),
        Record::sample("R3"),
    ];
    let analyzed = classify_all(&records, &SegmentationConfig::default());
    let profiles = segment_profiles(&analyzed);

    let segments: Vec<Segment> = profiles.iter().map(|p| p.segment).collect();
    assert_eq!(segments, vec![Segment::MobileOnly, Segment::FinanciallyExcluded]);

    let mobile = &profiles[0];
    assert_eq!(mobile.size, 2);
    assert_eq!(mobile.urban_pct, 50.0);
    assert!((mobile.share_pct - 200.0 / 3.0).abs() < 1e-9);

    let total: usize = profiles.iter().map(|p| p.size).sum();
    assert_eq!(total, records.len());
}
