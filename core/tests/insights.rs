//! Insight generator tests: each rule fires on its own condition and
//! nothing else.

use finclusion_core::{
    aggregation::{aggregate, GroupingDimension},
    config::{InsightConfig, SegmentationConfig},
    generate_insights,
    insights::{key_findings, Priority},
    segmentation::classify_all,
    types::AreaType,
    AggregateReport, InsightInput, Record,
};

// ── Helpers ───────────────────────────────────────────────────────

/// `urban` and `rural` are (bank, mobile, literacy) per respondent.
fn input_from(urban: &[(bool, bool, f64)], rural: &[(bool, bool, f64)], low_literacy: usize) -> InsightInput {
    let mut records = Vec::new();
    for (area, rows) in [(AreaType::Urban, urban), (AreaType::Rural, rural)] {
        for &(bank, mobile, literacy) in rows {
            let id = format!("R{}", records.len());
            records.push(
                Record::sample(id)
                    .with_area(area)
                    .with_services(bank, mobile)
                    .with_literacy(literacy),
            );
        }
    }
    let analyzed = classify_all(&records, &SegmentationConfig::default());
    let overall = aggregate(&analyzed, None).overall().cloned().unwrap_or_default();
    let by_area = aggregate(&analyzed, Some(GroupingDimension::Area));
    InsightInput::new(overall, &by_area, low_literacy)
}

fn fired(input: &InsightInput) -> Vec<&'static str> {
    generate_insights(input, &InsightConfig::default())
        .iter()
        .map(|r| r.rule)
        .collect()
}

// ── Rules ─────────────────────────────────────────────────────────

#[test]
fn quiet_population_fires_nothing() {
    // Everyone banked and on mobile money with high literacy, no area gap.
    let everyone = [(true, true, 90.0); 4];
    let input = input_from(&everyone, &everyone, 0);
    assert!(fired(&input).is_empty(), "fired: {:?}", fired(&input));
}

#[test]
fn urban_rural_gap_fires_only_beyond_threshold() {
    // Urban 100% included, rural 80%: a 20 pp gap.
    let urban = [(true, true, 90.0); 5];
    let rural = [
        (true, true, 90.0),
        (true, true, 90.0),
        (true, true, 90.0),
        (true, true, 90.0),
        (false, false, 90.0),
    ];
    let input = input_from(&urban, &rural, 0);
    assert_eq!(fired(&input), vec!["urban_rural_gap"]);

    let recs = generate_insights(&input, &InsightConfig::default());
    assert_eq!(recs[0].priority, Priority::High);
    assert_eq!(recs[0].target, "1 rural residents");

    let wide = InsightConfig {
        urban_rural_gap_pp: 20.0,
        ..InsightConfig::default()
    };
    assert!(
        generate_insights(&input, &wide).is_empty(),
        "a gap equal to the threshold must not fire"
    );
}

#[test]
fn gap_rule_needs_both_areas() {
    let urban = [(true, true, 90.0), (false, false, 90.0)];
    let input = input_from(&urban, &[], 0);
    assert_eq!(input.urban_rural_gap_pp(), None);
    assert!(!fired(&input).contains(&"urban_rural_gap"));
}

#[test]
fn literacy_gap_fires_below_target() {
    let everyone = [(true, true, 60.0); 3];
    let input = input_from(&everyone, &everyone, 4);

    assert_eq!(fired(&input), vec!["literacy_gap"]);
    let rec = &generate_insights(&input, &InsightConfig::default())[0];
    assert_eq!(rec.target, "4 individuals with low financial literacy");
}

#[test]
fn mobile_advantage_fires_when_mobile_leads() {
    let urban = [(false, true, 90.0), (true, true, 90.0)];
    let rural = [(false, true, 90.0), (true, true, 90.0)];
    let input = input_from(&urban, &rural, 0);

    assert_eq!(fired(&input), vec!["mobile_advantage"]);
}

#[test]
fn inclusion_target_fires_below_target() {
    // Half included in both areas: no gap, but under the 75% target.
    let half = [(true, true, 90.0), (false, false, 90.0)];
    let input = input_from(&half, &half, 0);

    assert_eq!(fired(&input), vec!["inclusion_target"]);
    let rec = &generate_insights(&input, &InsightConfig::default())[0];
    assert_eq!(rec.target, "2 financially excluded adults");
}

#[test]
fn rules_fire_in_table_order() {
    let urban = [(false, true, 40.0); 4];
    let rural = [(false, true, 40.0), (false, false, 40.0), (false, false, 40.0), (false, false, 40.0)];
    let input = input_from(&urban, &rural, 8);

    assert_eq!(
        fired(&input),
        vec!["urban_rural_gap", "literacy_gap", "mobile_advantage", "inclusion_target"]
    );
}

#[test]
fn empty_population_fires_nothing() {
    let input = InsightInput {
        overall: AggregateReport::default(),
        urban: None,
        rural: None,
        low_literacy_count: 0,
    };
    assert!(fired(&input).is_empty());
}

#[test]
fn recommendation_renders_as_one_line() {
    let half = [(true, true, 90.0), (false, false, 90.0)];
    let input = input_from(&half, &half, 0);
    let text = generate_insights(&input, &InsightConfig::default())[0].to_string();

    assert!(text.starts_with("[MEDIUM] "));
    assert!(text.contains("Target population: 2 financially excluded adults"));
    assert!(!text.contains('\n'));
}

#[test]
fn large_targets_use_thousands_separators() {
    let input = InsightInput {
        overall: AggregateReport {
            record_count: 5000,
            mean_literacy: 40.0,
            ..AggregateReport::default()
        },
        urban: None,
        rural: None,
        low_literacy_count: 1234,
    };
    let recs = generate_insights(&input, &InsightConfig::default());
    let literacy = recs.iter().find(|r| r.rule == "literacy_gap").unwrap();
    assert_eq!(literacy.target, "1,234 individuals with low financial literacy");
}

// ── Key findings ──────────────────────────────────────────────────

#[test]
fn key_findings_report_gap_and_advantage() {
    let urban = [(true, true, 90.0); 2];
    let rural = [(false, true, 90.0), (false, false, 90.0)];
    let findings = key_findings(&input_from(&urban, &rural, 0));

    assert_eq!(findings.urban_rural_gap_pp, Some(50.0));
    assert_eq!(findings.excluded_rural_residents, 1);
    assert!((findings.mobile_money_advantage_pp - 25.0).abs() < 1e-9);
}
