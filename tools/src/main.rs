//! finclusion-runner: headless runner for the inclusion survey pipeline.
//!
//! Usage:
//!   finclusion-runner --data-dir ./data --group-by province,gender
//!   finclusion-runner --demographics d.csv --services s.csv --threshold 60 --json out.json
//!   finclusion-runner --data-dir ./data --province kigali,eastern --area urban
//!   finclusion-runner --generate 2000 --seed 42 --data-dir ./data

use anyhow::Result;
use finclusion_core::{
    aggregation::round1,
    generator::{SurveyGenerator, DEMOGRAPHICS_FILE, SERVICES_FILE},
    types::{AreaType, Province},
    AnalysisConfig, AnalysisContext, PipelineOutput, PopulationFilter, Segment,
};
use std::env;
use std::path::PathBuf;

#[derive(serde::Serialize)]
struct RunEnvelope<'a> {
    generated_at: chrono::DateTime<chrono::Utc>,
    version: &'static str,
    demographics: String,
    services: String,
    output: &'a PipelineOutput,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    if let Some(count) = parse_flag::<usize>(&args, "--generate", "a respondent count")? {
        let seed = parse_flag::<u64>(&args, "--seed", "an unsigned integer")?.unwrap_or(42);
        let (demographics, services) =
            SurveyGenerator::new(seed).write_csv(count, PathBuf::from(data_dir).as_path())?;
        println!("Generated {count} respondents (seed {seed})");
        println!("  {}", demographics.display());
        println!("  {}", services.display());
        return Ok(());
    }

    let demographics = flag_value(&args, "--demographics")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(data_dir).join(DEMOGRAPHICS_FILE));
    let services = flag_value(&args, "--services")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(data_dir).join(SERVICES_FILE));

    let mut config = match flag_value(&args, "--config") {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(threshold) = parse_flag::<f64>(&args, "--threshold", "a number")? {
        config = config.with_digital_threshold(threshold);
    }
    if let Some(list) = flag_value(&args, "--province") {
        let provinces = comma_list(list)
            .into_iter()
            .map(|name| {
                Province::parse(name)
                    .ok_or_else(|| anyhow::anyhow!("--province: unknown province '{name}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        config.filter = config.filter.provinces(provinces);
    }
    if let Some(area) = flag_value(&args, "--area") {
        let area = AreaType::parse(area)
            .ok_or_else(|| anyhow::anyhow!("--area expects urban or rural, got '{area}'"))?;
        config.filter = config.filter.area(area);
    }
    let group_by: Vec<&str> = flag_value(&args, "--group-by")
        .map(comma_list)
        .unwrap_or_default();

    println!("Financial Inclusion Analysis: finclusion-runner");
    println!("  demographics:      {}", demographics.display());
    println!("  services:          {}", services.display());
    println!("  digital_threshold: {}", config.segmentation.digital_threshold);
    println!("  population:        {}", describe_filter(&config.filter));
    println!();

    let context = AnalysisContext::open(&demographics, &services, config)?;
    let output = context.run_by_name(&group_by)?;

    print_summary(&output);

    if let Some(path) = flag_value(&args, "--json") {
        let envelope = RunEnvelope {
            generated_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            demographics: demographics.display().to_string(),
            services: services.display().to_string(),
            output: &output,
        };
        std::fs::write(path, serde_json::to_string_pretty(&envelope)?)?;
        log::info!("Wrote run output to {path}");
        println!();
        println!("JSON written to {path}");
    }

    Ok(())
}

fn print_summary(output: &PipelineOutput) {
    let overall = &output.overall;
    let adoption = &overall.adoption;

    println!("=== EXECUTIVE OVERVIEW ===");
    println!("  respondents:            {}", output.record_count);
    println!("  formal inclusion:       {:.1}%", overall.inclusion_rate * 100.0);
    println!("  mobile money usage:     {:.1}%", adoption.mobile_money * 100.0);
    println!("  bank account ownership: {:.1}%", adoption.bank_account * 100.0);
    println!("  avg financial literacy: {:.1}/100", overall.mean_literacy);
    println!("  financially excluded:   {}", overall.excluded_count);

    println!();
    println!("=== SERVICES USED ===");
    for (count, respondents) in overall.service_count_distribution.iter().enumerate() {
        println!("  {count} services: {respondents:>6}");
    }

    println!();
    println!("=== MARKET SEGMENTS ===");
    if output.segment_profiles.is_empty() {
        println!("  (no respondents)");
    }
    for profile in &output.segment_profiles {
        println!(
            "  {:<26} {:>6} ({:>5.1}%) | income {:>9.0} | urban {:>5.1}% | literacy {:.1}",
            profile.segment.label(),
            profile.size,
            round1(profile.share_pct),
            profile.mean_income_rwf,
            profile.urban_pct,
            profile.mean_literacy
        );
    }

    for grouped in &output.breakdowns {
        let name = grouped.dimension.map(|d| d.name()).unwrap_or("overall");
        println!();
        println!("=== BY {} ===", name.to_uppercase());
        for (key, report) in grouped.iter() {
            let mix: Vec<String> = Segment::ALL
                .iter()
                .map(|s| format!("{:.1}", report.segment_pct(*s)))
                .collect();
            println!(
                "  {:<14} n={:<6} inclusion {:>5.1}% | literacy {:>5.1} | mix {}",
                key,
                report.record_count,
                report.inclusion_rate * 100.0,
                report.mean_literacy,
                mix.join(" / ")
            );
        }
    }

    println!();
    println!("=== KEY FINDINGS ===");
    match output.key_findings.urban_rural_gap_pp {
        Some(gap) => println!("  urban-rural gap:          {gap:.1} pp"),
        None => println!("  urban-rural gap:          (needs both urban and rural respondents)"),
    }
    println!(
        "  excluded rural residents: {}",
        output.key_findings.excluded_rural_residents
    );
    println!(
        "  mobile money advantage:   {:+.1} pp",
        output.key_findings.mobile_money_advantage_pp
    );

    println!();
    println!("=== STRATEGIC RECOMMENDATIONS ===");
    if output.recommendations.is_empty() {
        println!("  (no rule fired)");
    }
    for (i, rec) in output.recommendations.iter().enumerate() {
        println!("  {}. {}", i + 1, rec);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// `Ok(None)` when the flag is absent; an error when its value does not parse.
fn parse_flag<T>(args: &[String], flag: &str, expected: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    flag_value(args, flag)
        .map(|v| {
            v.parse()
                .map_err(|e| anyhow::anyhow!("{flag} expects {expected}, got '{v}': {e}"))
        })
        .transpose()
}

fn comma_list(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn describe_filter(filter: &PopulationFilter) -> String {
    if filter.is_unrestricted() {
        return "everyone".to_string();
    }
    let provinces = filter.provinces.as_ref().map_or("all provinces".to_string(), |p| {
        p.iter().map(|p| p.label()).collect::<Vec<_>>().join(", ")
    });
    let area = filter.area.map_or("all areas", |a| a.label());
    format!("{provinces} / {area}")
}
