//! Emission calculation and comparison commands

use anyhow::{bail, Result};
use colored::Colorize;
use optimizer_lib::CompareOption;
use tabled::Tabled;

use crate::client::{ApiClient, CalculateRequest, CompareRequest};
use crate::output::{
    color_intensity, format_co2, format_source, print_json, print_success, print_table,
    print_warning, OutputFormat,
};

/// Parse a `region:instance` pair
pub fn parse_option(value: &str) -> Result<CompareOption, String> {
    match value.split_once(':') {
        Some((region, instance)) if !region.is_empty() && !instance.is_empty() => {
            Ok(CompareOption::new(region, instance))
        }
        _ => Err(format!(
            "expected REGION:INSTANCE (e.g. eu-north-1:m7g.large), got '{}'",
            value
        )),
    }
}

/// Row for the comparison table
#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Intensity")]
    intensity: String,
    #[tabled(rename = "Energy")]
    energy: String,
    #[tabled(rename = "CO2")]
    co2: String,
    #[tabled(rename = "Source")]
    source: String,
}

/// Emissions of one instance class in one region
pub async fn calculate(
    client: &ApiClient,
    region: String,
    instance: String,
    duration_hours: f64,
    format: OutputFormat,
) -> Result<()> {
    let calc = client
        .calculate(&CalculateRequest {
            region,
            instance_type: instance,
            duration_hours,
        })
        .await?;

    match format {
        OutputFormat::Json => print_json(&calc)?,
        OutputFormat::Table => {
            let e = &calc.estimate;
            println!(
                "{}",
                format!("{} in {} ({})", e.instance_class, calc.region, calc.zone).bold()
            );
            println!("  Duration:   {}h", e.duration_h);
            println!(
                "  Intensity:  {} ({})",
                color_intensity(e.intensity_used),
                format_source(calc.is_estimate)
            );
            println!("  Energy:     {:.3} kWh", e.power_kwh);
            println!("  Emissions:  {}", format_co2(e.co2_kg).bold());
        }
    }

    Ok(())
}

/// Compare explicit region/instance options, lowest emissions first
pub async fn compare(
    client: &ApiClient,
    options: Vec<CompareOption>,
    duration_hours: f64,
    format: OutputFormat,
) -> Result<()> {
    if options.is_empty() {
        bail!("at least one --option is required");
    }
    let requested = options.len();
    let result = client
        .compare(&CompareRequest {
            options,
            duration_hours,
        })
        .await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.comparisons.is_empty() {
                print_warning("None of the options could be resolved");
                return Ok(());
            }

            let rows: Vec<ComparisonRow> = result
                .comparisons
                .iter()
                .enumerate()
                .map(|(i, c)| ComparisonRow {
                    rank: i + 1,
                    region: c.region.clone(),
                    instance: c.estimate.instance_class.clone(),
                    intensity: color_intensity(c.estimate.intensity_used),
                    energy: format!("{:.3} kWh", c.estimate.power_kwh),
                    co2: format_co2(c.estimate.co2_kg),
                    source: format_source(c.is_estimate),
                })
                .collect();
            print_table(rows);

            let analysis = &result.analysis;
            if analysis.total_options_compared < requested {
                print_warning(&format!(
                    "{} of {} options skipped (unknown region or empty instance)",
                    requested - analysis.total_options_compared,
                    requested
                ));
            }
            if analysis.delta.difference_kg > 0.0 {
                print_success(&format!(
                    "Best option saves {} ({:.2}%) over the worst",
                    format_co2(analysis.delta.difference_kg),
                    analysis.delta.difference_percentage
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        let option = parse_option("eu-north-1:m7g.large").unwrap();
        assert_eq!(option.region, "eu-north-1");
        assert_eq!(option.instance_class, "m7g.large");
    }

    #[test]
    fn test_parse_option_rejects_malformed() {
        assert!(parse_option("eu-north-1").is_err());
        assert!(parse_option(":m7g.large").is_err());
        assert!(parse_option("eu-north-1:").is_err());
    }
}
