//! Region ranking and detail commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_intensity, format_intensity, format_percentage, format_source, print_info, print_json,
    print_table, print_warning, OutputFormat,
};

/// Row for the region ranking table
#[derive(Tabled)]
struct RegionRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Intensity")]
    intensity: String,
    #[tabled(rename = "Renewable")]
    renewable: String,
    #[tabled(rename = "Source")]
    source: String,
}

/// List all regions, cleanest first
pub async fn list_regions(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result = client.list_regions().await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.regions.is_empty() {
                print_warning("No regions returned");
                return Ok(());
            }

            let estimates = result.regions.iter().filter(|r| r.is_estimate).count();
            let rows: Vec<RegionRow> = result
                .regions
                .into_iter()
                .enumerate()
                .map(|(i, r)| RegionRow {
                    rank: i + 1,
                    region: r.region,
                    zone: r.zone,
                    intensity: color_intensity(r.intensity),
                    renewable: format_percentage(r.renewable_pct),
                    source: format_source(r.is_estimate),
                })
                .collect();

            print_table(rows);
            println!("\nTotal: {} regions", result.total_regions);
            if estimates > 0 {
                print_info(&format!(
                    "{} regions use static estimates (live telemetry unavailable)",
                    estimates
                ));
            }
        }
    }

    Ok(())
}

/// Show the detailed carbon picture of one region
pub async fn show_region(client: &ApiClient, region: &str, format: OutputFormat) -> Result<()> {
    let details = client.region_details(region).await?;

    match format {
        OutputFormat::Json => print_json(&details)?,
        OutputFormat::Table => {
            println!("{}", format!("Region: {}", details.region).bold());
            println!("  Zone:               {}", details.zone);
            println!(
                "  Current intensity:  {} ({})",
                color_intensity(details.current_intensity),
                format_source(details.is_estimate)
            );
            println!(
                "  Renewable:          {}",
                format_percentage(details.renewable_pct)
            );
            println!(
                "  Fossil-free:        {}",
                format_percentage(details.fossil_free_pct)
            );
            println!(
                "  Observed at:        {}",
                details.observed_at.format("%Y-%m-%d %H:%M UTC")
            );

            let forecast = &details.forecast_24h;
            match (forecast.average, forecast.minimum, forecast.maximum) {
                (Some(avg), Some(min), Some(max)) => println!(
                    "  24h forecast:       avg {} / min {} / max {}",
                    format_intensity(avg),
                    format_intensity(min),
                    format_intensity(max)
                ),
                _ => println!("  24h forecast:       {}", "unavailable".dimmed()),
            }

            if !details.optimal_hours_utc.is_empty() {
                let hours: Vec<String> = details
                    .optimal_hours_utc
                    .iter()
                    .map(|h| format!("{:02}", h))
                    .collect();
                println!("  Low-carbon hours:   {} UTC", hours.join(", "));
            }
        }
    }

    Ok(())
}
