//! Placement recommendation command

use anyhow::Result;
use colored::Colorize;
use optimizer_lib::{Priority, Workload};
use tabled::Tabled;

use crate::client::{ApiClient, OptimizeRequest};
use crate::output::{
    color_intensity, format_co2, format_source, format_window, print_info, print_json,
    print_success, print_table, OutputFormat,
};

/// Row for the recommendations table
#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Intensity")]
    intensity: String,
    #[tabled(rename = "CO2")]
    co2: String,
    #[tabled(rename = "Best Window")]
    window: String,
    #[tabled(rename = "Source")]
    source: String,
}

/// Ask the service for ranked region/instance pairings
pub async fn suggest(
    client: &ApiClient,
    workload: Workload,
    priority: Priority,
    region: Option<String>,
    duration_hours: f64,
    format: OutputFormat,
) -> Result<()> {
    let request = OptimizeRequest {
        workload: workload.to_string(),
        priority: priority.to_string(),
        region,
        duration_hours,
    };
    let set = client.optimize(&request).await?;

    match format {
        OutputFormat::Json => print_json(&set)?,
        OutputFormat::Table => {
            println!(
                "{}",
                format!(
                    "Recommendations for {} workload ({} priority, {}h)",
                    set.workload, set.priority, set.metadata.duration_h
                )
                .bold()
            );

            let rows: Vec<RecommendationRow> = set
                .recommendations
                .iter()
                .enumerate()
                .map(|(i, r)| RecommendationRow {
                    rank: i + 1,
                    region: r.region.clone(),
                    instance: r.instance_class.clone(),
                    intensity: color_intensity(r.intensity),
                    co2: format_co2(r.emissions.co2_kg),
                    window: format_window(r.optimal_window.as_ref()),
                    source: format_source(r.is_estimate),
                })
                .collect();
            print_table(rows);

            if set.carbon_savings.potential_savings_kg > 0.0 {
                print_success(&set.carbon_savings.comparison);
            }
            if !set.service_optimizations.is_empty() {
                println!("\n{}", "Optimization tips:".bold());
                for tip in &set.service_optimizations {
                    println!("  • {}", tip);
                }
            }
            print_info(&format!(
                "{} regions analyzed, data freshness: {:?}",
                set.metadata.total_regions_analyzed, set.metadata.data_freshness
            ));
        }
    }

    Ok(())
}
