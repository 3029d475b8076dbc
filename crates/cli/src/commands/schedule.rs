//! Low-carbon scheduling window command

use anyhow::Result;
use colored::Colorize;

use crate::client::{ApiClient, ScheduleRequest};
use crate::output::{color_intensity, format_intensity, print_json, print_success, OutputFormat};

/// Find the cleanest window of `duration_hours` in a region's forecast
pub async fn schedule(
    client: &ApiClient,
    region: String,
    duration_hours: u32,
    format: OutputFormat,
) -> Result<()> {
    let plan = client
        .schedule(&ScheduleRequest {
            region,
            duration_hours,
        })
        .await?;

    match format {
        OutputFormat::Json => print_json(&plan)?,
        OutputFormat::Table => {
            let window = &plan.optimal_window;
            println!(
                "{}",
                format!(
                    "Optimal {}h window in {} ({})",
                    window.duration_h, plan.region, plan.zone
                )
                .bold()
            );
            println!(
                "  Start:      {}",
                window.start.format("%Y-%m-%d %H:%M UTC")
            );
            println!("  End:        {}", window.end.format("%Y-%m-%d %H:%M UTC"));
            println!("  Average:    {}", color_intensity(window.avg_intensity));
            println!("  Now:        {}", color_intensity(plan.current_intensity));

            let savings = plan.savings_potential.current_vs_optimal_gco2_kwh;
            if savings > 0.0 {
                print_success(&format!(
                    "Waiting saves {} versus running now",
                    format_intensity(savings)
                ));
            } else {
                println!("  {}", "Running now is already optimal".green());
            }
        }
    }

    Ok(())
}
