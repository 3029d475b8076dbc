//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use optimizer_lib::ScheduleWindow;
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Pretty-print any response as JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Carbon intensity in gCO2eq/kWh
pub fn format_intensity(intensity: f64) -> String {
    format!("{:.1} g/kWh", intensity)
}

/// Color intensity: green below 100, yellow below 300, red otherwise
pub fn color_intensity(intensity: f64) -> String {
    let formatted = format_intensity(intensity);
    if intensity < 100.0 {
        formatted.green().to_string()
    } else if intensity < 300.0 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// CO2 mass, switching to grams below one kilogram
pub fn format_co2(kg: f64) -> String {
    if kg.abs() >= 1.0 {
        format!("{:.2} kg", kg)
    } else {
        format!("{:.1} g", kg * 1000.0)
    }
}

pub fn format_percentage(pct: Option<f64>) -> String {
    pct.map_or_else(|| "-".to_string(), |p| format!("{:.0}%", p))
}

/// Mark fallback-backed figures
pub fn format_source(is_estimate: bool) -> String {
    if is_estimate {
        "estimate".yellow().to_string()
    } else {
        "live".green().to_string()
    }
}

pub fn format_window(window: Option<&ScheduleWindow>) -> String {
    match window {
        Some(w) => format!(
            "{} → {} ({})",
            w.start.format("%m-%d %H:%M"),
            w.end.format("%m-%d %H:%M"),
            format_intensity(w.avg_intensity)
        ),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_co2_units() {
        assert_eq!(format_co2(5.28), "5.28 kg");
        assert_eq!(format_co2(0.0875), "87.5 g");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(64.6)), "65%");
        assert_eq!(format_percentage(None), "-");
    }

    #[test]
    fn test_format_window() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap();
        let window = ScheduleWindow {
            start,
            end: start + chrono::Duration::hours(1),
            avg_intensity: 5.0,
            duration_h: 2,
        };
        assert_eq!(
            format_window(Some(&window)),
            "05-01 02:00 → 05-01 03:00 (5.0 g/kWh)"
        );
        assert_eq!(format_window(None), "-");
    }
}
