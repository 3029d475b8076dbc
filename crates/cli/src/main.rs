//! Carbon Optimizer CLI
//!
//! A command-line tool for ranking regions by grid carbon intensity,
//! estimating workload emissions and finding low-carbon schedules.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{emissions, regions, schedule, suggest};
use optimizer_lib::{CompareOption, Priority, Workload};

/// Carbon Optimizer CLI
#[derive(Parser)]
#[command(name = "carbonctl")]
#[command(author, version, about = "CLI for the Carbon Optimizer service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via CARBON_API_URL env var)
    #[arg(long, env = "CARBON_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect regions by carbon intensity
    #[command(subcommand)]
    Regions(RegionsCommands),

    /// Recommend region/instance pairings for a workload
    Suggest {
        /// Workload type (training, inference, general, database, containers, serverless)
        #[arg(long, short, default_value = "general")]
        workload: Workload,

        /// Optimization priority (carbon, performance, balanced)
        #[arg(long, short)]
        priority: Option<Priority>,

        /// Restrict to a single region
        #[arg(long, short)]
        region: Option<String>,

        /// Expected runtime in hours
        #[arg(long, short, default_value_t = 1.0)]
        duration: f64,
    },

    /// Estimate emissions of an instance class in a region
    Calculate {
        #[arg(long, short)]
        region: String,

        /// Instance class (e.g. m7g.large)
        #[arg(long, short)]
        instance: String,

        /// Runtime in hours
        #[arg(long, short, default_value_t = 1.0)]
        duration: f64,
    },

    /// Compare region/instance options side by side
    Compare {
        /// Option as REGION:INSTANCE, repeatable
        #[arg(long = "option", short, value_parser = emissions::parse_option, required = true)]
        options: Vec<CompareOption>,

        /// Runtime in hours
        #[arg(long, short, default_value_t = 1.0)]
        duration: f64,
    },

    /// Find the lowest-carbon window in a region's forecast
    Schedule {
        #[arg(long, short)]
        region: String,

        /// Window length in whole hours
        #[arg(long, short, default_value_t = 4)]
        duration: u32,
    },
}

#[derive(Subcommand)]
pub enum RegionsCommands {
    /// List all regions, cleanest first
    List,

    /// Show details for one region
    Show {
        /// Region name (e.g. eu-north-1)
        region: String,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let format = config.format(cli.format);

    // Initialize client
    let client = client::ApiClient::new(&config.api_url(cli.api_url))?;

    // Execute command
    match cli.command {
        Commands::Regions(regions_cmd) => match regions_cmd {
            RegionsCommands::List => regions::list_regions(&client, format).await?,
            RegionsCommands::Show { region } => {
                regions::show_region(&client, &region, format).await?
            }
        },
        Commands::Suggest {
            workload,
            priority,
            region,
            duration,
        } => {
            suggest::suggest(
                &client,
                workload,
                config.priority(priority),
                region,
                duration,
                format,
            )
            .await?;
        }
        Commands::Calculate {
            region,
            instance,
            duration,
        } => {
            emissions::calculate(&client, region, instance, duration, format).await?;
        }
        Commands::Compare { options, duration } => {
            emissions::compare(&client, options, duration, format).await?;
        }
        Commands::Schedule { region, duration } => {
            schedule::schedule(&client, region, duration, format).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compare_options() {
        let cli = Cli::try_parse_from([
            "carbonctl",
            "compare",
            "--option",
            "eu-north-1:m7g.large",
            "-o",
            "eu-central-1:m6i.large",
            "--duration",
            "10",
        ])
        .unwrap();

        match cli.command {
            Commands::Compare { options, duration } => {
                assert_eq!(options.len(), 2);
                assert_eq!(options[1].region, "eu-central-1");
                assert_eq!(duration, 10.0);
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn test_parse_suggest_enums() {
        let cli = Cli::try_parse_from([
            "carbonctl", "suggest", "-w", "training", "-p", "balanced",
        ])
        .unwrap();
        match cli.command {
            Commands::Suggest {
                workload, priority, ..
            } => {
                assert_eq!(workload, Workload::Training);
                assert_eq!(priority, Some(Priority::Balanced));
            }
            _ => panic!("expected suggest"),
        }

        assert!(Cli::try_parse_from(["carbonctl", "suggest", "-w", "mining"]).is_err());
    }
}
