use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use thermocheck_lib::logging::{init_logging, LogFormat};
use thermocheck_lib::{
    AppConfig, ComparisonReport, ComparisonResult, ConfigManager, ImageAnalysis, ImageError, ImageSource,
    Session, ThermoCheck,
};

#[derive(Parser)]
#[command(name = "thermocheck")]
#[command(about = "Read a temperature from a thermometer photo and compare it with live weather data")]
#[command(version)]
struct Cli {
    /// Image file (JPEG or PNG)
    #[arg(short, long)]
    image: PathBuf,

    /// Where the image came from
    #[arg(long, default_value = "upload")]
    source: ImageSource,

    /// City to compare against (defaults to the configured city)
    #[arg(short, long)]
    city: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log output format (text or json)
    #[arg(long, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let result = run(&cli).await;
    if let Err(e) = &result {
        eprintln!("error: {:#}", e);
    }
    ExitCode::from(exit_code(&result))
}

/// 0 match, 1 no match, 2 incomplete, 3 fatal error
fn exit_code(result: &Result<ComparisonResult>) -> u8 {
    match result {
        Ok(ComparisonResult::Match) => 0,
        Ok(ComparisonResult::NoMatch) => 1,
        Ok(ComparisonResult::Incomplete) => 2,
        Err(_) => 3,
    }
}

async fn run(cli: &Cli) -> Result<ComparisonResult> {
    let config = load_config();
    let pipeline = ThermoCheck::from_config(&config).context("Failed to start the pipeline")?;

    let bytes = std::fs::read(&cli.image).map_err(|source| ImageError::Read {
        path: cli.image.clone(),
        source,
    })?;

    let mut session = Session::new();
    let analysis = pipeline.analyze_image(&mut session, cli.source, &bytes)?;
    let report = pipeline.compare(&session, cli.city.as_deref()).await;

    if cli.json {
        let output = json!({ "analysis": analysis, "comparison": report });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(cli.source, &analysis, &report);
    }

    Ok(report.result)
}

fn load_config() -> AppConfig {
    match ConfigManager::new().and_then(|manager| manager.load_effective()) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Using default config: {}", e);
            let mut config = AppConfig::default();
            config.apply_overrides(std::env::var(thermocheck_lib::services::weather::BASE_URL_ENV).ok());
            config
        }
    }
}

fn print_summary(source: ImageSource, analysis: &ImageAnalysis, report: &ComparisonReport) {
    println!("{} ({}x{})", source.label(), analysis.width, analysis.height);
    println!();
    println!("Extracted Text");
    println!("--------------");
    println!("{}", analysis.raw_text.trim_end());
    println!();

    match analysis.temperature {
        Some(temp) => println!("Extracted Temperature: {}°C", temp),
        None => println!("Warning: {}", analysis.warning.as_deref().unwrap_or("No temperature value detected.")),
    }

    match report.api_temperature {
        Some(temp) => println!("Current API Temperature in {}: {}°C", report.city, temp),
        None => println!(
            "Could not fetch the temperature for {}: {}",
            report.city,
            report.lookup_error.as_deref().unwrap_or("unknown error")
        ),
    }

    println!();
    println!("{}", report.message);
}
