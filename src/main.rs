use anyhow::Result;
use clap::Parser;
use signal_parser::batch::{parse_file, BatchReport, BlockSplitter};
use signal_parser::build_extractor;
use signal_parser::config::{Config, EnvConfig, ParserVariant};
use signal_parser::monitoring::logger::CsvLogger;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "signal-parser")]
#[command(about = "Extract structured trading signals from free-form chat messages")]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(long, short)]
    config: Option<String>,

    /// Use the strict four-line parser instead of the heuristic one
    #[arg(long)]
    strict: bool,

    /// Print accepted signals as JSON
    #[arg(long)]
    json: bool,

    /// Signal files to parse
    #[arg(default_values = ["signals.txt", "newsignal.txt"])]
    files: Vec<String>,
}

fn main() -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    // Load configuration
    let env_config = EnvConfig::load()?;
    let config_path = args
        .config
        .clone()
        .or_else(|| env_config.config_path.clone())
        .unwrap_or_else(|| "config.toml".to_string());
    let mut config = Config::load_or_default(&config_path)?;
    config.apply_env(&env_config)?;
    if args.strict {
        config.parser.variant = ParserVariant::Strict;
    }

    tracing::info!("Parser variant: {:?}", config.parser.variant);
    tracing::info!("Default stop: {}%", config.parser.default_stop_pct);

    let extractor = build_extractor(&config.parser);
    let splitter = BlockSplitter::from_config(&config.parser);
    let csv_logger = if config.monitoring.csv_logging {
        tracing::info!("CSV logging to {}", config.monitoring.csv_log_path);
        Some(CsvLogger::new(&config.monitoring.csv_log_path)?)
    } else {
        None
    };

    let mut total = BatchReport::default();
    for file in &args.files {
        let report = match parse_file(extractor.as_ref(), &splitter, file) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("{:#}", e);
                continue;
            }
        };

        if let Some(logger) = &csv_logger {
            logger.log_report(&report, file)?;
        }
        println!("{}: {}", file, report);
        total.merge(report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&total.signals)?);
    }
    println!("{}", total);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_default_files() {
        let args = Args::try_parse_from(["signal-parser"]).unwrap();
        assert_eq!(args.files, vec!["signals.txt", "newsignal.txt"]);
        assert!(!args.strict);
        assert!(!args.json);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_flags_and_files() {
        let args = Args::try_parse_from([
            "signal-parser",
            "--config",
            "custom.toml",
            "--strict",
            "--json",
            "a.txt",
            "b.txt",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("custom.toml"));
        assert!(args.strict);
        assert!(args.json);
        assert_eq!(args.files, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Args::try_parse_from(["signal-parser", "--verbose"]).is_err());
    }
}
