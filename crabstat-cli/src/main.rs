//! Command-line interface for crabstat
//! Reads a CRAB status-report log and prints the parsed task summary.
//!
//! Usage:
//!   crabstat `<path>` [--format text|json] [--config `<file>`]

use clap::{Arg, ArgMatches, Command};
use crabstat_config::{CrabstatConfig, Loader};
use crabstat_parser::crab::model::{Status, TaskStatus};
use crabstat_parser::crab::parsing::parse_report;

fn main() {
    let matches = Command::new("crabstat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse and summarize CRAB task status reports")
        .arg(
            Arg::new("path")
                .help("Path to the status-report log file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: text or json")
                .default_value("text"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("percent-decimals")
                .long("percent-decimals")
                .help("Decimal places in the job percentage lines")
                .value_parser(clap::value_parser!(u8)),
        )
        .get_matches();

    let config = load_config(&matches);
    let path = matches.get_one::<String>("path").expect("path is required");
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    });

    let status = parse_report(&source);
    let format = matches.get_one::<String>("format").expect("format has a default");
    match format.as_str() {
        "text" => print_text(&status, &config),
        "json" => print_json(&status),
        other => {
            eprintln!("Unknown format '{}'", other);
            eprintln!("Available formats: text, json");
            std::process::exit(1);
        }
    }
}

fn load_config(matches: &ArgMatches) -> CrabstatConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(decimals) = matches.get_one::<u8>("percent-decimals") {
        loader = loader
            .set_override("summary.percent_decimals", i64::from(*decimals))
            .unwrap_or_else(|e| {
                eprintln!("Invalid override: {}", e);
                std::process::exit(1);
            });
    }
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    })
}

/// The classic status printout: status line, then either the parse error
/// or the job table, then any warnings that need manual review.
fn print_text(status: &TaskStatus, config: &CrabstatConfig) {
    println!("{}", status.status);
    if status.status == Status::Unknown {
        if let Some(error) = &status.parse_error {
            println!("{}", error);
        }
    } else if config.summary.show_job_table {
        for line in status.job_summary_lines(config.summary.percent_decimals) {
            println!("{}", line);
        }
    }
    if config.summary.flag_unknown_warnings {
        for warning in status.unknown_warnings() {
            println!("Unknown warning\n-----\n{}\n-----", warning.text);
        }
    }
}

fn print_json(status: &TaskStatus) {
    let rendered = serde_json::to_string_pretty(status).unwrap_or_else(|e| {
        eprintln!("Error formatting status: {}", e);
        std::process::exit(1);
    });
    println!("{}", rendered);
}
