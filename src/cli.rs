//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_adapter::JsonAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::{
    validate_screen_config, validate_screen_config_with, validate_threshold_config, ScreenOverrides,
};
use crate::domain::error::ScreenerError;
use crate::domain::evaluator::{evaluate, CheckStatus, EvaluatedRecord};
use crate::domain::metric::Metric;
use crate::domain::screen::{
    parse_tickers, run_screen_strict, ReportFormat, ScreenConfig, ScreenReport, SourceKind,
};
use crate::domain::threshold::{Preset, Threshold, ThresholdSet};
use crate::domain::threshold_parser::{parse_comparison, parse_threshold};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "valuescreen", about = "Threshold-based fundamentals screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate every configured ticker and write the results
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated tickers, replacing the configured list
        #[arg(long)]
        tickers: Option<String>,
        /// Built-in threshold set to use instead of the configured one
        #[arg(long)]
        preset: Option<String>,
        /// Extra or replacement threshold, e.g. "pe_ratio <= 20"
        #[arg(long = "threshold")]
        thresholds: Vec<String>,
        /// csv or json
        #[arg(long)]
        format: Option<String>,
    },
    /// Show how a single ticker fares against each threshold
    Inspect {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        preset: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print a threshold set
    Rules {
        #[arg(long)]
        preset: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List tickers available in the configured data source
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            config,
            output,
            tickers,
            preset,
            thresholds,
            format,
        } => run_screen_command(
            &config,
            output.as_ref(),
            tickers.as_deref(),
            preset.as_deref(),
            &thresholds,
            format.as_deref(),
        ),
        Command::Inspect {
            config,
            ticker,
            preset,
        } => run_inspect(&config, &ticker, preset.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Rules { preset, config } => run_rules(preset.as_deref(), config.as_ref()),
        Command::ListTickers { config } => run_list_tickers(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn fail(err: ScreenerError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn parse_preset(name: &str) -> Result<Preset, ScreenerError> {
    Preset::from_name(name).ok_or_else(|| ScreenerError::ConfigInvalid {
        section: "screen".into(),
        key: "preset".into(),
        reason: format!(
            "unknown preset '{}', expected one of: {}",
            name,
            Preset::ALL.map(|p| p.name()).join(", ")
        ),
    })
}

/// Resolve the threshold set: a `--preset` flag wins, then a `[thresholds]`
/// section, then `[screen] preset`, then the comprehensive preset. Entries in
/// `overrides` replace the same metric or are appended.
pub fn build_thresholds(
    config: &dyn ConfigPort,
    preset_override: Option<&str>,
    overrides: &[String],
) -> Result<ThresholdSet, ScreenerError> {
    let keys = config.keys("thresholds");

    let mut list: Vec<Threshold> = if let Some(name) = preset_override {
        parse_preset(name)?.thresholds().iter().copied().collect()
    } else if !keys.is_empty() {
        let mut list = Vec::with_capacity(keys.len());
        for key in keys {
            let metric = key
                .parse::<Metric>()
                .map_err(|reason| ScreenerError::ConfigInvalid {
                    section: "thresholds".into(),
                    key: key.clone(),
                    reason,
                })?;
            let value = config.get_string("thresholds", &key).unwrap_or_default();
            let (direction, bound) = parse_comparison(&value)?;
            list.push(Threshold {
                metric,
                direction,
                bound,
            });
        }
        list
    } else {
        let preset = match config.get_string("screen", "preset") {
            Some(name) => parse_preset(&name)?,
            None => Preset::Comprehensive,
        };
        preset.thresholds().iter().copied().collect()
    };

    for text in overrides {
        let threshold = parse_threshold(text)?;
        match list.iter_mut().find(|t| t.metric == threshold.metric) {
            Some(existing) => *existing = threshold,
            None => list.push(threshold),
        }
    }

    ThresholdSet::new(list)
}

pub fn resolve_tickers(
    ticker_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, ScreenerError> {
    let (source, key) = match ticker_override {
        Some(t) => (t.to_string(), "--tickers"),
        None => (
            config
                .get_string("screen", "tickers")
                .ok_or_else(|| ScreenerError::ConfigMissing {
                    section: "screen".into(),
                    key: "tickers".into(),
                })?,
            "tickers",
        ),
    };
    parse_tickers(&source).map_err(|e| ScreenerError::ConfigInvalid {
        section: "screen".into(),
        key: key.into(),
        reason: e.to_string(),
    })
}

fn parse_source(value: Option<String>) -> Result<SourceKind, ScreenerError> {
    match value.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("csv") => Ok(SourceKind::Csv),
        Some("json") => Ok(SourceKind::Json),
        Some(other) => Err(ScreenerError::ConfigInvalid {
            section: "screen".into(),
            key: "source".into(),
            reason: format!("'{}' is not one of: csv, json", other),
        }),
    }
}

fn parse_format(value: Option<String>) -> Result<ReportFormat, ScreenerError> {
    match value.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("csv") => Ok(ReportFormat::Csv),
        Some("json") => Ok(ReportFormat::Json),
        Some(other) => Err(ScreenerError::ConfigInvalid {
            section: "screen".into(),
            key: "format".into(),
            reason: format!("'{}' is not one of: csv, json", other),
        }),
    }
}

pub fn build_screen_config(
    config: &dyn ConfigPort,
    ticker_override: Option<&str>,
    output_override: Option<&PathBuf>,
    format_override: Option<&str>,
) -> Result<ScreenConfig, ScreenerError> {
    let tickers = resolve_tickers(ticker_override, config)?;
    let source = parse_source(config.get_string("screen", "source"))?;
    let data_path = config
        .get_string("screen", "data_path")
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .ok_or_else(|| ScreenerError::ConfigMissing {
            section: "screen".into(),
            key: "data_path".into(),
        })?;
    let format = parse_format(
        format_override
            .map(str::to_string)
            .or_else(|| config.get_string("screen", "format")),
    )?;
    let output = output_override
        .cloned()
        .or_else(|| config.get_string("screen", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("screen_results.{}", format.extension())));

    Ok(ScreenConfig {
        tickers,
        source,
        data_path,
        output,
        format,
        include_inputs: config.get_bool("report", "include_inputs", true),
    })
}

pub fn make_data_port(cfg: &ScreenConfig) -> Box<dyn DataPort> {
    match cfg.source {
        SourceKind::Csv => Box::new(CsvAdapter::new(cfg.data_path.clone())),
        SourceKind::Json => Box::new(JsonAdapter::new(cfg.data_path.clone())),
    }
}

pub fn make_report_port(cfg: &ScreenConfig) -> Box<dyn ReportPort> {
    match cfg.format {
        ReportFormat::Csv => Box::new(CsvReportAdapter::new(cfg.include_inputs)),
        ReportFormat::Json => Box::new(JsonReportAdapter::new()),
    }
}

fn run_screen_command(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    ticker_override: Option<&str>,
    preset_override: Option<&str>,
    threshold_overrides: &[String],
    format_override: Option<&str>,
) -> ExitCode {
    // Stage 1: Load config
    info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate every key no flag replaces
    let overrides = ScreenOverrides {
        tickers: ticker_override.is_some(),
        format: format_override.is_some(),
        preset: preset_override.is_some(),
    };
    if let Err(e) = validate_screen_config_with(&adapter, overrides) {
        return fail(e);
    }
    if preset_override.is_none() {
        if let Err(e) = validate_threshold_config(&adapter) {
            return fail(e);
        }
    }

    // Stage 3: Resolve thresholds and run settings
    let thresholds = match build_thresholds(&adapter, preset_override, threshold_overrides) {
        Ok(t) => t,
        Err(e) => return fail(e),
    };
    let cfg = match build_screen_config(
        &adapter,
        ticker_override,
        output_path,
        format_override,
    ) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    // Stages 4-6: Fetch, evaluate, export
    let data_port = make_data_port(&cfg);
    let report_port = make_report_port(&cfg);
    run_screen_pipeline(
        data_port.as_ref(),
        report_port.as_ref(),
        &cfg.tickers,
        &thresholds,
        &cfg.output,
    )
}

pub fn run_screen_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    tickers: &[String],
    thresholds: &ThresholdSet,
    output: &Path,
) -> ExitCode {
    info!(
        tickers = tickers.len(),
        thresholds = thresholds.len(),
        "screening"
    );

    let report = match run_screen_strict(data_port, tickers, thresholds) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    print_summary(&report);

    match report_port.write(&report, output) {
        Ok(()) => {
            eprintln!("\nResults saved to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn print_summary(report: &ScreenReport) {
    eprintln!("\n=== Screen Results ===");
    eprintln!("Requested:  {}", report.requested);
    eprintln!("Evaluated:  {}", report.evaluated());
    eprintln!("Invest:     {}", report.invest_count());
    eprintln!("Skipped:    {}", report.failures.len());

    let invest = report.invest_tickers();
    if !invest.is_empty() {
        eprintln!("\nInvest candidates: {}", invest.join(", "));
    }
    if !report.failures.is_empty() {
        eprintln!("\n=== Skipped ===");
        for f in &report.failures {
            eprintln!("  {}: {}", f.ticker, f.reason);
        }
    }
}

fn format_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn format_inspection(record: &EvaluatedRecord) -> String {
    let mut out = format!("{}: {}\n", record.ticker(), record.decision);
    out.push_str("\nThresholds:\n");
    for check in &record.checks {
        let status = match check.status {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Missing => "MISSING",
        };
        out.push_str(&format!(
            "  {:<30} {:>12}  {}\n",
            check.threshold.to_string(),
            format_value(check.value),
            status
        ));
    }
    out.push_str("\nMetrics:\n");
    for metric in Metric::ALL {
        out.push_str(&format!(
            "  {:<22} {:>12}\n",
            metric.label(),
            format_value(record.metric(metric))
        ));
    }
    out
}

fn run_inspect(config_path: &PathBuf, ticker: &str, preset_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let overrides = ScreenOverrides {
        tickers: true,
        format: true,
        preset: preset_override.is_some(),
    };
    if let Err(e) = validate_screen_config_with(&adapter, overrides) {
        return fail(e);
    }
    if preset_override.is_none() {
        if let Err(e) = validate_threshold_config(&adapter) {
            return fail(e);
        }
    }
    let thresholds = match build_thresholds(&adapter, preset_override, &[]) {
        Ok(t) => t,
        Err(e) => return fail(e),
    };
    let cfg = match build_screen_config(&adapter, Some(ticker), None, None) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let Some(ticker) = cfg.tickers.first() else {
        return fail(ScreenerError::ConfigInvalid {
            section: "screen".into(),
            key: "--ticker".into(),
            reason: "no ticker given".into(),
        });
    };

    let data_port = make_data_port(&cfg);
    let raw = match data_port.fetch_snapshot(ticker) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    print!("{}", format_inspection(&evaluate(&raw, &thresholds)));
    ExitCode::SUCCESS
}

fn print_thresholds(thresholds: &ThresholdSet) {
    for t in thresholds.iter() {
        println!("{:<22} {} {}", t.metric.key(), t.direction.symbol(), t.bound);
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_screen_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_threshold_config(&adapter) {
        return fail(e);
    }

    let cfg = match build_screen_config(&adapter, None, None, None) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let thresholds = match build_thresholds(&adapter, None, &[]) {
        Ok(t) => t,
        Err(e) => return fail(e),
    };

    eprintln!("\nTickers ({}): {}", cfg.tickers.len(), cfg.tickers.join(", "));
    eprintln!("Source:  {:?} at {}", cfg.source, cfg.data_path.display());
    eprintln!("Output:  {} ({})", cfg.output.display(), cfg.format.extension());
    eprintln!("\nThresholds ({}):", thresholds.len());
    print_thresholds(&thresholds);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_rules(preset: Option<&str>, config_path: Option<&PathBuf>) -> ExitCode {
    let thresholds = match config_path {
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            build_thresholds(&adapter, preset, &[])
        }
        None => parse_preset(preset.unwrap_or("comprehensive")).map(|p| p.thresholds()),
    };

    match thresholds {
        Ok(t) => {
            print_thresholds(&t);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_list_tickers(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let source = match parse_source(adapter.get_string("screen", "source")) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let data_path = match adapter.get_string("screen", "data_path") {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
        _ => {
            return fail(ScreenerError::ConfigMissing {
                section: "screen".into(),
                key: "data_path".into(),
            })
        }
    };

    let data_port: Box<dyn DataPort> = match source {
        SourceKind::Csv => Box::new(CsvAdapter::new(data_path)),
        SourceKind::Json => Box::new(JsonAdapter::new(data_path)),
    };

    let tickers = match data_port.list_tickers() {
        Ok(t) => t,
        Err(e) => return fail(e),
    };

    if tickers.is_empty() {
        eprintln!("No tickers found");
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        eprintln!("{} tickers found", tickers.len());
    }
    ExitCode::SUCCESS
}
