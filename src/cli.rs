//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    build_engine_config, build_rule_set, data_period, validate_config,
};
use crate::domain::engine::{self, EngineConfig, EngineOutput};
use crate::domain::error::SignalboardError;
use crate::domain::period::Period;
use crate::domain::rule::{RuleSet, Side};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

/// Rows shown by `score` when `--tail` is not given.
pub const DEFAULT_TAIL: usize = 30;
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Parser, Debug)]
#[command(name = "signalboard", about = "Indicator and buy/sell scoring engine for daily index data")]
pub struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators and scores for a symbol
    Score {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        volatility_symbol: Option<String>,
        /// Score without the volatility index
        #[arg(long)]
        no_volatility: bool,
        /// Look-back period: 5d, 6mo, 1y, ytd, max
        #[arg(long)]
        period: Option<String>,
        /// Write the full table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of most recent rows to print
        #[arg(long, default_value_t = DEFAULT_TAIL)]
        tail: usize,
    },
    /// Print the effective rule set
    Rules {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file and its rules
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// What to fetch for one `score` run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRequest {
    pub symbol: String,
    pub volatility_symbol: Option<String>,
    pub period: Period,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Score {
            config,
            symbol,
            volatility_symbol,
            no_volatility,
            period,
            output,
            tail,
        } => run_score(
            &config,
            symbol.as_deref(),
            volatility_symbol.as_deref(),
            no_volatility,
            period.as_deref(),
            output.as_deref(),
            tail,
        ),
        Command::Rules { config } => run_rules(config.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SignalboardError> {
    let config = FileConfigAdapter::from_file(path)?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn data_dir(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("data", "dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Merges command-line overrides over the `[data]` section.
pub fn resolve_request(
    config: &dyn ConfigPort,
    symbol: Option<&str>,
    volatility_symbol: Option<&str>,
    no_volatility: bool,
    period: Option<&str>,
) -> Result<ScoreRequest, SignalboardError> {
    let symbol = symbol
        .map(str::to_string)
        .or_else(|| config.get_string("data", "symbol"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SignalboardError::ConfigMissing {
            section: "data".into(),
            key: "symbol".into(),
        })?;

    let volatility_symbol = if no_volatility {
        None
    } else {
        volatility_symbol
            .map(str::to_string)
            .or_else(|| config.get_string("data", "volatility_symbol"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let period = match period {
        Some(p) => p.parse::<Period>().map_err(|reason| SignalboardError::ConfigInvalid {
            section: "data".into(),
            key: "period".into(),
            reason,
        })?,
        None => data_period(config)?,
    };

    Ok(ScoreRequest {
        symbol,
        volatility_symbol,
        period,
    })
}

/// Fetch, compute and score. A missing or unreadable volatility series is logged and
/// scoring continues without it.
pub fn run_score_pipeline(
    data_port: &dyn DataPort,
    request: &ScoreRequest,
    engine_config: &EngineConfig,
    rules: &RuleSet,
) -> Result<EngineOutput, SignalboardError> {
    let series = data_port.fetch_ohlcv(&request.symbol, request.period)?;

    let minimum = engine_config.longest_window() + 1;
    if engine_config.strict_windows && series.len() < minimum {
        return Err(SignalboardError::InsufficientData {
            symbol: request.symbol.clone(),
            bars: series.len(),
            minimum,
        });
    }

    let volatility = match &request.volatility_symbol {
        Some(vol_symbol) => match data_port.fetch_ohlcv(vol_symbol, request.period) {
            Ok(vol) => Some(vol),
            Err(e) => {
                warn!(symbol = %vol_symbol, error = %e, "volatility data unavailable, scoring without it");
                None
            }
        },
        None => None,
    };

    let output = engine::run(&series, volatility.as_ref(), engine_config, rules)?;
    info!(
        symbol = %request.symbol,
        bars = output.frame.len(),
        volatility = output.volatility.is_some(),
        "scored"
    );
    Ok(output)
}

fn run_score(
    config_path: &Path,
    symbol: Option<&str>,
    volatility_symbol: Option<&str>,
    no_volatility: bool,
    period: Option<&str>,
    output_path: Option<&Path>,
    tail: usize,
) -> Result<(), SignalboardError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let engine_config = build_engine_config(&config)?;
    let rules = build_rule_set(&config)?;
    let request = resolve_request(&config, symbol, volatility_symbol, no_volatility, period)?;

    let data_port = CsvAdapter::new(data_dir(&config));
    let output = run_score_pipeline(&data_port, &request, &engine_config, &rules)?;

    print!("{}", format_summary(&output, &rules, tail));

    if let Some(path) = output_path {
        CsvReportAdapter::new().write(&output, path)?;
    }
    Ok(())
}

fn run_rules(config_path: Option<&Path>) -> Result<(), SignalboardError> {
    let rules = match config_path {
        Some(path) => {
            let config = load_config(path)?;
            build_rule_set(&config)?
        }
        None => RuleSet::default_rules(),
    };
    print!("{}", format_rules(&rules));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SignalboardError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let rules = build_rule_set(&config)?;
    let engine_config = build_engine_config(&config)?;

    println!("Configuration is valid.");
    println!(
        "  windows: {}",
        engine_config
            .windows()
            .iter()
            .map(|(name, w)| format!("{name}={w}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  rules:   {} buy, {} sell",
        rules.count(Side::Buy),
        rules.count(Side::Sell)
    );
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), SignalboardError> {
    let config = load_config(config_path)?;
    let data_port = CsvAdapter::new(data_dir(&config));
    let symbols = data_port.list_symbols()?;

    if symbols.is_empty() {
        warn!(dir = %data_dir(&config).display(), "no symbols found");
    }
    for symbol in &symbols {
        println!("{}", symbol);
    }
    Ok(())
}

pub fn format_rules(rules: &RuleSet) -> String {
    let width = rules
        .rules()
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for rule in rules.rules() {
        let _ = writeln!(
            out,
            "{:<width$}  {:<4}  {}",
            rule.name,
            rule.side,
            rule.predicate,
            width = width
        );
    }
    out
}

fn cell(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

/// Fixed-width table of the last `tail` dates.
pub fn format_summary(output: &EngineOutput, rules: &RuleSet, tail: usize) -> String {
    let frame = &output.frame;
    let buy_max = rules.count(Side::Buy);
    let sell_max = rules.count(Side::Sell);
    let mut out = String::new();

    let range = match (frame.bars.first(), frame.bars.last()) {
        (Some(first), Some(last)) => format!("{} .. {}", first.date, last.date),
        _ => "no data".to_string(),
    };
    let _ = write!(out, "{}  {}  ({} bars)", frame.symbol, range, frame.len());
    if let Some(ctx) = &output.volatility {
        let _ = write!(out, "  volatility: {}", ctx.symbol());
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "{:<10}  {:>10}  {:>6}  {:>9}  {:>9}  {:>8}  {:>6}  {:>5}  {:>5}",
        "date", "price", "rsi", "macd", "signal", "drawdown", "vol", "buy", "sell"
    );

    let start = frame.len().saturating_sub(tail);
    for i in start..frame.len() {
        let bar = &frame.bars[i];
        let vol = output.volatility.as_ref().and_then(|ctx| ctx.flags_at(i).level);
        let (buy, sell) = output
            .scores
            .get(i)
            .map_or((0, 0), |s| (s.buy_score, s.sell_score));
        let drawdown = frame.drawdown[i].map(|d| d * 100.0);
        let _ = writeln!(
            out,
            "{:<10}  {:>10.2}  {:>6}  {:>9}  {:>9}  {:>7}%  {:>6}  {:>5}  {:>5}",
            bar.date.format("%Y-%m-%d").to_string(),
            bar.price(),
            cell(frame.rsi[i], 1),
            cell(frame.macd[i], 3),
            cell(frame.macd_signal[i], 3),
            cell(drawdown, 2),
            cell(vol, 2),
            format!("{}/{}", buy, buy_max),
            format!("{}/{}", sell, sell_max),
        );
    }
    out
}
