//! CLI definition and dispatch.

use chrono::{Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::config_regime_adapter::{ConfigRegimeAdapter, REGIME_SECTION};
use crate::adapters::csv_adapter::{CsvAdapter, write_frame};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fundamentals_adapter::IniFundamentalsAdapter;
use crate::domain::backtest::{
    self as backtest_engine, BacktestConfig, BacktestResult, DEFAULT_INITIAL_CAPITAL,
    DEFAULT_WARMUP_BARS,
};
use crate::domain::config_validation::{validate_config, validate_regime};
use crate::domain::decision::{DecisionResult, ScoreInputs, score};
use crate::domain::diversity::{DiversityReport, WINDOW_DAYS, diversity};
use crate::domain::error::TickerscopeError;
use crate::domain::frame::compute_indicators;
use crate::domain::fundamentals::{FinancialStatementSeries, FundamentalSnapshot};
use crate::domain::monte_carlo::{MonteCarloConfig, MonteCarloResult, simulate_future_with_rng};
use crate::domain::narrative::{Takeaways, takeaways};
use crate::domain::ohlcv::PriceBar;
use crate::domain::patterns::{PatternMatch, detect_patterns};
use crate::domain::performance::{TrailingReturns, trailing_cagr_3y, trailing_returns};
use crate::domain::profile::Profile;
use crate::domain::quant_dna::{QuantDna, quant_dna};
use crate::domain::regime::MarketRegime;
use crate::domain::roce::{CapitalEfficiency, capital_efficiency};
use crate::domain::screener::{
    DEFAULT_LOOKBACK_DAYS, MIN_SCREEN_BARS, ScreenOutcome, ScreenRequest, SkipReason,
    parse_tickers, screen_universe,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{FundamentalsPort, PriceHistoryPort};
use crate::ports::regime_port::RegimePort;

pub const DEFAULT_PRICES_DIR: &str = "data/prices";
pub const DEFAULT_FUNDAMENTALS_DIR: &str = "data/fundamentals";
/// Calendar days of history loaded for single-ticker commands.
pub const HISTORY_DAYS: i64 = 5 * 365 + 7;
pub const PATTERN_DAYS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "tickerscope", about = "Stock decision and simulation engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Last date of history to use (YYYY-MM-DD, default today)
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score one ticker and explain the decision
    Score {
        ticker: String,
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(long)]
        market: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Replay the decision engine over a ticker's history
    Backtest {
        ticker: String,
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Fixed 3y CAGR (%) for every decision instead of the trailing one
        #[arg(long, allow_hyphen_values = true)]
        cagr: Option<f64>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Project price percentiles with a Monte Carlo simulation
    Simulate {
        ticker: String,
        #[arg(long)]
        days: Option<usize>,
        #[arg(long)]
        paths: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Return on capital employed from financial statements
    Roce {
        ticker: String,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Return correlation and diversity score across tickers
    Diversity {
        /// Comma-separated tickers
        #[arg(long)]
        tickers: String,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Score a universe of tickers in parallel
    Screen {
        /// Comma-separated tickers (default: every ticker with a price file)
        #[arg(long)]
        tickers: Option<String>,
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        concurrency: Option<usize>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write the indicator frame for a ticker as CSV
    Indicators {
        ticker: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Score {
            ticker,
            profile,
            market,
            common,
        } => run_score(&ticker, profile.as_deref(), market.as_deref(), &common),
        Command::Backtest {
            ticker,
            profile,
            start,
            cagr,
            common,
        } => run_backtest(&ticker, profile.as_deref(), start, cagr, &common),
        Command::Simulate {
            ticker,
            days,
            paths,
            seed,
            common,
        } => run_simulate(&ticker, days, paths, seed, &common),
        Command::Roce { ticker, common } => run_roce(&ticker, &common),
        Command::Diversity { tickers, common } => run_diversity(&tickers, &common),
        Command::Screen {
            tickers,
            profile,
            market,
            concurrency,
            common,
        } => run_screen(
            tickers.as_deref(),
            profile.as_deref(),
            market.as_deref(),
            concurrency,
            &common,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Indicators {
            ticker,
            output,
            config,
            end,
        } => run_indicators(&ticker, output.as_deref(), config.as_deref(), end),
    };
    finish(result)
}

fn finish(result: Result<(), TickerscopeError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

/// Load and validate the configuration. Without a path every setting takes
/// its default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, TickerscopeError> {
    let adapter = match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| TickerscopeError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => FileConfigAdapter::from_string("").map_err(|reason| {
            TickerscopeError::ConfigParse {
                file: "<defaults>".to_string(),
                reason,
            }
        })?,
    };
    validate_all(&adapter)?;
    Ok(adapter)
}

/// Global checks plus every `[regime.<market>]` section.
pub fn validate_all(adapter: &FileConfigAdapter) -> Result<(), TickerscopeError> {
    validate_config(adapter)?;
    let prefix = format!("{REGIME_SECTION}.");
    for section in adapter.sections() {
        if section.starts_with(&prefix) {
            validate_regime(adapter, &section)?;
        }
    }
    Ok(())
}

/// `--profile` wins over `[engine] profile`; the default is Trader.
pub fn resolve_profile(flag: Option<&str>, config: &dyn ConfigPort) -> Result<Profile, TickerscopeError> {
    match flag.map(str::to_string).or_else(|| config.get_string("engine", "profile")) {
        Some(raw) => raw.parse::<Profile>().map_err(|e| TickerscopeError::ConfigInvalid {
            section: "engine".into(),
            key: "profile".into(),
            reason: e.to_string(),
        }),
        None => Ok(Profile::default()),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    let warmup = config.get_int("engine", "warmup_bars", DEFAULT_WARMUP_BARS as i64);
    BacktestConfig {
        initial_capital: config.get_double("engine", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        warmup_bars: usize::try_from(warmup).unwrap_or(DEFAULT_WARMUP_BARS),
        cagr: config
            .get_string("engine", "backtest_cagr")
            .and_then(|raw| raw.trim().parse().ok()),
    }
}

/// Flags override `[monte_carlo] days` and `paths`.
pub fn build_monte_carlo_config(
    config: &dyn ConfigPort,
    days: Option<usize>,
    paths: Option<usize>,
) -> MonteCarloConfig {
    let defaults = MonteCarloConfig::default();
    let read = |key: &str, fallback: usize| {
        usize::try_from(config.get_int("monte_carlo", key, fallback as i64)).unwrap_or(fallback)
    };
    MonteCarloConfig {
        horizon_days: days.unwrap_or_else(|| read("days", defaults.horizon_days)),
        paths: paths.unwrap_or_else(|| read("paths", defaults.paths)),
    }
}

pub fn resolve_seed(flag: Option<u64>, config: &dyn ConfigPort) -> Option<u64> {
    flag.or_else(|| {
        config
            .get_string("monte_carlo", "seed")
            .and_then(|s| s.trim().parse().ok())
    })
}

pub fn build_screen_request(
    config: &dyn ConfigPort,
    end: NaiveDate,
    profile: Profile,
    regime: Option<MarketRegime>,
) -> ScreenRequest {
    let mut request = ScreenRequest::new(end, profile);
    request.lookback_days = config.get_int("batch", "lookback_days", DEFAULT_LOOKBACK_DAYS);
    request.min_bars = usize::try_from(config.get_int("batch", "min_bars", MIN_SCREEN_BARS as i64))
        .unwrap_or(MIN_SCREEN_BARS);
    request.regime = regime;
    request
}

/// `--concurrency`, then `[batch] concurrency`, then the machine's parallelism.
pub fn resolve_concurrency(flag: Option<usize>, config: &dyn ConfigPort) -> usize {
    let fallback = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    flag.or_else(|| usize::try_from(config.get_int("batch", "concurrency", fallback as i64)).ok())
        .unwrap_or(fallback)
        .max(1)
}

/// `--tickers`, then `[batch] tickers`, then every ticker in the price directory.
pub fn resolve_tickers(
    flag: Option<&str>,
    config: &dyn ConfigPort,
    prices: &CsvAdapter,
) -> Result<Vec<String>, TickerscopeError> {
    let raw = flag.map(str::to_string).or_else(|| config.get_string("batch", "tickers"));
    match raw {
        Some(list) => parse_tickers(&list).map_err(|e| TickerscopeError::ConfigInvalid {
            section: "batch".into(),
            key: "tickers".into(),
            reason: e.to_string(),
        }),
        None => prices.list_tickers(),
    }
}

fn data_dir(config: &dyn ConfigPort, key: &str, default: &str) -> PathBuf {
    PathBuf::from(config.get_string("data", key).unwrap_or_else(|| default.to_string()))
}

pub fn price_adapter(config: &dyn ConfigPort) -> CsvAdapter {
    CsvAdapter::new(data_dir(config, "prices_dir", DEFAULT_PRICES_DIR))
}

pub fn fundamentals_adapter(config: &dyn ConfigPort) -> IniFundamentalsAdapter {
    IniFundamentalsAdapter::new(data_dir(config, "fundamentals_dir", DEFAULT_FUNDAMENTALS_DIR))
}

fn end_date(end: Option<NaiveDate>) -> NaiveDate {
    end.unwrap_or_else(|| Local::now().date_naive())
}

fn fetch_history(
    port: &dyn PriceHistoryPort,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceBar>, TickerscopeError> {
    let ticker = ticker.to_uppercase();
    let bars = port.fetch_prices(&ticker, start, end)?;
    if bars.is_empty() {
        return Err(TickerscopeError::NoData { ticker });
    }
    info!(ticker = %ticker, bars = bars.len(), "loaded price history");
    Ok(bars)
}

fn emit_json<T: Serialize>(value: &T) -> Result<(), TickerscopeError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).map_err(io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}{suffix}"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub ticker: String,
    pub profile: Profile,
    pub as_of: NaiveDate,
    pub close: f64,
    pub regime: MarketRegime,
    pub decision: DecisionResult,
    pub roce: Option<CapitalEfficiency>,
    pub cagr_3y: Option<f64>,
    pub takeaways: Option<Takeaways>,
    pub performance: TrailingReturns,
    pub quant_dna: Option<QuantDna>,
    pub patterns: Vec<PatternMatch>,
}

/// Everything `score` reports for one ticker. `None` when `bars` is empty.
pub fn build_score_report(
    ticker: &str,
    bars: &[PriceBar],
    snapshot: &FundamentalSnapshot,
    statements: &FinancialStatementSeries,
    profile: Profile,
    regime: MarketRegime,
) -> Option<ScoreReport> {
    let frame = compute_indicators(bars);
    let last = frame.last()?;

    let roce = capital_efficiency(statements);
    let cagr_3y = trailing_cagr_3y(bars);
    let inputs = ScoreInputs {
        fundamentals: (!snapshot.is_empty()).then_some(snapshot),
        roce: roce.map(|r| r.current),
        cagr: cagr_3y,
        regime: Some(regime),
    };
    let decision = score(frame.rows(), profile, &inputs);

    Some(ScoreReport {
        ticker: ticker.to_string(),
        profile,
        as_of: last.date(),
        close: last.close(),
        regime,
        roce,
        cagr_3y,
        takeaways: Some(takeaways(last)),
        performance: trailing_returns(bars),
        quant_dna: if snapshot.is_empty() {
            None
        } else {
            quant_dna(snapshot, &frame)
        },
        patterns: detect_patterns(&frame, PATTERN_DAYS),
        decision,
    })
}

fn run_score(
    ticker: &str,
    profile: Option<&str>,
    market: Option<&str>,
    common: &CommonArgs,
) -> Result<(), TickerscopeError> {
    let config = load_config(common.config.as_deref())?;
    let profile = resolve_profile(profile, &config)?;
    let prices = price_adapter(&config);
    let fundamentals = fundamentals_adapter(&config);

    let ticker = ticker.to_uppercase();
    let end = end_date(common.end);
    let bars = fetch_history(&prices, &ticker, end - Duration::days(HISTORY_DAYS), end)?;
    let snapshot = fundamentals.fetch_snapshot(&ticker)?;
    let statements = fundamentals.fetch_statements(&ticker)?;
    let regime = ConfigRegimeAdapter::new(&config).market_regime(market.unwrap_or_default())?;

    let report = build_score_report(&ticker, &bars, &snapshot, &statements, profile, regime)
        .ok_or_else(|| TickerscopeError::NoData {
            ticker: ticker.clone(),
        })?;

    if common.json {
        return emit_json(&report);
    }
    print_score(&report);
    Ok(())
}

fn print_score(report: &ScoreReport) {
    let d = &report.decision;
    println!(
        "{} ({}) as of {}  close {:.2}",
        report.ticker, report.profile, report.as_of, report.close
    );
    println!("Decision:   {} ({})", d.decision, d.archetype);
    println!("Score:      {}/100", d.score);
    println!("Framework:  {:?}", d.framework);
    println!("Regime:     {} ({:+})", report.regime.status, report.regime.score_impact);
    println!(
        "Factors:    quality {} / value {} / growth {} / tech {} / market {}",
        d.factors.quality, d.factors.value, d.factors.growth, d.factors.tech, d.factors.market
    );
    println!(
        "Risk:       stop {}  target {}  ATR {}  RSI {}  volatility {:?}",
        fmt_opt(d.stop, ""),
        fmt_opt(d.target, ""),
        fmt_opt(d.atr, ""),
        fmt_opt(d.rsi, ""),
        d.volatility
    );
    println!("Trend:      {} / {}  ({})", d.short_trend, d.long_trend, d.entry_hint);

    if !d.bullets.is_empty() {
        println!("\nWhy:");
        for bullet in &d.bullets {
            println!("  - {bullet}");
        }
    }
    for pro in &d.pros {
        println!("  + {pro}");
    }
    for con in &d.cons {
        println!("  ! {con}");
    }

    if let Some(t) = &report.takeaways {
        println!("\nShort term:  {}", t.short);
        println!("Medium term: {}", t.medium);
        println!("Long term:   {}", t.long);
    }

    let p = &report.performance;
    println!(
        "\nReturns:    1w {}  1m {}  1y {}  3y {}  5y {}",
        fmt_opt(p.w1, "%"),
        fmt_opt(p.m1, "%"),
        fmt_opt(p.y1, "%"),
        fmt_opt(p.y3, "%"),
        fmt_opt(p.y5, "%")
    );
    println!("3y CAGR:    {}", fmt_opt(report.cagr_3y, "%"));
    if let Some(roce) = &report.roce {
        println!("ROCE:       {roce}");
    }
    if let Some(dna) = &report.quant_dna {
        println!(
            "Quant DNA:  value {} / momentum {} / quality {} / stability {}",
            dna.value, dna.momentum, dna.quality, dna.stability
        );
    }
    if !report.patterns.is_empty() {
        println!("\nPatterns:");
        for m in &report.patterns {
            println!("  {}  {:<18} {}", m.date, m.pattern, m.meaning);
        }
    }
}

fn run_backtest(
    ticker: &str,
    profile: Option<&str>,
    start: Option<NaiveDate>,
    cagr: Option<f64>,
    common: &CommonArgs,
) -> Result<(), TickerscopeError> {
    let config = load_config(common.config.as_deref())?;
    let profile = resolve_profile(profile, &config)?;
    let mut bt_config = build_backtest_config(&config);
    if cagr.is_some() {
        bt_config.cagr = cagr;
    }
    let prices = price_adapter(&config);

    let bars = fetch_history(&prices, ticker, start.unwrap_or(NaiveDate::MIN), end_date(common.end))?;
    let frame = compute_indicators(&bars);
    let result = backtest_engine::run_backtest(&frame, profile, &bt_config);

    if common.json {
        return emit_json(&result);
    }
    print_backtest(&ticker.to_uppercase(), profile, &result);
    Ok(())
}

fn print_backtest(ticker: &str, profile: Profile, result: &BacktestResult) {
    println!("{ticker} backtest ({profile})");
    println!("Initial capital: {:.2}", result.initial_capital);
    println!("Final capital:   {:.2}", result.final_capital);
    println!("Return:          {:.2}%", result.return_pct);
    println!("Trades logged:   {}", result.total_trades);
    println!("Win rate:        {:.1}%", result.win_rate * 100.0);
    println!("Max drawdown:    {:.2}%", result.max_drawdown * 100.0);
    if result.stats.profit_factor.is_finite() {
        println!("Profit factor:   {:.2}", result.stats.profit_factor);
    }
    if result.open_at_end {
        println!("Position open at end, marked to market.");
    }
    if !result.trades.is_empty() {
        println!();
        for t in &result.trades {
            let profit = t.profit.map(|p| format!("{p:+.2}")).unwrap_or_default();
            println!(
                "  {}  {:<4} {:>10.2} x {:<10.4} {:<12} {}",
                t.date, t.side, t.price, t.shares, t.reason, profit
            );
        }
    }
}

fn run_simulate(
    ticker: &str,
    days: Option<usize>,
    paths: Option<usize>,
    seed: Option<u64>,
    common: &CommonArgs,
) -> Result<(), TickerscopeError> {
    let config = load_config(common.config.as_deref())?;
    let mc_config = build_monte_carlo_config(&config, days, paths);
    let prices = price_adapter(&config);
    let end = end_date(common.end);
    let bars = fetch_history(&prices, ticker, end - Duration::days(HISTORY_DAYS), end)?;

    let mut rng = match resolve_seed(seed, &config) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let Some(sim) = simulate_future_with_rng(&bars, &mc_config, &mut rng) else {
        return Err(TickerscopeError::InsufficientData {
            ticker: ticker.to_uppercase(),
            bars: bars.len(),
            minimum: crate::domain::monte_carlo::MIN_HISTORY,
        });
    };

    if common.json {
        return emit_json(&sim);
    }
    print_simulation(&ticker.to_uppercase(), &mc_config, &sim);
    Ok(())
}

fn print_simulation(ticker: &str, config: &MonteCarloConfig, sim: &MonteCarloResult) {
    println!(
        "{ticker}: {} paths over {} days from {:.2} on {}",
        config.paths, config.horizon_days, sim.anchor_price, sim.anchor_date
    );
    println!("Daily drift {:.5}, volatility {:.5}", sim.drift, sim.sigma);
    let last = |series: &[f64]| series.last().copied().unwrap_or(sim.anchor_price);
    println!("Price on {}:", sim.end_date);
    println!("  p05 (bear) {:.2}", last(&sim.p05));
    println!("  p50 (base) {:.2}", last(&sim.p50));
    println!("  p95 (bull) {:.2}", last(&sim.p95));
    println!("Probability of loss: {:.1}%", sim.probability_of_loss * 100.0);
}

fn run_roce(ticker: &str, common: &CommonArgs) -> Result<(), TickerscopeError> {
    let config = load_config(common.config.as_deref())?;
    let ticker = ticker.to_uppercase();
    let statements = fundamentals_adapter(&config).fetch_statements(&ticker)?;
    let roce = capital_efficiency(&statements);

    if common.json {
        return emit_json(&roce);
    }
    match roce {
        Some(r) => println!("{ticker} ROCE: {r}"),
        None => println!("{ticker} ROCE: n/a"),
    }
    Ok(())
}

fn run_diversity(tickers: &str, common: &CommonArgs) -> Result<(), TickerscopeError> {
    let config = load_config(common.config.as_deref())?;
    let tickers = parse_tickers(tickers).map_err(|e| TickerscopeError::ConfigInvalid {
        section: "cli".into(),
        key: "tickers".into(),
        reason: e.to_string(),
    })?;
    let prices = price_adapter(&config);
    let end = end_date(common.end);
    let start = end - Duration::days(WINDOW_DAYS + 7);

    let mut series = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let bars = prices.fetch_prices(&ticker, start, end)?;
        series.push((ticker, bars));
    }
    let report = diversity(&series);

    if common.json {
        return emit_json(&report);
    }
    print_diversity(&report);
    Ok(())
}

fn print_diversity(report: &DiversityReport) {
    match report {
        DiversityReport::InsufficientInstruments { got } => {
            println!("Need at least two tickers, got {got}.");
        }
        DiversityReport::InsufficientOverlap { observations } => {
            println!(
                "Not enough shared price history to correlate ({observations} common returns)."
            );
        }
        DiversityReport::Analyzed(result) => {
            print!("{:>10}", "");
            for t in &result.tickers {
                print!("{t:>10}");
            }
            println!();
            for (t, row) in result.tickers.iter().zip(&result.matrix) {
                print!("{t:>10}");
                for v in row {
                    if v.is_finite() {
                        print!("{v:>10.2}");
                    } else {
                        print!("{:>10}", "n/a");
                    }
                }
                println!();
            }
            println!(
                "\nDiversity score: {:.1}/100 over {} shared days",
                result.diversity_score, result.observations
            );
        }
    }
}

fn run_screen(
    tickers: Option<&str>,
    profile: Option<&str>,
    market: Option<&str>,
    concurrency: Option<usize>,
    common: &CommonArgs,
) -> Result<(), TickerscopeError> {
    let config = load_config(common.config.as_deref())?;
    let profile = resolve_profile(profile, &config)?;
    let prices = price_adapter(&config);
    let tickers = resolve_tickers(tickers, &config, &prices)?;
    let concurrency = resolve_concurrency(concurrency, &config);
    let end = end_date(common.end);
    let regime = ConfigRegimeAdapter::new(&config).market_regime(market.unwrap_or_default())?;
    let request = build_screen_request(&config, end, profile, Some(regime));

    info!(tickers = tickers.len(), concurrency, "screening universe");
    let outcomes = screen_universe(&prices, &tickers, &request, concurrency);

    if common.json {
        return emit_json(&outcomes);
    }
    print_screen(&outcomes);
    Ok(())
}

fn print_screen(outcomes: &[ScreenOutcome]) {
    println!(
        "{:<10} {:<10} {:>5} {:>10} {:>8} {:>8}  {}",
        "TICKER", "DECISION", "SCORE", "CLOSE", "CHG%", "vsMA20", "ARCHETYPE"
    );
    for outcome in outcomes {
        match outcome {
            ScreenOutcome::Scored(row) => println!(
                "{:<10} {:<10} {:>5} {:>10.2} {:>8} {:>8}  {}",
                row.ticker,
                row.decision.decision.to_string(),
                row.decision.score,
                row.last_close,
                fmt_opt(row.change_pct, ""),
                fmt_opt(row.dist_ma20_pct, ""),
                row.decision.archetype
            ),
            ScreenOutcome::Skipped { ticker, reason } => match reason {
                SkipReason::NoData => println!("{ticker:<10} skipped: no data"),
                SkipReason::InsufficientBars { bars, minimum } => {
                    println!("{ticker:<10} skipped: {bars} bars, need {minimum}")
                }
            },
            ScreenOutcome::Failed { ticker, reason } => println!("{ticker:<10} failed: {reason}"),
        }
    }
}

fn run_validate(config_path: &Path) -> Result<(), TickerscopeError> {
    eprintln!("Validating config: {}", config_path.display());
    load_config(Some(config_path))?;
    eprintln!("Configuration is valid.");
    Ok(())
}

fn run_indicators(
    ticker: &str,
    output: Option<&Path>,
    config_path: Option<&Path>,
    end: Option<NaiveDate>,
) -> Result<(), TickerscopeError> {
    let config = load_config(config_path)?;
    let prices = price_adapter(&config);
    let bars = fetch_history(&prices, ticker, NaiveDate::MIN, end_date(end))?;
    let frame = compute_indicators(&bars);

    match output {
        Some(path) => {
            let file = File::create(path)?;
            write_frame(&frame, BufWriter::new(file))?;
            eprintln!("Wrote {} rows to {}", frame.len(), path.display());
        }
        None => write_frame(&frame, io::stdout().lock())?,
    }
    Ok(())
}
