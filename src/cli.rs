//! CLI definition and dispatch.

use chrono::{Months, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    optional_f64, parse_date, validate_market_config, validate_risk_config,
    validate_simulation_config, validate_storage_config,
};
use crate::domain::engine::{self, SimulationResult};
use crate::domain::error::NisaError;
use crate::domain::growth::{self, GrowthEstimate};
use crate::domain::plan::{
    Compounding, ContributionLimits, ContributionPlan, GrowthAssumption, LifetimeCap,
    MONTHS_PER_YEAR, NISA_LIFETIME_CAP,
};
use crate::domain::price_series::{convert_currency, resample_month_end};
use crate::domain::record::NewRecord;
use crate::domain::risk::{self, RiskBand, RiskConfig, DEFAULT_SIMULATIONS};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::store_port::StorePort;

/// Price history window used when `[market]` gives no dates.
const DEFAULT_HISTORY_MONTHS: u32 = 120;

#[derive(Parser, Debug)]
#[command(name = "nisasim", about = "NISA investment growth simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Values that override the `[simulation]` section of the config file.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct PlanOverrides {
    /// Monthly contribution in yen
    #[arg(long)]
    pub monthly: Option<f64>,
    /// Investment horizon in years
    #[arg(long)]
    pub years: Option<u32>,
    /// Assumed annual rate of return (0.05 = 5%)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<f64>,
    /// Derive the rate from this symbol's price history
    #[arg(long)]
    pub symbol: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a deterministic growth simulation
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: PlanOverrides,
        /// Write the period series as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Store the result in the configured backend
        #[arg(long)]
        save: bool,
        #[arg(long)]
        label: Option<String>,
    },
    /// Run the Monte Carlo risk band
    Risk {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: PlanOverrides,
        /// Annual volatility (0.15 = 15%)
        #[arg(long)]
        volatility: Option<f64>,
        #[arg(long)]
        simulations: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Write the yearly band as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Estimate growth rate and volatility from price history
    Growth {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List recently stored simulations, newest first
    History {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Load a CSV price file into the SQLite prices table
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        /// Price file to load; defaults to `<data_dir>/<symbol>.csv`
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            overrides,
            output,
            save,
            label,
        } => run_simulate(&config, &overrides, output.as_deref(), save, label),
        Command::Risk {
            config,
            overrides,
            volatility,
            simulations,
            seed,
            output,
        } => {
            let risk_overrides = RiskOverrides {
                volatility,
                simulations,
                seed,
            };
            run_risk(&config, &overrides, &risk_overrides, output.as_deref())
        }
        Command::Growth { config, symbol } => run_growth(&config, symbol.as_deref()),
        Command::History { config, limit } => run_history(&config, limit),
        Command::Validate { config } => run_validate(&config),
        Command::Import {
            config,
            symbol,
            file,
        } => run_import(&config, &symbol, file.as_deref()),
    }
}

fn report_error(err: &NisaError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, NisaError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

pub fn apply_overrides(config: &mut FileConfigAdapter, overrides: &PlanOverrides) {
    if let Some(monthly) = overrides.monthly {
        config.set("simulation", "monthly_contribution", monthly.to_string());
    }
    if let Some(years) = overrides.years {
        config.set("simulation", "years", years.to_string());
    }
    if let Some(rate) = overrides.rate {
        config.set("simulation", "annual_rate", rate.to_string());
    }
    if let Some(symbol) = &overrides.symbol {
        config.set("market", "symbol", symbol.clone());
        // An explicit symbol asks for a derived rate.
        if overrides.rate.is_none() {
            config.set("simulation", "annual_rate", "");
        }
    }
}

pub fn build_plan(config: &dyn ConfigPort) -> Result<ContributionPlan, NisaError> {
    let monthly = optional_f64(config, "simulation", "monthly_contribution")?.ok_or_else(|| {
        NisaError::ConfigMissing {
            section: "simulation".into(),
            key: "monthly_contribution".into(),
        }
    })?;
    let years = config.get_int("simulation", "years", 0);
    let periods_per_year = config.get_int("simulation", "periods_per_year", MONTHS_PER_YEAR as i64);

    if years < 1 {
        return Err(NisaError::ConfigInvalid {
            section: "simulation".into(),
            key: "years".into(),
            reason: "years must be at least 1".into(),
        });
    }
    if periods_per_year < 1 {
        return Err(NisaError::ConfigInvalid {
            section: "simulation".into(),
            key: "periods_per_year".into(),
            reason: "periods_per_year must be at least 1".into(),
        });
    }

    // The contribution is configured per month; rescale to the period length.
    let per_period = monthly * MONTHS_PER_YEAR as f64 / periods_per_year as f64;
    Ok(ContributionPlan::level(
        per_period,
        years as u32,
        periods_per_year as u32,
    ))
}

pub fn build_limits(config: &dyn ConfigPort) -> Result<ContributionLimits, NisaError> {
    let lifetime =
        optional_f64(config, "simulation", "lifetime_cap")?.unwrap_or(NISA_LIFETIME_CAP);
    let annual = optional_f64(config, "simulation", "annual_cap")?;
    Ok(ContributionLimits {
        lifetime: LifetimeCap(lifetime),
        annual,
    })
}

pub fn build_compounding(config: &dyn ConfigPort) -> Result<Compounding, NisaError> {
    match config.get_string("simulation", "compounding") {
        None => Ok(Compounding::default()),
        Some(s) => s.parse().map_err(|reason| NisaError::ConfigInvalid {
            section: "simulation".into(),
            key: "compounding".into(),
            reason,
        }),
    }
}

/// Price window from `[market]`, defaulting to the last ten years.
pub fn build_market_window(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), NisaError> {
    let end = parse_date(
        config.get_string("market", "end_date").as_deref(),
        "market",
        "end_date",
    )?
    .unwrap_or_else(|| Utc::now().date_naive());
    let start = parse_date(
        config.get_string("market", "start_date").as_deref(),
        "market",
        "start_date",
    )?
    .or_else(|| end.checked_sub_months(Months::new(DEFAULT_HISTORY_MONTHS)))
    .unwrap_or(NaiveDate::MIN);
    Ok((start, end))
}

pub fn build_risk_config(
    config: &dyn ConfigPort,
    estimate: Option<&GrowthEstimate>,
) -> Result<RiskConfig, NisaError> {
    let annual_volatility = match optional_f64(config, "risk", "annual_volatility")? {
        Some(v) => v,
        None => estimate
            .map(|e| e.annual_volatility)
            .ok_or_else(|| NisaError::ConfigMissing {
                section: "risk".into(),
                key: "annual_volatility".into(),
            })?,
    };
    let simulations = config.get_int("risk", "simulations", DEFAULT_SIMULATIONS as i64);
    let seed = match config.get_string("risk", "seed") {
        None => None,
        Some(s) => Some(s.trim().parse::<u64>().map_err(|_| NisaError::ConfigInvalid {
            section: "risk".into(),
            key: "seed".into(),
            reason: "seed must be a non-negative integer".into(),
        })?),
    };
    Ok(RiskConfig {
        simulations: simulations.max(0) as usize,
        annual_volatility,
        seed,
    })
}

/// Loads the configured symbol, converts it with `fx_symbol` when set, and
/// estimates monthly-sampled CAGR and volatility.
pub fn estimate_growth(
    market: &dyn MarketDataPort,
    config: &dyn ConfigPort,
) -> Result<GrowthEstimate, NisaError> {
    let symbol = config
        .get_string("market", "symbol")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| NisaError::ConfigMissing {
            section: "market".into(),
            key: "symbol".into(),
        })?;
    let (start, end) = build_market_window(config)?;

    eprintln!("Loading prices for {} ({} to {})", symbol, start, end);
    let mut prices = market.fetch_prices(&symbol, start, end)?;

    if let Some(fx_symbol) = config
        .get_string("market", "fx_symbol")
        .filter(|s| !s.trim().is_empty())
    {
        eprintln!("Converting with {}", fx_symbol);
        let fx = market.fetch_prices(&fx_symbol, start, end)?;
        prices = convert_currency(&prices, &fx);
    }

    let monthly = resample_month_end(&prices);
    log::info!(
        "{}: {} observations, {} month-end points",
        symbol,
        prices.len(),
        monthly.len()
    );
    growth::estimate(&monthly, MONTHS_PER_YEAR)
}

/// The configured rate, or one estimated from market data when none is set.
pub fn resolve_growth(
    config: &dyn ConfigPort,
    market: Option<&dyn MarketDataPort>,
) -> Result<(GrowthAssumption, Option<GrowthEstimate>), NisaError> {
    let compounding = build_compounding(config)?;
    if let Some(rate) = optional_f64(config, "simulation", "annual_rate")? {
        return Ok((
            GrowthAssumption {
                annual_rate: rate,
                compounding,
            },
            None,
        ));
    }

    let market = market.ok_or_else(|| NisaError::ConfigMissing {
        section: "simulation".into(),
        key: "annual_rate".into(),
    })?;
    let estimate = estimate_growth(market, config)?;
    Ok((
        GrowthAssumption {
            annual_rate: estimate.cagr,
            compounding,
        },
        Some(estimate),
    ))
}

pub fn open_market(config: &dyn ConfigPort) -> Result<Box<dyn MarketDataPort>, NisaError> {
    let source = config
        .get_string("market", "source")
        .unwrap_or_else(|| "csv".to_string())
        .to_lowercase();
    match source.as_str() {
        "csv" => Ok(Box::new(CsvAdapter::from_config(config)?)),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Box::new(
            crate::adapters::sqlite_adapter::SqliteAdapter::from_config(config)?,
        )),
        other => Err(NisaError::ConfigInvalid {
            section: "market".into(),
            key: "source".into(),
            reason: format!("source '{}' is not available in this build", other),
        }),
    }
}

pub fn open_store(config: &dyn ConfigPort) -> Result<Option<Box<dyn StorePort>>, NisaError> {
    let backend = config
        .get_string("storage", "backend")
        .unwrap_or_else(|| "none".to_string())
        .to_lowercase();
    match backend.as_str() {
        "none" => Ok(None),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Some(Box::new(
            crate::adapters::sqlite_adapter::SqliteAdapter::from_config(config)?,
        ))),
        #[cfg(feature = "postgres")]
        "postgres" => Ok(Some(Box::new(
            crate::adapters::postgres_adapter::PostgresAdapter::from_config(config)?,
        ))),
        other => Err(NisaError::ConfigInvalid {
            section: "storage".into(),
            key: "backend".into(),
            reason: format!("backend '{}' is not available in this build", other),
        }),
    }
}

fn needs_market(config: &dyn ConfigPort) -> bool {
    config
        .get_string("market", "symbol")
        .is_some_and(|s| !s.trim().is_empty())
}

/// What a simulate run produced.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub plan: ContributionPlan,
    pub rate: GrowthAssumption,
    pub limits: ContributionLimits,
    pub estimate: Option<GrowthEstimate>,
    pub result: SimulationResult,
    pub record_id: Option<i64>,
}

pub fn run_simulation_pipeline(
    config: &dyn ConfigPort,
    market: Option<&dyn MarketDataPort>,
    store: Option<&dyn StorePort>,
    report: &dyn ReportPort,
    output_path: Option<&Path>,
    label: Option<String>,
) -> Result<SimulationOutcome, NisaError> {
    let plan = build_plan(config)?;
    let limits = build_limits(config)?;
    let (rate, estimate) = resolve_growth(config, market)?;

    eprintln!(
        "Simulating {} periods at {:.2}% ({}), cap {:.0}",
        plan.len(),
        rate.annual_rate * 100.0,
        rate.compounding,
        limits.lifetime.amount()
    );
    let result = engine::simulate_with_limits(&plan, &rate, &limits)?;

    if let Some(path) = output_path {
        report.write(&result, path)?;
        eprintln!("Series written to: {}", path.display());
    }

    let record_id = match store {
        Some(store) => {
            let record = NewRecord::now(label, plan.clone(), rate, limits, result.clone());
            let id = store.append(&record)?;
            eprintln!("Saved simulation #{}", id);
            Some(id)
        }
        None => None,
    };

    Ok(SimulationOutcome {
        plan,
        rate,
        limits,
        estimate,
        result,
        record_id,
    })
}

pub fn run_risk_pipeline(
    config: &dyn ConfigPort,
    market: Option<&dyn MarketDataPort>,
    report: &dyn ReportPort,
    output_path: Option<&Path>,
) -> Result<Vec<RiskBand>, NisaError> {
    let plan = build_plan(config)?;
    let limits = build_limits(config)?;
    let (rate, mut estimate) = resolve_growth(config, market)?;

    if estimate.is_none() && optional_f64(config, "risk", "annual_volatility")?.is_none() {
        if let Some(market) = market {
            estimate = Some(estimate_growth(market, config)?);
        }
    }
    let risk_config = build_risk_config(config, estimate.as_ref())?;

    eprintln!(
        "Running {} paths at {:.2}% +/- {:.2}%",
        risk_config.simulations,
        rate.annual_rate * 100.0,
        risk_config.annual_volatility * 100.0
    );
    let bands = risk::run_risk(&plan, &rate, &limits, &risk_config)?;

    if let Some(path) = output_path {
        report.write_risk(&bands, path)?;
        eprintln!("Risk band written to: {}", path.display());
    }
    Ok(bands)
}

fn print_outcome(outcome: &SimulationOutcome) {
    if let Some(est) = &outcome.estimate {
        eprintln!(
            "Estimated CAGR {:.2}%, volatility {:.2}% from {} points",
            est.cagr * 100.0,
            est.annual_volatility * 100.0,
            est.observations
        );
    }

    println!("year,principal,market_value");
    for s in outcome.result.yearly() {
        let year = s.period / outcome.result.periods_per_year.max(1) as usize;
        println!("{},{:.0},{:.0}", year, s.principal, s.market_value);
    }

    if let Some(last) = outcome.result.final_snapshot() {
        eprintln!("\n=== Result ===");
        eprintln!("Principal:     {:.0}", last.principal);
        eprintln!("Market value:  {:.0}", last.market_value);
        eprintln!("Gain:          {:.0}", outcome.result.total_gain());
    }
}

fn run_simulate(
    config_path: &Path,
    overrides: &PlanOverrides,
    output_path: Option<&Path>,
    save: bool,
    label: Option<String>,
) -> ExitCode {
    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    apply_overrides(&mut config, overrides);

    if let Err(e) = validate_simulation_config(&config)
        .and_then(|_| validate_market_config(&config))
        .and_then(|_| validate_storage_config(&config))
    {
        return report_error(&e);
    }

    let market = if needs_market(&config) {
        match open_market(&config) {
            Ok(m) => Some(m),
            Err(e) => return report_error(&e),
        }
    } else {
        None
    };

    let save = save || config.get_bool("storage", "save", false);
    let store = if save {
        match open_store(&config) {
            Ok(Some(s)) => Some(s),
            Ok(None) => {
                log::warn!("saving requested but [storage] backend is none");
                None
            }
            Err(e) => return report_error(&e),
        }
    } else {
        None
    };

    let output = output_path.map(Path::to_path_buf).or_else(|| {
        config
            .get_string("report", "output")
            .map(PathBuf::from)
    });

    match run_simulation_pipeline(
        &config,
        market.as_deref(),
        store.as_deref(),
        &CsvReportAdapter::new(),
        output.as_deref(),
        label,
    ) {
        Ok(outcome) => {
            print_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

/// Values that override the `[risk]` section of the config file.
#[derive(Debug, Default, Clone, Copy)]
pub struct RiskOverrides {
    pub volatility: Option<f64>,
    pub simulations: Option<usize>,
    pub seed: Option<u64>,
}

fn run_risk(
    config_path: &Path,
    overrides: &PlanOverrides,
    risk_overrides: &RiskOverrides,
    output_path: Option<&Path>,
) -> ExitCode {
    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    apply_overrides(&mut config, overrides);
    if let Some(v) = risk_overrides.volatility {
        config.set("risk", "annual_volatility", v.to_string());
    }
    if let Some(n) = risk_overrides.simulations {
        config.set("risk", "simulations", n.to_string());
    }
    if let Some(seed) = risk_overrides.seed {
        config.set("risk", "seed", seed.to_string());
    }

    if let Err(e) = validate_simulation_config(&config)
        .and_then(|_| validate_market_config(&config))
        .and_then(|_| validate_risk_config(&config))
    {
        return report_error(&e);
    }

    let market = if needs_market(&config) {
        match open_market(&config) {
            Ok(m) => Some(m),
            Err(e) => return report_error(&e),
        }
    } else {
        None
    };

    match run_risk_pipeline(
        &config,
        market.as_deref(),
        &CsvReportAdapter::new(),
        output_path,
    ) {
        Ok(bands) => {
            println!("year,mean,upper_5,lower_5,principal");
            for b in &bands {
                println!(
                    "{},{:.0},{:.0},{:.0},{:.0}",
                    b.year, b.mean, b.upper_5, b.lower_5, b.principal
                );
            }
            if let Some(last) = bands.last() {
                eprintln!(
                    "\nAfter {} years the average outcome is {:.0}; the pessimistic 5% case is {:.0}",
                    last.year, last.mean, last.lower_5
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_growth(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    if let Some(s) = symbol {
        config.set("market", "symbol", s);
    }
    if !needs_market(&config) {
        return report_error(&NisaError::ConfigMissing {
            section: "market".into(),
            key: "symbol".into(),
        });
    }
    if let Err(e) = validate_market_config(&config) {
        return report_error(&e);
    }

    let result = open_market(&config).and_then(|market| estimate_growth(market.as_ref(), &config));
    match result {
        Ok(est) => {
            println!("cagr,annual_volatility,observations");
            println!(
                "{:.6},{:.6},{}",
                est.cagr, est.annual_volatility, est.observations
            );
            eprintln!(
                "CAGR {:.2}%, volatility {:.2}%",
                est.cagr * 100.0,
                est.annual_volatility * 100.0
            );
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_history(config_path: &Path, limit: usize) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    if let Err(e) = validate_storage_config(&config) {
        return report_error(&e);
    }

    let store = match open_store(&config) {
        Ok(Some(s)) => s,
        Ok(None) => {
            return report_error(&NisaError::ConfigMissing {
                section: "storage".into(),
                key: "backend".into(),
            });
        }
        Err(e) => return report_error(&e),
    };

    match store.recent(limit) {
        Ok(records) => {
            if records.is_empty() {
                eprintln!("No stored simulations");
            }
            println!("id,created_at,label,annual_rate,periods,principal,market_value");
            for r in &records {
                println!(
                    "{},{},{},{:.4},{},{:.0},{:.0}",
                    r.id,
                    r.created_at.format("%Y-%m-%d %H:%M:%S"),
                    r.label.as_deref().unwrap_or(""),
                    r.rate.annual_rate,
                    r.plan.len(),
                    r.final_principal(),
                    r.final_value()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

pub fn validate_all(config: &dyn ConfigPort) -> Result<(), NisaError> {
    validate_simulation_config(config)?;
    validate_market_config(config)?;
    validate_storage_config(config)?;
    if config.get_string("risk", "annual_volatility").is_some()
        || config.get_string("risk", "simulations").is_some()
    {
        validate_risk_config(config)?;
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    if let Err(e) = validate_all(&config) {
        return report_error(&e);
    }

    match build_plan(&config).and_then(|plan| build_limits(&config).map(|limits| (plan, limits))) {
        Ok((plan, limits)) => {
            eprintln!("\nPlan:");
            eprintln!("  periods:        {}", plan.len());
            eprintln!("  per period:     {:.0}", plan.amounts().first().copied().unwrap_or(0.0));
            eprintln!("  nominal total:  {:.0}", plan.nominal_total());
            eprintln!("  lifetime cap:   {:.0}", limits.lifetime.amount());
            if let Some(annual) = limits.annual {
                eprintln!("  annual cap:     {:.0}", annual);
            }
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

/// Reads a CSV price series and stores it under `symbol` in the `[sqlite]`
/// database, so `[market] source = sqlite` has data to serve.
pub fn import_prices(
    config: &dyn ConfigPort,
    symbol: &str,
    file: Option<&Path>,
) -> Result<usize, NisaError> {
    let prices = match file {
        Some(path) => CsvAdapter::read_file(path)?,
        None => CsvAdapter::from_config(config)?.fetch_prices(
            symbol,
            NaiveDate::MIN,
            NaiveDate::MAX,
        )?,
    };
    if prices.is_empty() {
        return Err(NisaError::NoData {
            symbol: symbol.to_string(),
        });
    }

    #[cfg(feature = "sqlite")]
    {
        let db = crate::adapters::sqlite_adapter::SqliteAdapter::from_config(config)?;
        db.insert_prices(symbol, &prices)?;
        Ok(prices.len())
    }
    #[cfg(not(feature = "sqlite"))]
    {
        Err(NisaError::ConfigInvalid {
            section: "sqlite".into(),
            key: "path".into(),
            reason: "this build has no sqlite support".into(),
        })
    }
}

fn run_import(config_path: &Path, symbol: &str, file: Option<&Path>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };

    match import_prices(&config, symbol, file) {
        Ok(count) => {
            eprintln!("Imported {} prices for {}", count, symbol);
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}
