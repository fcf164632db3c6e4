//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_plan, build_limits, build_risk_config, build_market_window)
//! - Command-line overrides applied onto the loaded config
//! - Simulate and risk pipelines with mock ports
//! - Full commands against real INI and CSV files on disk

mod common;

use approx::assert_relative_eq;
use clap::Parser;
use common::*;
use nisasim::adapters::file_config_adapter::FileConfigAdapter;
use nisasim::cli::{self, Cli, PlanOverrides};
use nisasim::domain::error::NisaError;
use nisasim::domain::growth::GrowthEstimate;
use nisasim::domain::plan::{Compounding, NISA_LIFETIME_CAP};
use nisasim::ports::config_port::ConfigPort;
use nisasim::ports::store_port::StorePort;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn is_success(code: ExitCode) -> bool {
    format!("{:?}", code) == format!("{:?}", ExitCode::SUCCESS)
}

const VALID_INI: &str = r#"
[simulation]
monthly_contribution = 30000
years = 20
annual_rate = 0.05
compounding = nominal

[risk]
simulations = 200
annual_volatility = 0.15
seed = 42

[storage]
backend = none
"#;

const MARKET_INI: &str = r#"
[simulation]
monthly_contribution = 50000
years = 10

[market]
symbol = VOO
source = csv
data_dir = /unused
start_date = 2019-01-01
end_date = 2024-12-31

[risk]
seed = 7
simulations = 100
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_plan_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let plan = cli::build_plan(&adapter).unwrap();

        assert_eq!(plan.len(), 240);
        assert_eq!(plan.periods_per_year(), 12);
        assert!(plan.amounts().iter().all(|&a| a == 30_000.0));
    }

    #[test]
    fn build_plan_rescales_contribution_to_period_length() {
        let ini = r#"
[simulation]
monthly_contribution = 30000
years = 2
periods_per_year = 4
"#;
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let plan = cli::build_plan(&adapter).unwrap();

        assert_eq!(plan.len(), 8);
        assert_relative_eq!(plan.amounts()[0], 90_000.0);
        assert_relative_eq!(plan.nominal_total(), 720_000.0);
    }

    #[test]
    fn build_plan_missing_contribution() {
        let adapter = FileConfigAdapter::from_string("[simulation]\nyears = 5\n").unwrap();
        let result = cli::build_plan(&adapter);
        assert!(
            matches!(result, Err(NisaError::ConfigMissing { ref key, .. }) if key == "monthly_contribution")
        );
    }

    #[test]
    fn build_plan_rejects_zero_years() {
        let ini = "[simulation]\nmonthly_contribution = 1000\nyears = 0\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        assert!(matches!(
            cli::build_plan(&adapter),
            Err(NisaError::ConfigInvalid { ref key, .. }) if key == "years"
        ));
    }

    #[test]
    fn build_limits_defaults_to_lifetime_cap_only() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let limits = cli::build_limits(&adapter).unwrap();
        assert_eq!(limits.lifetime.amount(), NISA_LIFETIME_CAP);
        assert_eq!(limits.annual, None);
    }

    #[test]
    fn build_limits_custom_values() {
        let ini = "[simulation]\nlifetime_cap = 5000000\nannual_cap = 1200000\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let limits = cli::build_limits(&adapter).unwrap();
        assert_eq!(limits.lifetime.amount(), 5_000_000.0);
        assert_eq!(limits.annual, Some(1_200_000.0));
    }

    #[test]
    fn build_compounding_parses_and_rejects() {
        let adapter = FileConfigAdapter::from_string("[simulation]\ncompounding = Effective\n").unwrap();
        assert_eq!(cli::build_compounding(&adapter).unwrap(), Compounding::Effective);

        let adapter = FileConfigAdapter::from_string("[simulation]\ncompounding = daily\n").unwrap();
        assert!(matches!(
            cli::build_compounding(&adapter),
            Err(NisaError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn build_market_window_uses_configured_dates() {
        let adapter = FileConfigAdapter::from_string(MARKET_INI).unwrap();
        let (start, end) = cli::build_market_window(&adapter).unwrap();
        assert_eq!(start, date(2019, 1, 1));
        assert_eq!(end, date(2024, 12, 31));
    }

    #[test]
    fn build_market_window_defaults_to_ten_years() {
        let ini = "[market]\nsymbol = VOO\nend_date = 2024-06-30\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let (start, end) = cli::build_market_window(&adapter).unwrap();
        assert_eq!(start, date(2014, 6, 30));
        assert_eq!(end, date(2024, 6, 30));
    }

    #[test]
    fn build_risk_config_from_ini() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_risk_config(&adapter, None).unwrap();
        assert_eq!(config.simulations, 200);
        assert_eq!(config.annual_volatility, 0.15);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn build_risk_config_falls_back_to_estimate() {
        let adapter = FileConfigAdapter::from_string(MARKET_INI).unwrap();
        let estimate = GrowthEstimate {
            cagr: 0.07,
            annual_volatility: 0.18,
            observations: 60,
        };
        let config = cli::build_risk_config(&adapter, Some(&estimate)).unwrap();
        assert_eq!(config.annual_volatility, 0.18);
        assert_eq!(config.simulations, 100);

        assert!(matches!(
            cli::build_risk_config(&adapter, None),
            Err(NisaError::ConfigMissing { ref key, .. }) if key == "annual_volatility"
        ));
    }

    #[test]
    fn build_risk_config_rejects_negative_seed() {
        let ini = "[risk]\nannual_volatility = 0.1\nseed = -3\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        assert!(matches!(
            cli::build_risk_config(&adapter, None),
            Err(NisaError::ConfigInvalid { ref key, .. }) if key == "seed"
        ));
    }
}

mod overrides {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let mut adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = PlanOverrides {
            monthly: Some(100_000.0),
            years: Some(3),
            rate: Some(-0.02),
            symbol: None,
        };
        cli::apply_overrides(&mut adapter, &overrides);

        let plan = cli::build_plan(&adapter).unwrap();
        assert_eq!(plan.len(), 36);
        assert_eq!(plan.amounts()[0], 100_000.0);
        assert_eq!(adapter.get_double("simulation", "annual_rate", 0.0), -0.02);
    }

    #[test]
    fn symbol_override_clears_configured_rate() {
        let mut adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = PlanOverrides {
            symbol: Some("VT".into()),
            ..Default::default()
        };
        cli::apply_overrides(&mut adapter, &overrides);

        assert_eq!(adapter.get_string("market", "symbol").as_deref(), Some("VT"));
        let market = MockMarketData::new();
        let result = cli::resolve_growth(&adapter, Some(&market));
        assert!(matches!(result, Err(NisaError::NoData { ref symbol }) if symbol == "VT"));
    }

    #[test]
    fn symbol_and_rate_override_keeps_rate() {
        let mut adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = PlanOverrides {
            rate: Some(0.03),
            symbol: Some("VT".into()),
            ..Default::default()
        };
        cli::apply_overrides(&mut adapter, &overrides);

        let (rate, estimate) = cli::resolve_growth(&adapter, None).unwrap();
        assert_eq!(rate.annual_rate, 0.03);
        assert!(estimate.is_none());
    }
}

mod pipeline_mock {
    use super::*;

    #[test]
    fn simulate_pipeline_with_fixed_rate() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let report = MockReport::new();
        let outcome = cli::run_simulation_pipeline(
            &adapter,
            None,
            None,
            &report,
            Some(Path::new("out.csv")),
            None,
        )
        .unwrap();

        assert_eq!(outcome.result.snapshots.len(), 240);
        assert_eq!(outcome.result.yearly().len(), 20);
        assert_relative_eq!(outcome.result.final_snapshot().unwrap().principal, 7_200_000.0);
        assert!(outcome.result.total_gain() > 0.0);
        assert!(outcome.record_id.is_none());

        let written = report.results.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].1, Path::new("out.csv"));
    }

    #[test]
    fn simulate_pipeline_saves_to_store() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let store = MockStore::new();
        let report = MockReport::new();
        let outcome = cli::run_simulation_pipeline(
            &adapter,
            None,
            Some(&store),
            &report,
            None,
            Some("baseline".into()),
        )
        .unwrap();

        assert_eq!(outcome.record_id, Some(1));
        assert!(report.results.borrow().is_empty());
        let stored = store.get(1).unwrap().unwrap();
        assert_eq!(stored.label.as_deref(), Some("baseline"));
        assert_eq!(stored.result, outcome.result);
        assert_eq!(stored.rate.annual_rate, 0.05);
    }

    #[test]
    fn simulate_pipeline_derives_rate_from_market() {
        let adapter = FileConfigAdapter::from_string(MARKET_INI).unwrap();
        // Daily-ish noise within each month is resampled away.
        let mut prices = month_end_prices(2019, 72, 100.0, 0.005);
        prices.insert(0, PricePoint::new(date(2019, 1, 15), 80.0));
        let market = MockMarketData::new().with_prices("VOO", prices);
        let report = MockReport::new();

        let outcome =
            cli::run_simulation_pipeline(&adapter, Some(&market), None, &report, None, None)
                .unwrap();

        let estimate = outcome.estimate.unwrap();
        assert_eq!(estimate.observations, 72);
        assert_relative_eq!(outcome.rate.annual_rate, 1.005f64.powi(12) - 1.0, epsilon = 1e-9);
        assert_eq!(outcome.plan.len(), 120);
    }

    #[test]
    fn simulate_pipeline_converts_with_fx_symbol() {
        let ini = format!("{}fx_symbol = USDJPY\n", MARKET_INI.replace("[risk]\nseed = 7\nsimulations = 100\n", ""));
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let market = MockMarketData::new()
            .with_prices("VOO", flat_prices(2019, 36, 400.0))
            .with_prices("USDJPY", month_end_prices(2019, 36, 110.0, 0.002));
        let report = MockReport::new();

        let outcome =
            cli::run_simulation_pipeline(&adapter, Some(&market), None, &report, None, None)
                .unwrap();
        assert_relative_eq!(outcome.rate.annual_rate, 1.002f64.powi(12) - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn simulate_pipeline_without_rate_or_market_fails() {
        let ini = "[simulation]\nmonthly_contribution = 1000\nyears = 1\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let result = cli::run_simulation_pipeline(&adapter, None, None, &MockReport::new(), None, None);
        assert!(matches!(
            result,
            Err(NisaError::ConfigMissing { ref key, .. }) if key == "annual_rate"
        ));
    }

    #[test]
    fn simulate_pipeline_propagates_market_errors() {
        let adapter = FileConfigAdapter::from_string(MARKET_INI).unwrap();
        let market = MockMarketData::new().with_error("VOO", "connection reset");
        let result =
            cli::run_simulation_pipeline(&adapter, Some(&market), None, &MockReport::new(), None, None);
        assert!(matches!(result, Err(NisaError::Database { .. })));
    }

    #[test]
    fn risk_pipeline_is_reproducible_with_seed() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let report = MockReport::new();
        let first = cli::run_risk_pipeline(&adapter, None, &report, Some(Path::new("risk.csv"))).unwrap();
        let second = cli::run_risk_pipeline(&adapter, None, &report, None).unwrap();

        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
        assert_eq!(report.bands.borrow().len(), 1);
        for band in &first {
            assert!(band.lower_5 <= band.mean);
            assert!(band.mean <= band.upper_5);
        }
    }

    #[test]
    fn risk_pipeline_uses_estimated_volatility() {
        let adapter = FileConfigAdapter::from_string(MARKET_INI).unwrap();
        let market = MockMarketData::new().with_prices("VOO", month_end_prices(2019, 72, 100.0, 0.004));
        let bands = cli::run_risk_pipeline(&adapter, Some(&market), &MockReport::new(), None).unwrap();

        // Steady prices estimate zero volatility, so the band collapses.
        let last = bands.last().unwrap();
        assert_eq!(last.year, 10);
        assert_relative_eq!(last.upper_5, last.lower_5, max_relative = 1e-9);
    }

    #[test]
    fn validate_all_rejects_unknown_backend() {
        let ini = format!("{}\n[storage]\nbackend = redis\n", VALID_INI.replace("[storage]\nbackend = none\n", ""));
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        assert!(matches!(
            cli::validate_all(&adapter),
            Err(NisaError::ConfigInvalid { ref key, .. }) if key == "backend"
        ));
    }
}

mod end_to_end {
    use super::*;
    use std::fs;

    #[test]
    fn load_config_missing_file_fails() {
        let result = cli::load_config(Path::new("/nonexistent/nisasim.ini"));
        assert!(matches!(result, Err(NisaError::ConfigParse { .. })));
    }

    #[test]
    fn validate_command_accepts_valid_file() {
        let file = write_temp_ini(VALID_INI);
        let cli = Cli::try_parse_from(["nisasim", "validate", "-c", file.path().to_str().unwrap()]).unwrap();
        assert!(is_success(cli::run(cli)));
    }

    #[test]
    fn validate_command_rejects_bad_years() {
        let file = write_temp_ini("[simulation]\nmonthly_contribution = 1000\nyears = 0\nannual_rate = 0.05\n");
        let cli = Cli::try_parse_from(["nisasim", "validate", "-c", file.path().to_str().unwrap()]).unwrap();
        assert!(!is_success(cli::run(cli)));
    }

    #[test]
    fn simulate_command_writes_csv_series() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("series.csv");
        let file = write_temp_ini(VALID_INI);

        let cli = Cli::try_parse_from([
            "nisasim",
            "simulate",
            "-c",
            file.path().to_str().unwrap(),
            "--years",
            "2",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        assert!(is_success(cli::run(cli)));

        let content = fs::read_to_string(&output).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("period,principal,market_value"));
        assert_eq!(lines.count(), 24);
    }

    #[test]
    fn growth_command_reads_csv_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut csv = String::from("Date,Close\n");
        for p in month_end_prices(2020, 24, 100.0, 0.01) {
            csv.push_str(&format!("{},{}\n", p.date, p.price));
        }
        fs::write(dir.path().join("VOO.csv"), csv).unwrap();

        let ini = format!(
            "[market]\nsymbol = VOO\ndata_dir = {}\nstart_date = 2020-01-01\nend_date = 2021-12-31\n",
            dir.path().display()
        );
        let file = write_temp_ini(&ini);
        let cli = Cli::try_parse_from(["nisasim", "growth", "-c", file.path().to_str().unwrap()]).unwrap();
        assert!(is_success(cli::run(cli)));
    }

    #[test]
    fn risk_command_with_overrides() {
        let file = write_temp_ini(VALID_INI);
        let cli = Cli::try_parse_from([
            "nisasim",
            "risk",
            "-c",
            file.path().to_str().unwrap(),
            "--years",
            "3",
            "--simulations",
            "50",
            "--volatility",
            "0.2",
            "--seed",
            "9",
        ])
        .unwrap();
        assert!(is_success(cli::run(cli)));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn simulate_save_then_history() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("nisa.db");
        let ini = format!(
            "{}\n[sqlite]\npath = {}\n",
            VALID_INI.replace("backend = none", "backend = sqlite"),
            db.display()
        );
        let file = write_temp_ini(&ini);
        let path = file.path().to_str().unwrap();

        let simulate = Cli::try_parse_from(["nisasim", "simulate", "-c", path, "--save", "--label", "base"]).unwrap();
        assert!(is_success(cli::run(simulate)));

        let history = Cli::try_parse_from(["nisasim", "history", "-c", path, "-n", "5"]).unwrap();
        assert!(is_success(cli::run(history)));

        let config = cli::load_config(file.path()).unwrap();
        let store = cli::open_store(&config).unwrap().unwrap();
        let recent = store.recent(5).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].label.as_deref(), Some("base"));
    }

    #[test]
    fn history_without_backend_fails() {
        let file = write_temp_ini(VALID_INI);
        let cli = Cli::try_parse_from(["nisasim", "history", "-c", file.path().to_str().unwrap()]).unwrap();
        assert!(!is_success(cli::run(cli)));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn import_fills_sqlite_price_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut csv = String::from("Date,Adj Close\n");
        for p in month_end_prices(2020, 24, 100.0, 0.01) {
            csv.push_str(&format!("{},{}\n", p.date, p.price));
        }
        let csv_path = dir.path().join("prices.csv");
        fs::write(&csv_path, csv).unwrap();

        let ini = format!(
            "[market]\nsymbol = VOO\nsource = sqlite\nstart_date = 2020-01-01\nend_date = 2021-12-31\n\n[sqlite]\npath = {}\n",
            dir.path().join("prices.db").display()
        );
        let file = write_temp_ini(&ini);
        let path = file.path().to_str().unwrap();

        let import = Cli::try_parse_from([
            "nisasim",
            "import",
            "-c",
            path,
            "--symbol",
            "VOO",
            "--file",
            csv_path.to_str().unwrap(),
        ])
        .unwrap();
        assert!(is_success(cli::run(import)));

        let config = cli::load_config(file.path()).unwrap();
        let market = cli::open_market(&config).unwrap();
        let est = cli::estimate_growth(market.as_ref(), &config).unwrap();
        assert_eq!(est.observations, 24);
        assert_relative_eq!(est.cagr, 1.01f64.powi(12) - 1.0, epsilon = 1e-9);

        let growth = Cli::try_parse_from(["nisasim", "growth", "-c", path]).unwrap();
        assert!(is_success(cli::run(growth)));
    }

    #[test]
    fn import_rejects_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let csv_path = dir.path().join("bad.csv");
        fs::write(&csv_path, "when,close\n2024-01-02,10\n").unwrap();
        let adapter = FileConfigAdapter::from_string("[sqlite]\npath = unused.db\n").unwrap();

        let result = cli::import_prices(&adapter, "VOO", Some(&csv_path));
        assert!(matches!(result, Err(NisaError::MalformedData { .. })));
    }

    #[test]
    fn import_empty_file_is_no_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let csv_path = dir.path().join("empty.csv");
        fs::write(&csv_path, "date,close\n").unwrap();
        let adapter = FileConfigAdapter::from_string("[sqlite]\npath = unused.db\n").unwrap();

        let result = cli::import_prices(&adapter, "VOO", Some(&csv_path));
        assert!(matches!(result, Err(NisaError::NoData { ref symbol }) if symbol == "VOO"));
    }
}
