//! hydro-sched entry point: CLI wiring and config-driven dispatch.

use std::fs;
use std::path::Path;
use std::process;

use hydro_sched::config::ScenarioConfig;
use hydro_sched::io::export::{export_benchmark_csv, export_schedule_csv};
use hydro_sched::opt::benchmark::run_benchmark;
use hydro_sched::opt::optimizer::{DispatchReport, optimize_horizon};
use hydro_sched::prices::{PriceModel, perturb, read_price_file};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    horizon_override: Option<usize>,
    seed_override: Option<u64>,
    prices_csv: Option<String>,
    benchmark: bool,
    csv_out: Option<String>,
    json_out: Option<String>,
}

fn print_help() {
    eprintln!("hydro-sched — Hydro plant generation-schedule optimizer");
    eprintln!();
    eprintln!("Usage: hydro-sched [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!("  --preset <name>     Use a built-in preset (baseline)");
    eprintln!("  --list-presets      List available presets and exit");
    eprintln!("  --horizon <steps>   Override the scheduling horizon length");
    eprintln!("  --seed <u64>        Override the synthetic price seed");
    eprintln!("  --prices <path>     Read realized prices from a CSV file");
    eprintln!("  --benchmark         Run the forecast benchmark after the dispatch");
    eprintln!("  --csv-out <path>    Export the schedule (or benchmark series) to CSV");
    eprintln!("  --json-out <path>   Export the report (or benchmark result) to JSON");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        horizon_override: None,
        seed_override: None,
        prices_csv: None,
        benchmark: false,
        csv_out: None,
        json_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--list-presets" => {
                for name in ScenarioConfig::PRESETS {
                    println!("{name}");
                }
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--horizon" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --horizon requires a step count argument");
                    process::exit(1);
                }
                if let Ok(h) = args[i].parse::<usize>() {
                    cli.horizon_override = Some(h);
                } else {
                    eprintln!(
                        "error: --horizon value \"{}\" is not a valid step count",
                        args[i]
                    );
                    process::exit(1);
                }
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--prices" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --prices requires a path argument");
                    process::exit(1);
                }
                cli.prices_csv = Some(args[i].clone());
            }
            "--benchmark" => {
                cli.benchmark = true;
            }
            "--csv-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --csv-out requires a path argument");
                    process::exit(1);
                }
                cli.csv_out = Some(args[i].clone());
            }
            "--json-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --json-out requires a path argument");
                    process::exit(1);
                }
                cli.json_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Number of steps spanning one day at the configured step length.
fn steps_per_day(step_seconds: f64) -> usize {
    (86_400.0 / step_seconds).round().max(1.0) as usize
}

/// Returns the realized price series: CSV rows when configured, otherwise
/// the seeded synthetic daily curve.
fn load_prices(scenario: &ScenarioConfig) -> Vec<f64> {
    if scenario.prices.source == "csv" {
        let path = scenario.prices.csv_path.clone().unwrap_or_default();
        match read_price_file(Path::new(&path)) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    } else {
        let pr = &scenario.prices;
        let mut model = PriceModel::new(
            pr.base_usd_mwh,
            pr.amp_usd_mwh,
            pr.phase_rad,
            pr.noise_std,
            steps_per_day(scenario.horizon.step_seconds),
            pr.seed,
        );
        model.generate(scenario.horizon.steps)
    }
}

/// Returns the forecast series for the benchmark: CSV rows when configured,
/// otherwise the realized series plus seeded noise.
fn load_forecast(scenario: &ScenarioConfig, realized: &[f64]) -> Vec<f64> {
    let b = &scenario.benchmark;
    if let Some(ref path) = b.forecast_csv_path {
        match read_price_file(Path::new(path)) {
            Ok(mut p) => {
                p.truncate(realized.len());
                p
            }
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    } else {
        perturb(realized, b.forecast_noise_std, b.forecast_seed)
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply CLI overrides
    if let Some(steps) = cli.horizon_override {
        scenario.horizon.steps = steps;
    }
    if let Some(seed) = cli.seed_override {
        scenario.prices.seed = seed;
    }
    if let Some(ref path) = cli.prices_csv {
        scenario.prices.source = "csv".to_string();
        scenario.prices.csv_path = Some(path.clone());
    }
    if cli.benchmark {
        scenario.benchmark.enabled = true;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Acquire the realized price series and optimize over the horizon
    let prices = load_prices(&scenario);
    let params = scenario.plant_parameters();
    let strategy = scenario.strategy();
    let floor = scenario.optimizer.final_volume_floor_m3;
    let result = match optimize_horizon(&prices, scenario.horizon.steps, &params, strategy, floor) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    let horizon_prices = &prices[..scenario.horizon.steps];

    // Print dispatch report
    let report = DispatchReport::new(&result, &params);
    println!("{report}");

    // Run benchmark if enabled
    let benchmark = if scenario.benchmark.enabled {
        let forecast = load_forecast(&scenario, horizon_prices);
        match run_benchmark(
            horizon_prices,
            &forecast,
            &params,
            scenario.benchmark.p_stable_mw,
            strategy,
            floor,
        ) {
            Ok(b) => {
                println!("\n{b}");
                Some(b)
            }
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    // Export CSV if requested
    if let Some(ref path) = cli.csv_out {
        let written = match &benchmark {
            Some(b) => export_benchmark_csv(&b.hourly, Path::new(path)),
            None => export_schedule_csv(horizon_prices, &result.schedule, Path::new(path)),
        };
        if let Err(e) = written {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Results written to {path}");
    }

    // Export JSON if requested
    if let Some(ref path) = cli.json_out {
        let json = match &benchmark {
            Some(b) => serde_json::to_string_pretty(b),
            None => serde_json::to_string_pretty(&report),
        };
        match json {
            Ok(body) => {
                if let Err(e) = fs::write(path, body) {
                    eprintln!("error: failed to write JSON: {e}");
                    process::exit(1);
                }
                eprintln!("Report written to {path}");
            }
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                process::exit(1);
            }
        }
    }
}
