//! Grid-Guard entry point: CLI wiring around a single scenario run.

use std::path::Path;
use std::process;

use grid_guard::config::ScenarioConfig;
use grid_guard::io::export::export_csv;
use grid_guard::sim::{ThrottleStrategy, run_scenario};
use tracing_subscriber::EnvFilter;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    aggressiveness: Option<f64>,
    strategy: Option<ThrottleStrategy>,
    out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("grid-guard: AI data-center load-shedding simulator");
    eprintln!();
    eprintln!("Usage: grid-guard [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>         Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>           Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>              Override forecast noise seed");
    eprintln!("  --aggressiveness <f64>    Override throttle aggressiveness (0.0..=1.0)");
    eprintln!("  --strategy <name>         Throttle strategy (linear, smooth_decay)");
    eprintln!("  --out <path>              Export chart series to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                   Start REST API server after simulation");
        eprintln!("  --port <u16>              API server port (default: 3000)");
    }
    eprintln!("  --help                    Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

/// Returns the value following flag `name`, exiting if it is missing.
fn flag_value<'a>(args: &'a [String], i: usize, name: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("error: {name} requires {what}");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        aggressiveness: None,
        strategy: None,
        out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path =
                    Some(flag_value(&args, i, "--scenario", "a path argument").to_string());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(flag_value(&args, i, "--preset", "a name argument").to_string());
            }
            "--seed" => {
                i += 1;
                let raw = flag_value(&args, i, "--seed", "a u64 argument");
                if let Ok(s) = raw.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{raw}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--aggressiveness" => {
                i += 1;
                let raw = flag_value(&args, i, "--aggressiveness", "a number argument");
                if let Ok(a) = raw.parse::<f64>() {
                    cli.aggressiveness = Some(a);
                } else {
                    eprintln!("error: --aggressiveness value \"{raw}\" is not a number");
                    process::exit(1);
                }
            }
            "--strategy" => {
                i += 1;
                let raw = flag_value(&args, i, "--strategy", "a name argument");
                match raw.parse::<ThrottleStrategy>() {
                    Ok(s) => cli.strategy = Some(s),
                    Err(e) => {
                        eprintln!("error: --strategy {e}");
                        process::exit(1);
                    }
                }
            }
            "--out" => {
                i += 1;
                cli.out = Some(flag_value(&args, i, "--out", "a path argument").to_string());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = flag_value(&args, i, "--port", "a u16 argument");
                if let Ok(p) = raw.parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{raw}\" is not a valid u16");
                    process::exit(1);
                }
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

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

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

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = Some(seed);
    }
    if let Some(a) = cli.aggressiveness {
        scenario.policy.aggressiveness = a;
    }
    if let Some(s) = cli.strategy {
        scenario.policy.strategy = s;
    }

    // Report every violation, not just the first
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let result = match run_scenario(scenario.clone()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    for step in result.steps() {
        println!("{step}");
    }
    println!("\n{}", result.metrics());
    println!("{}", result.summary_line());

    if let Some(ref path) = cli.out {
        if let Err(e) = export_csv(&result, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Chart series written to {path}");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(grid_guard::api::AppState::with_result(scenario, result));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(grid_guard::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}
