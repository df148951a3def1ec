//! Capture-recapture core CLI.
//!
//! The main entry point for cr-core, handling:
//! - Grid posterior analyses from analysis files or presets
//! - Synthetic capture histories
//! - Configuration checks, presets and payload schemas

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cr_common::{OutputFormat, SCHEMA_VERSION};
use cr_config::list_presets;
use cr_core::analysis::run_analysis;
use cr_core::config::{load_config, ConfigError, ConfigOptions};
use cr_core::exit_codes::ExitCode;
use cr_core::log_event;
use cr_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use cr_core::output::{render_error, render_report, render_value};
use cr_core::schema::{available_schemas, generate_all_schemas, generate_schema};
use cr_core::simulate::{simulate_capture_history, simulate_two_test, SimulationReport};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Capture-recapture population estimation on a discretized grid
#[derive(Parser)]
#[command(name = "cr-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log level (overrides -v/-q and CR_LOG)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (overrides CR_LOG_FORMAT)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an analysis and report the posterior
    Run(RunArgs),

    /// Simulate a capture history or a two-test table
    Simulate(SimulateArgs),

    /// Validate an analysis file without running it
    Check(SourceArgs),

    /// List built-in presets
    Presets,

    /// Print JSON Schema for payload and config types
    Schema(SchemaArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Analysis file (JSON)
    #[arg(long, short = 'c', conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in preset (lincoln-petersen, two-stage, two-test)
    #[arg(long, short = 'p')]
    preset: Option<String>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Credible interval coverage in (0, 1]
    #[arg(long)]
    coverage: Option<f64>,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// True population size
    #[arg(long, short = 'n')]
    population: u64,

    /// Sample size of each capture occasion, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        required_unless_present = "p1",
        conflicts_with = "p1"
    )]
    samples: Vec<u64>,

    /// Detection probability of test 1 (two-test simulation)
    #[arg(long, requires = "p2")]
    p1: Option<f64>,

    /// Detection probability of test 2 (two-test simulation)
    #[arg(long, requires = "p1")]
    p2: Option<f64>,

    /// RNG seed; drawn at random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type to print
    name: Option<String>,

    /// List available types
    #[arg(long, conflicts_with = "all")]
    list: bool,

    /// Print every schema
    #[arg(long)]
    all: bool,
}

fn cli_log_level(global: &GlobalOpts) -> Option<LogLevel> {
    if global.log_level.is_some() {
        return global.log_level;
    }
    if global.quiet {
        return Some(LogLevel::Error);
    }
    match global.verbose {
        0 => None,
        1 => Some(LogLevel::Debug),
        _ => Some(LogLevel::Trace),
    }
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli_log_level(&cli.global), cli.global.log_format);
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());
    let span = tracing::info_span!("cr-core", run_id = %ctx.run_id);
    let _enter = span.enter();
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_STARTED,
        Stage::Init,
        "cr-core started",
        version = env!("CARGO_PKG_VERSION")
    );

    let exit_code = match cli.command {
        Commands::Run(args) => run_command(&cli.global, &ctx, &args),
        Commands::Simulate(args) => run_simulate(&cli.global, &ctx, &args),
        Commands::Check(args) => run_check(&cli.global, &ctx, &args),
        Commands::Presets => print_presets(&cli.global),
        Commands::Schema(args) => run_schema(&cli.global, &ctx, &args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Ok
        }
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "cr-core finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_command(global: &GlobalOpts, ctx: &LogContext, args: &RunArgs) -> ExitCode {
    let options = ConfigOptions {
        config_path: args.source.config.clone(),
        preset: args.source.preset.clone(),
        coverage: args.coverage,
    };
    let resolved = match load_config(&options) {
        Ok(resolved) => resolved,
        Err(e) => return output_config_error(global, ctx, e),
    };
    let snapshot = resolved.snapshot();
    let ctx = ctx.clone().with_config_id(snapshot.short_id());
    log_event!(
        ctx,
        INFO,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "analysis configuration loaded",
        source = snapshot.source.as_str(),
        model = snapshot.summary.model.as_str(),
        grid_points = snapshot.summary.grid_points
    );
    if let Some(preset) = resolved.preset {
        log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_PRESET_USED,
            Stage::Init,
            "using built-in preset",
            preset = preset.as_str()
        );
    }

    let span = tracing::info_span!("analysis", config_id = %snapshot.short_id());
    let _enter = span.enter();
    match run_analysis(&resolved.analysis) {
        Ok(mut report) => {
            report.config = Some(snapshot);
            print_payload(global, &ctx, render_report(&report, global.format, &ctx.run_id))
        }
        Err(e) => output_error(global, &ctx, e.into()),
    }
}

fn run_simulate(global: &GlobalOpts, ctx: &LogContext, args: &SimulateArgs) -> ExitCode {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let result = match (args.p1, args.p2) {
        (Some(p1), Some(p2)) => simulate_two_test(args.population, p1, p2, &mut rng)
            .map(|table| SimulationReport::two_test(args.population, seed, table)),
        _ => simulate_capture_history(args.population, &args.samples, &mut rng)
            .map(|stages| SimulationReport::capture(args.population, seed, stages)),
    };
    let report = match result {
        Ok(report) => report,
        Err(e) => return output_error(global, ctx, e.into()),
    };
    log_event!(
        ctx,
        INFO,
        event_names::SIMULATION_FINISHED,
        Stage::Simulate,
        "simulation finished",
        population = args.population,
        seed = seed
    );

    if global.format == OutputFormat::Summary {
        let detail = match &report.two_test {
            Some(t) => format!("k10={} k01={} k11={}", t.k10, t.k01, t.k11),
            None => report
                .stages
                .iter()
                .map(|s| format!("n={} y={}", s.sample_size, s.recaptured))
                .collect::<Vec<_>>()
                .join(", "),
        };
        println!(
            "[{}] simulate: N={} seed={} {}",
            ctx.run_id, report.population, report.seed, detail
        );
        return ExitCode::Ok;
    }
    print_payload(
        global,
        ctx,
        render_value(&report, global.format, "simulate", &ctx.run_id),
    )
}

fn run_check(global: &GlobalOpts, ctx: &LogContext, args: &SourceArgs) -> ExitCode {
    let options = ConfigOptions {
        config_path: args.config.clone(),
        preset: args.preset.clone(),
        coverage: None,
    };
    let resolved = match load_config(&options) {
        Ok(resolved) => resolved,
        Err(e) => return output_config_error(global, ctx, e),
    };
    let snapshot = resolved.snapshot();

    match global.format {
        OutputFormat::Summary => {
            println!(
                "[{}] check: ok ({} model, {} grid points, from {})",
                ctx.run_id, snapshot.summary.model, snapshot.summary.grid_points, snapshot.source
            );
            ExitCode::Ok
        }
        _ => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "status": "ok",
                "config": snapshot,
            });
            print_payload(
                global,
                ctx,
                render_value(&response, global.format, "check", &ctx.run_id),
            )
        }
    }
}

fn print_presets(global: &GlobalOpts) -> ExitCode {
    let presets = list_presets();
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "presets": presets,
            });
            match serde_json::to_string_pretty(&response) {
                Ok(s) => println!("{s}"),
                Err(_) => return ExitCode::InternalError,
            }
        }
        OutputFormat::Summary => {
            let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
            println!("presets: {}", names.join(", "));
        }
        OutputFormat::Md => {
            println!("# cr-core presets");
            println!();
            println!("| name | model | description |");
            println!("|---|---|---|");
            for p in &presets {
                println!("| {} | {} | {} |", p.name, p.model, p.description);
            }
        }
    }
    ExitCode::Ok
}

fn run_schema(global: &GlobalOpts, ctx: &LogContext, args: &SchemaArgs) -> ExitCode {
    if args.list || (args.name.is_none() && !args.all) {
        for (name, description) in available_schemas() {
            println!("{name:<18} {description}");
        }
        return ExitCode::Ok;
    }
    let value = if args.all {
        serde_json::to_value(generate_all_schemas()).ok()
    } else {
        args.name.as_deref().and_then(generate_schema)
    };
    match value {
        Some(schema) => match serde_json::to_string_pretty(&schema) {
            Ok(s) => {
                println!("{s}");
                ExitCode::Ok
            }
            Err(e) => output_error(global, ctx, e.into()),
        },
        None => output_error(
            global,
            ctx,
            cr_common::Error::Config(format!(
                "unknown schema type '{}'; see 'cr-core schema --list'",
                args.name.as_deref().unwrap_or_default()
            )),
        ),
    }
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "cr_core_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => {
            println!("{version_info:#}");
        }
        _ => {
            println!("cr-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_payload(
    global: &GlobalOpts,
    ctx: &LogContext,
    rendered: Result<String, serde_json::Error>,
) -> ExitCode {
    match rendered {
        Ok(s) => {
            println!("{s}");
            ExitCode::Ok
        }
        Err(e) => output_error(global, ctx, e.into()),
    }
}

/// Output a config error in the appropriate format.
fn output_config_error(global: &GlobalOpts, ctx: &LogContext, error: ConfigError) -> ExitCode {
    log_event!(
        ctx,
        WARN,
        event_names::CONFIG_ERROR,
        Stage::Init,
        "analysis configuration rejected",
        error = error.to_string().as_str()
    );
    output_error(global, ctx, error.into())
}

fn output_error(global: &GlobalOpts, ctx: &LogContext, error: cr_common::Error) -> ExitCode {
    let exit_code = ExitCode::from(&error);
    if exit_code.is_internal_error() {
        log_event!(
            ctx,
            ERROR,
            event_names::INTERNAL_ERROR,
            Stage::Report,
            "command failed",
            code = error.code(),
            error = error.to_string().as_str()
        );
    }
    eprintln!("{}", render_error(&error, global.format, &ctx.run_id));
    exit_code
}
