use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use datatier_codegen::{Generator, GeneratorConfig};
use datatier_core::Schema;
use datatier_sqlite::Context;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for `inspect`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "datatier")]
#[command(about = "Typed data-access code generation for SQLite schemas")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one Rust source file per table of a SQLite database.
    Generate(GenerateArgs),
    /// Print the introspected schema of a SQLite database.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// SQLite database file to introspect.
    #[arg(long)]
    db: PathBuf,
    /// Output directory for generated files.
    #[arg(long)]
    output: PathBuf,
    /// Generator configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Remove previously generated files from the output directory first.
    #[arg(long)]
    clean: bool,
    /// Do not write the mod.rs module index.
    #[arg(long)]
    no_index: bool,
    /// Do not run rustfmt over the generated source.
    #[arg(long)]
    no_format: bool,
    /// Path of the runtime crate as seen from the generated code.
    #[arg(long)]
    runtime_crate: Option<String>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// SQLite database file to introspect.
    #[arg(long)]
    db: PathBuf,
    /// Generator configuration YAML (reserved prefix and exclusions apply).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Inspect(args) => run_inspect(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if args.no_index {
        config.emit_module_index = false;
    }
    if args.no_format {
        config.format = false;
    }
    if let Some(runtime_crate) = args.runtime_crate {
        config.runtime_crate = runtime_crate;
    }
    debug!(?config, "effective generator configuration");

    let ctx = open_database(&args.db)?;
    let written = Generator::new(config)
        .run(ctx.connection(), &args.output, args.clean)
        .map_err(|e| e.to_string())?;

    for path in &written {
        if let Some(name) = path.file_name() {
            println!("{}", name.to_string_lossy());
        }
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let ctx = open_database(&args.db)?;
    let schema = Generator::new(config)
        .introspect(ctx.connection())
        .map_err(|e| e.to_string())?;

    print!("{}", render_schema(&schema, args.format)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig, String> {
    match path {
        Some(path) => GeneratorConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn open_database(path: &Path) -> Result<Context, String> {
    Context::open_read_only(path)
        .map_err(|e| format!("Failed to open database '{}': {e}", path.display()))
}

fn render_schema(schema: &Schema, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(schema)
            .map(|raw| format!("{raw}\n"))
            .map_err(|e| format!("Failed to serialize schema: {e}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(schema).map_err(|e| format!("Failed to serialize schema: {e}"))
        }
    }
}
