use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{ArgAction, Args, Parser, Subcommand};
use miette::IntoDiagnostic;

use sasbdb_fetcher::app::{App, ProgressSink};
use sasbdb_fetcher::config::{ConfigLoader, ResolvedConfig, delay_from_secs};
use sasbdb_fetcher::domain::{RecordCode, ResourceKind};
use sasbdb_fetcher::error::SasbdbError;
use sasbdb_fetcher::logging::setup_logging;
use sasbdb_fetcher::output::{ConsoleOutput, JsonOutput, OutputMode};
use sasbdb_fetcher::pacing::ThreadSleepPacer;
use sasbdb_fetcher::sasbdb::SasbdbHttpClient;
use sasbdb_fetcher::store::Store;

#[derive(Parser)]
#[command(name = "sasbdb-fetch")]
#[command(about = "Mirror SASBDB entries (summary, intensities, P(r), sasCIF) into a local directory")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Increase console verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors on the console
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also write a DEBUG-level log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download every entry (default command)")]
    Run(RunArgs),
    #[command(about = "List the SASBDB codes without downloading entries")]
    Codes(CodesArgs),
    #[command(about = "Print a field of a downloaded summary")]
    Inspect(InspectArgs),
}

#[derive(Args, Clone, Default)]
struct RunArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    data_dir: Option<Utf8PathBuf>,

    /// Restrict the download to these resource kinds (repeatable)
    #[arg(long = "kind", value_enum)]
    kinds: Vec<ResourceKind>,

    #[arg(long)]
    no_manifest: bool,

    #[arg(long)]
    delay_secs: Option<f64>,
}

#[derive(Args)]
struct CodesArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    data_dir: Option<Utf8PathBuf>,

    /// Write list_SASBDB_codes.txt into the data directory
    #[arg(long)]
    manifest: bool,
}

#[derive(Args)]
struct InspectArgs {
    code: String,

    #[arg(long, default_value = "guinier_rg")]
    field: String,

    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    data_dir: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<SasbdbError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SasbdbError) -> u8 {
    match error {
        SasbdbError::InvalidRecordCode(_)
        | SasbdbError::InvalidResourceKind(_)
        | SasbdbError::ConfigRead(_)
        | SasbdbError::ConfigParse(_)
        | SasbdbError::DataDirMissing(_) => 2,
        SasbdbError::SasbdbHttp(_)
        | SasbdbError::SasbdbStatus { .. }
        | SasbdbError::ListingUnavailable(_)
        | SasbdbError::MalformedListing(_)
        | SasbdbError::MalformedSummary { .. } => 3,
        SasbdbError::Filesystem(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_fetch(args, output_mode),
        Commands::Codes(args) => run_codes(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}

fn resolve(config: Option<&str>, data_dir: Option<Utf8PathBuf>) -> miette::Result<ResolvedConfig> {
    let mut resolved = ConfigLoader::resolve(config)?;
    if let Some(data_dir) = data_dir {
        resolved.data_dir = data_dir;
    }
    Ok(resolved)
}

fn run_fetch(args: RunArgs, output_mode: OutputMode) -> miette::Result<()> {
    let mut resolved = resolve(args.config.as_deref(), args.data_dir)?;
    if !args.kinds.is_empty() {
        resolved.options.kinds = ResourceKind::canonical(&args.kinds);
    }
    if args.no_manifest {
        resolved.options.write_manifest = false;
    }
    if let Some(secs) = args.delay_secs {
        resolved.options.delay = delay_from_secs(secs)?;
    }

    let client = SasbdbHttpClient::new()?;
    let app = App::new(
        Store::new(resolved.data_dir),
        client,
        ThreadSleepPacer,
        resolved.endpoints,
    );

    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.run(&resolved.options, &JsonOutput)?;
            JsonOutput::print_run(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let sink: &dyn ProgressSink = &ConsoleOutput;
            let result = app.run(&resolved.options, sink)?;
            ConsoleOutput::print_run(&result).into_diagnostic()?;
        }
    }
    Ok(())
}

fn run_codes(args: CodesArgs) -> miette::Result<()> {
    let resolved = resolve(args.config.as_deref(), args.data_dir)?;
    let store = Store::new(resolved.data_dir);
    if args.manifest {
        store.ensure_data_dir()?;
    }
    let app = App::new(
        store,
        SasbdbHttpClient::new()?,
        ThreadSleepPacer,
        resolved.endpoints,
    );
    let codes = app.list_codes()?;
    if args.manifest {
        app.write_manifest(&codes)?;
    }
    for code in &codes {
        println!("{code}");
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> miette::Result<()> {
    let resolved = resolve(args.config.as_deref(), args.data_dir)?;
    let code: RecordCode = args.code.parse()?;
    let store = Store::new(resolved.data_dir);
    match store.read_summary_field(&code, &args.field)? {
        Some(value) => println!("{value}"),
        None => println!("{code}: no `{}` field in summary", args.field),
    }
    Ok(())
}
