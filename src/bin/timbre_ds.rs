use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use timbre_dataset::acquire::{AcquiredAudio, Acquirer, MediaAcquirer};
use timbre_dataset::app::{self, App};
use timbre_dataset::config::{ConfigLoader, ConfigOverrides, ResolvedConfig};
use timbre_dataset::domain::Locator;
use timbre_dataset::error::DatasetError;
use timbre_dataset::features::MfccExtractor;
use timbre_dataset::http::HttpAcquirer;
use timbre_dataset::output::{JsonOutput, OutputMode, TextOutput};
use timbre_dataset::store::DatasetStore;
use timbre_dataset::ytdlp::YtDlpAcquirer;

#[derive(Parser)]
#[command(name = "timbre-ds")]
#[command(about = "Builds a labeled MFCC timbre dataset from a list of audio sources")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download every source, extract features and write the summary")]
    Build(BuildArgs),
    #[command(about = "Show the locator list with indices and labels")]
    List(ListArgs),
    #[command(about = "Extract features from a single local audio file")]
    Extract(ExtractArgs),
    #[command(about = "Remove the output directory")]
    Clear(ClearArgs),
}

#[derive(Args, Clone)]
struct SettingsArgs {
    #[arg(long)]
    sample_rate: Option<u32>,

    #[arg(long = "coefficients")]
    coefficient_count: Option<usize>,
}

#[derive(Args)]
struct BuildArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    output_dir: Option<String>,

    #[command(flatten)]
    settings: SettingsArgs,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtractArgs {
    audio_file: PathBuf,

    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long)]
    config: Option<String>,

    #[command(flatten)]
    settings: SettingsArgs,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ClearArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    output_dir: Option<String>,

    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<DatasetError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &DatasetError) -> u8 {
    match error {
        DatasetError::InvalidLocator(_)
        | DatasetError::InvalidLabel(_)
        | DatasetError::ConfigRead(_)
        | DatasetError::ConfigParse(_)
        | DatasetError::InvalidConfig(_) => 2,
        DatasetError::MissingTool(_)
        | DatasetError::Acquisition { .. }
        | DatasetError::DownloadStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build(args) => run_build(args),
        Commands::List(args) => run_list(args),
        Commands::Extract(args) => run_extract(args),
        Commands::Clear(args) => run_clear(args),
    }
}

fn resolve(
    config: Option<&str>,
    output_dir: Option<String>,
    settings: Option<&SettingsArgs>,
) -> Result<ResolvedConfig, DatasetError> {
    let overrides = ConfigOverrides {
        sample_rate: settings.and_then(|args| args.sample_rate),
        coefficient_count: settings.and_then(|args| args.coefficient_count),
        output_dir,
    };
    ConfigLoader::resolve(config, &overrides)
}

fn run_build(args: BuildArgs) -> miette::Result<()> {
    let resolved = resolve(
        args.config.as_deref(),
        args.output_dir,
        Some(&args.settings),
    )?;
    let output_mode = OutputMode::from_json_flag(args.json);

    let ytdlp = YtDlpAcquirer::new(resolved.ytdlp_format.clone());
    match ytdlp.version() {
        Some(version) => info!(%version, "using yt-dlp"),
        None if ytdlp.is_available() => warn!("yt-dlp found but did not report a version"),
        None => warn!("yt-dlp not found on PATH; video page sources will be skipped"),
    }
    let acquirer = MediaAcquirer::new(ytdlp, HttpAcquirer::new()?);
    let extractor = MfccExtractor::new(resolved.extraction)?;
    let app = App::new(acquirer, extractor, resolved.extraction);
    let store = DatasetStore::new(&resolved.output_dir)?;

    match output_mode {
        OutputMode::Json => {
            let report = app.run(store, &resolved.entries, &JsonOutput)?;
            JsonOutput::print_build(&report).into_diagnostic()?;
        }
        OutputMode::Text => {
            let report = app.run(store, &resolved.entries, &TextOutput)?;
            TextOutput::print_build(&report).into_diagnostic()?;
        }
    }
    Ok(())
}

fn run_list(args: ListArgs) -> miette::Result<()> {
    let resolved = resolve(args.config.as_deref(), None, None)?;
    let result = app::list_entries(&resolved.entries);
    match OutputMode::from_json_flag(args.json) {
        OutputMode::Json => JsonOutput::print_list(&result).into_diagnostic()?,
        OutputMode::Text => TextOutput::print_list(&result).into_diagnostic()?,
    }
    Ok(())
}

fn run_extract(args: ExtractArgs) -> miette::Result<()> {
    let resolved = resolve(args.config.as_deref(), None, Some(&args.settings))?;
    let extractor = MfccExtractor::new(resolved.extraction)?;
    let app = App::new(NopAcquirer, extractor, resolved.extraction);
    let result = app.extract(&args.audio_file, args.out.as_deref())?;
    match OutputMode::from_json_flag(args.json) {
        OutputMode::Json if args.out.is_some() => {
            JsonOutput::print_extract(&result).into_diagnostic()?
        }
        _ => TextOutput::print_extract(&result).into_diagnostic()?,
    }
    Ok(())
}

fn run_clear(args: ClearArgs) -> miette::Result<()> {
    let resolved = resolve(args.config.as_deref(), args.output_dir, None)?;
    let store = DatasetStore::new(&resolved.output_dir)?;
    match OutputMode::from_json_flag(args.json) {
        OutputMode::Json => {
            let result = app::clear(&store, &JsonOutput)?;
            JsonOutput::print_clear(&result).into_diagnostic()?;
        }
        OutputMode::Text => {
            let result = app::clear(&store, &TextOutput)?;
            TextOutput::print_clear(&result).into_diagnostic()?;
        }
    }
    Ok(())
}

struct NopAcquirer;

impl Acquirer for NopAcquirer {
    fn acquire(
        &self,
        locator: &Locator,
        _stem: &str,
        _destination_dir: &Path,
    ) -> Result<AcquiredAudio, DatasetError> {
        Err(DatasetError::acquisition(locator, "acquisition not configured"))
    }
}
