use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use nomen_core::config::{ConfigLoader, LoggingConfig, NomenConfig};
use nomen_core::requests::{load_terms_file, sanitize_terms};
use nomen_core::{
    AssemblerFactory, CsvExporter, ResolutionMode, TabularExporter, TermDictionary,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG: &str = "nomen.yaml";

#[derive(Parser, Debug)]
#[clap(
    name = "nomen",
    author,
    version,
    about = "Resolve cross-referenced Gold Book definitions into a flat CSV"
)]
struct Cli {
    #[clap(long, short, help = "Configuration file (default: nomen.yaml when present)")]
    config: Option<PathBuf>,

    #[clap(long, short, help = "Terminology dictionary JSON file")]
    dictionary: Option<PathBuf>,

    #[clap(long, short = 't', help = "Requested term title; may be repeated")]
    term: Vec<String>,

    #[clap(long, short = 'f', help = "File of requested terms, one per line (first CSV field)")]
    terms_file: Option<PathBuf>,

    #[clap(long, short, help = "Output CSV file")]
    output: Option<PathBuf>,

    #[clap(long, help = "Cross-reference resolution: local, external or auto")]
    mode: Option<String>,

    #[clap(long, help = "Skip definition fetching and emit metadata only")]
    metadata_only: bool,

    #[clap(long, help = "Number of entries processed concurrently")]
    concurrency: Option<usize>,

    #[clap(long, help = "Exit with an error if any requested term failed")]
    strict: bool,

    #[clap(long, short, help = "Log level (overrides the config file)")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config_path(cli.config.as_deref(), Path::new(DEFAULT_CONFIG));
    let mut config = match &config_path {
        Some(path) => ConfigLoader::from_file(path).await?,
        None => NomenConfig::default(),
    };
    apply_overrides(&mut config, &cli)?;
    config.validate()?;

    init_logging(cli.log_level.as_deref(), &config.logging)?;
    match &config_path {
        Some(path) => log::info!("Loaded configuration from {}", path.display()),
        None => log::debug!("No {} found, using default configuration", DEFAULT_CONFIG),
    }

    let terms = collect_terms(&config).await?;
    if terms.is_empty() {
        anyhow::bail!("No terms requested. Use --term or --terms-file.");
    }

    let dictionary = Arc::new(TermDictionary::from_file(&config.dictionary.path).await?);
    let assembler = AssemblerFactory::create_from_config(&config, dictionary)?;

    log::info!("Resolving {} requested terms", terms.len());
    let report = assembler.assemble(&terms).await;

    let exporter = CsvExporter::new(&config.output.path);
    exporter.export(&report.rows)?;
    println!("CSV file '{}' created successfully.", exporter.path().display());
    print!("{}", report);

    if cli.strict && report.has_failures() {
        anyhow::bail!("{} requested entries failed", report.failures.len());
    }
    Ok(())
}

// An explicit path must exist; the default file is optional
fn config_path(explicit: Option<&Path>, default: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default.is_file().then(|| default.to_path_buf()),
    }
}

fn apply_overrides(config: &mut NomenConfig, cli: &Cli) -> Result<()> {
    if let Some(dictionary) = &cli.dictionary {
        config.dictionary.path = dictionary.clone();
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    // Terms given on the command line replace the configured request list
    if !cli.term.is_empty() || cli.terms_file.is_some() {
        config.requests.terms = cli.term.clone();
        config.requests.file = cli.terms_file.clone();
    }
    if let Some(mode) = &cli.mode {
        config.resolution.mode = mode.parse::<ResolutionMode>()?;
    }
    if cli.metadata_only {
        config.fetch.metadata_only = true;
    }
    if let Some(concurrency) = cli.concurrency {
        config.fetch.concurrency = concurrency;
    }
    Ok(())
}

fn init_logging(cli_level: Option<&str>, logging: &LoggingConfig) -> Result<()> {
    let level = cli_level.unwrap_or(&logging.level);
    let log_level_filter = level.parse().unwrap_or(LevelFilter::Info);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level_filter);

    if let Some(path) = &logging.file {
        use std::fs::OpenOptions;

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open log file '{}': {}", path.display(), e))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

async fn collect_terms(config: &NomenConfig) -> Result<Vec<String>> {
    let mut terms = sanitize_terms(&config.requests.terms);
    if let Some(file) = &config.requests.file {
        terms.extend(load_terms_file(file).await?);
    }
    Ok(terms)
}
