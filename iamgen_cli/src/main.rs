mod error;
mod logging;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use error::CliError;
use iamgen_core::locator::{self, DEFAULT_PROVIDER, DEFAULT_REGION, DEFAULT_STAGE};
use iamgen_core::{compile_files, write_policies, LocatorSet, OutputFormat};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

#[derive(Debug, Parser)]
#[command(name = "iamgen", version, about = "Generate auth config for infra resources")]
struct Cli {
    /// Log level
    #[arg(
        long,
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = PossibleValuesParser::new(logging::LOG_LEVELS)
    )]
    log_level: String,

    /// Deployment stage; one of "dev", "stg" or "prod"
    #[arg(short, long, default_value = DEFAULT_STAGE)]
    stage: String,

    /// Short region code, without provider suffix
    #[arg(short, long, default_value = DEFAULT_REGION)]
    region: String,

    /// Cloud provider (only "gcp" supported so far)
    #[arg(short, long, default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// A "name=value" binding for name substitution; may be repeated
    #[arg(short, long = "locator", value_name = "NAME=VALUE", value_parser = parse_locator)]
    locators: Vec<(String, String)>,

    /// TOML file of additional locator bindings, applied before --locator
    #[arg(long, value_name = "FILE")]
    locators_file: Option<PathBuf>,

    /// Path to apps YAML file
    #[arg(short, long, default_value = "./apps.yaml")]
    apps_file: PathBuf,

    /// Path to resource usage YAML file
    #[arg(short, long, default_value = "./resource-usage.yaml")]
    usage_file: PathBuf,

    /// Path to newline-delimited JSON output file (default: stdout)
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Indent each JSON record
    #[arg(long)]
    pretty: bool,

    /// Fail, writing nothing, if any diagnostics are reported
    #[arg(long)]
    strict: bool,
}

fn parse_locator(arg: &str) -> Result<(String, String), String> {
    locator::parse_binding(arg).map_err(|e| e.to_string())
}

fn build_locators(cli: &Cli) -> Result<LocatorSet, CliError> {
    let mut builder = LocatorSet::builder()
        .provider(&cli.provider)
        .region(&cli.region)
        .stage(&cli.stage);

    if let Some(path) = &cli.locators_file {
        builder = builder.bindings_from_file(path)?;
    }
    for (key, value) in &cli.locators {
        builder = builder.binding(key, value);
    }
    Ok(builder.build()?)
}

fn run(cli: Cli) -> Result<(), CliError> {
    debug!(flags = ?cli, "CLI flag summary");

    let locators = build_locators(&cli)?;
    let compilation = compile_files(&cli.apps_file, &cli.usage_file, &locators)?;

    compilation.diagnostics.log();
    if cli.strict && !compilation.diagnostics.is_empty() {
        return Err(CliError::Strict(compilation.diagnostics.len()));
    }

    let format = if cli.pretty {
        OutputFormat::Pretty
    } else {
        OutputFormat::Compact
    };

    let writer: Box<dyn Write> = match &cli.output_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Output {
                path: path.display().to_string(),
                source,
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let written = write_policies(writer, &compilation.policies, format)?;
    info!(written, "wrote resource policies");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
