use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use pricecraft_core::writer::validate_template;
use pricecraft_core::{Session, ToolConfig};
use regex::Regex;
use std::io::Read;
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "priceup")]
#[command(about = "Validate pasted SKU/price rows against the reference sheet and fill the bulk upload template", long_about = None)]
#[command(version)]
struct Cli {
    /// File with the pasted rows, one `SKU<TAB>New Price` per line ('-' for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Reference Google Sheet link (overrides the configuration)
    #[arg(short, long, value_name = "URL")]
    sheet_url: Option<String>,

    /// Upload template path (overrides the configuration)
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, conflicts_with = "name")]
    output: Option<PathBuf>,

    /// Output file name; sanitized, `.xlsx` appended when missing
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Proceed even if some SKUs are unpublished (include them in the file)
    #[arg(long)]
    confirm_unpublished: bool,

    /// Validate only; do not write the output file
    #[arg(long)]
    check: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        ToolConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("priceup.toml");
        if default_config_path.exists() {
            ToolConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            ToolConfig::default()
        }
    };

    if let Some(url) = cli.sheet_url {
        config.sheet_url = url;
    }
    if let Some(template) = cli.template {
        config.template_path = template;
    }

    if !cli.check {
        validate_template(&config.template_path).with_context(|| {
            format!(
                "Upload template is unusable: {}",
                config.template_path.display()
            )
        })?;
    }

    let text = read_input(&cli.input)?;

    let mut session = Session::new(config);
    session
        .paste(&text)
        .context("Failed to parse the pasted rows")?;
    session.confirm_unpublished(cli.confirm_unpublished);
    session.refresh()?;

    let report = session.report().unwrap();
    match cli.format {
        OutputFormat::Human => formatter::print_human(report, cli.confirm_unpublished),
        OutputFormat::Json => formatter::print_json(report, cli.confirm_unpublished)?,
    }

    if cli.check {
        std::process::exit(if report.has_hard_fail() { 1 } else { 0 });
    }

    if !session.can_download() {
        // The formatter already explained what blocks the download
        std::process::exit(1);
    }

    let output_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(output_file_name(cli.name.as_deref())));
    session
        .download(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("Wrote {}", output_path.display());
    Ok(())
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))
    }
}

/// Resolve the output file name: custom name sanitized, or the dated default.
fn output_file_name(custom: Option<&str>) -> String {
    let default_name = format!("walmart_price_update_{}", Local::now().format("%Y%m%d"));
    let name = custom
        .map(sanitize_filename)
        .filter(|s| !s.is_empty())
        .unwrap_or(default_name);
    if name.to_lowercase().ends_with(".xlsx") {
        name
    } else {
        format!("{name}.xlsx")
    }
}

/// Strip everything but word characters, hyphens and spaces, then collapse
/// whitespace runs into underscores.
fn sanitize_filename(name: &str) -> String {
    let strip = Regex::new(r"[^\w\- ]+").unwrap();
    let spaces = Regex::new(r"\s+").unwrap();
    let cleaned = strip.replace_all(name.trim(), "");
    spaces.replace_all(cleaned.trim(), "_").to_string()
}
