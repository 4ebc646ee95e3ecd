//! referral CLI - converts HL7 v2 REF^I12 messages into referral JSON documents
//!
//! Reads ER7 (pipe-delimited) or pre-parsed JSON messages, builds the
//! referral document and delivers it to the configured output directory.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use refjson::runtime::{ChannelConfig, ChannelMap, ReferralTransformer};
use refjson::{er7, extract_all, FileWriter, Hl7Message, NdjsonWriter, ReferralFields};

#[derive(Parser)]
#[command(name = "referral")]
#[command(version, about = "Convert HL7 v2 REF^I12 referral messages into JSON documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one message and deliver the document
    Convert {
        /// Path to the message file
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (default: json for *.json files, er7 otherwise)
        #[arg(short, long, value_enum)]
        format: Option<InputFormat>,

        /// Path to channel configuration YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the document instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Convert every *.hl7 file in a directory and print NDJSON
    Batch {
        /// Directory containing ER7 message files
        #[arg(short, long)]
        input_dir: PathBuf,
    },

    /// Show every extracted address and its value
    Fields {
        /// Path to the message file
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (default: json for *.json files, er7 otherwise)
        #[arg(short, long, value_enum)]
        format: Option<InputFormat>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Pipe-delimited HL7 text
    Er7,
    /// Segment -> field -> component JSON tree
    Json,
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            format,
            config,
            output_dir,
            stdout,
        } => convert(input, format, config, output_dir, stdout),
        Commands::Batch { input_dir } => batch(input_dir),
        Commands::Fields { input, format } => fields(input, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Load channel configuration: file (or defaults), then environment overrides.
fn load_config(path: Option<PathBuf>) -> Result<ChannelConfig, String> {
    let config = match path {
        Some(path) => ChannelConfig::load_from_file(&path)?,
        None => ChannelConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn read_message(path: &Path, format: Option<InputFormat>) -> Result<Hl7Message, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let format = format.unwrap_or_else(|| {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Er7,
        }
    });

    match format {
        InputFormat::Er7 => er7::parse(&contents)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e)),
        InputFormat::Json => Hl7Message::from_json_str(&contents)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e)),
    }
}

/// Convert one message and deliver it
fn convert(
    input: PathBuf,
    format: Option<InputFormat>,
    config: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    stdout: bool,
) -> Result<(), String> {
    let mut config = load_config(config)?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let message = read_message(&input, format)?;
    let transformer = ReferralTransformer::new(config);
    let mut channel_map = ChannelMap::new();

    let output = transformer
        .process(&message, &mut channel_map)
        .map_err(|e| format!("Failed to build document: {}", e))?;

    if stdout {
        println!("{}", output.json);
        return Ok(());
    }

    let config = transformer.config();
    let payload = channel_map
        .get(&config.output_key)
        .ok_or_else(|| format!("Output slot '{}' was not filled", config.output_key))?;

    let file_name = config.render_file_name(&output.document);
    let delivery = FileWriter::new(&config.output_dir)
        .write(&file_name, payload)
        .map_err(|e| format!("Failed to write {}: {}", file_name, e))?;

    println!("  ✓ Wrote {} ({} bytes)", delivery.path.display(), delivery.bytes);
    Ok(())
}

/// Convert every *.hl7 file in a directory, one NDJSON line per document
fn batch(input_dir: PathBuf) -> Result<(), String> {
    let mut files: Vec<PathBuf> = fs::read_dir(&input_dir)
        .map_err(|e| format!("Failed to read directory {}: {}", input_dir.display(), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("hl7"))
        })
        .collect();
    files.sort();

    let transformer = ReferralTransformer::default();
    let stdout = io::stdout();
    let mut writer = NdjsonWriter::new(stdout.lock());
    let mut failed = 0;

    for path in &files {
        let result = read_message(path, Some(InputFormat::Er7)).and_then(|message| {
            let output = transformer
                .transform(&message)
                .map_err(|e| format!("Failed to build document for {}: {}", path.display(), e))?;
            writer
                .write(&output.document)
                .map_err(|e| format!("Failed to write document for {}: {}", path.display(), e))
        });

        if let Err(e) = result {
            tracing::warn!("{}", e);
            failed += 1;
        }
    }

    writer.flush().map_err(|e| format!("Failed to flush output: {}", e))?;

    tracing::info!(total = files.len(), failed, "batch finished");

    if failed > 0 {
        return Err(format!("{} of {} messages failed", failed, files.len()));
    }
    Ok(())
}

/// Print every address with its extracted value
fn fields(input: PathBuf, format: Option<InputFormat>) -> Result<(), String> {
    let message = read_message(&input, format)?;

    let addresses = ReferralFields::addresses();
    let paths: Vec<_> = addresses.iter().map(|(_, path)| path.clone()).collect();
    let values = extract_all(&message, &paths);

    for ((name, path), value) in addresses.iter().zip(values) {
        println!("{:<10} {:<28} {}", path.component_tag(), name, value);
    }
    Ok(())
}
