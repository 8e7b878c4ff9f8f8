//! `healthdoc` command-line front end.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;

use healthdoc_analyzer::config::{AppConfig, APP_NAME, APP_VERSION};
use healthdoc_analyzer::pipeline::{
    guess_mime_type, render_compliance, render_narrative, AnalysisError, Analyzer, OpenAiClient,
};

#[derive(Parser, Debug)]
#[command(name = "healthdoc")]
#[command(version, about = "LLM-assisted HL7v2 message explanation and HIPAA compliance scoring")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Explain an HL7v2 message segment by segment
    Hl7 {
        /// File containing the message, or "-" to read stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },
    /// Score a PDF or plain-text document for HIPAA compliance
    Hipaa {
        /// Document to analyze
        path: PathBuf,

        /// MIME type of the document (guessed from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,

        /// Print the report as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    healthdoc_analyzer::init_tracing();

    let cli = Cli::parse();
    tracing::info!("{} v{} starting", APP_NAME, APP_VERSION);

    let analyzer = match startup() {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(startup_exit_code(&e));
        }
    };

    match run(&analyzer, cli.command) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Read configuration and build the analyzer around the HTTP client.
fn startup() -> Result<Analyzer, AnalysisError> {
    let config = AppConfig::from_env()?;
    let client = OpenAiClient::from_config(&config)?;
    Ok(Analyzer::new(Box::new(client), config.models))
}

/// Exit status for a failed startup: 2 for configuration, 1 otherwise.
fn startup_exit_code(error: &AnalysisError) -> u8 {
    match error {
        AnalysisError::Configuration(_) => 2,
        _ => 1,
    }
}

fn run(analyzer: &Analyzer, command: Command) -> Result<String, CliError> {
    match command {
        Command::Hl7 { input } => {
            let message = read_message(&input)?;
            eprintln!("Analyzing message...");
            let markdown = analyzer.analyze_hl7(&message)?;
            Ok(render_narrative(&markdown))
        }
        Command::Hipaa { path, mime, json } => {
            let bytes = std::fs::read(&path).map_err(|source| CliError::Read {
                path: path.display().to_string(),
                source,
            })?;
            let mime = mime.unwrap_or_else(|| guess_mime_type(&path));
            eprintln!("Analyzing document...");
            let report = analyzer.analyze_upload(&bytes, &mime)?;
            if json {
                Ok(format!("{}\n", serde_json::to_string_pretty(&report)?))
            } else {
                Ok(render_compliance(&report))
            }
        }
    }
}

fn read_message(input: &Path) -> Result<String, CliError> {
    if input == Path::new("-") {
        let mut message = String::new();
        std::io::stdin()
            .read_to_string(&mut message)
            .map_err(|source| CliError::Read {
                path: "stdin".into(),
                source,
            })?;
        Ok(message)
    } else {
        std::fs::read_to_string(input).map_err(|source| CliError::Read {
            path: input.display().to_string(),
            source,
        })
    }
}
