mod commands;
mod runner;
mod serve;
mod submit_http;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use commands::inspect::cmd_inspect;
use commands::validate::cmd_validate;
use runner::{cmd_run, RunOptions};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Intake form engine toolchain.
#[derive(Parser)]
#[command(name = "intake", version, about = "Intake form engine toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a form schema document against the formal JSON Schema
    Validate {
        /// Path to the form schema JSON file
        form: PathBuf,
    },

    /// Summarize a form schema: sections, fields, visibility conditions
    Inspect {
        /// Path to the form schema JSON file
        form: PathBuf,
    },

    /// Fill a form interactively in the terminal (flash mode, resumable)
    Run {
        /// Path to the form schema JSON file
        form: PathBuf,
        /// Access token from the form link
        #[arg(long)]
        token: String,
        /// Directory for draft snapshots
        #[arg(long, default_value = ".intake-drafts")]
        draft_dir: PathBuf,
        /// Submission endpoint base URL; omit to print the answer set instead
        #[arg(long)]
        submit_url: Option<String>,
    },

    /// Start the submission HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Path to the serve config (TOML) listing form files and tokens
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { form } => {
            cmd_validate(&form, cli.output, cli.quiet);
        }
        Commands::Inspect { form } => {
            cmd_inspect(&form, cli.output, cli.quiet);
        }
        Commands::Run {
            form,
            token,
            draft_dir,
            submit_url,
        } => {
            cmd_run(RunOptions {
                form: &form,
                token: &token,
                draft_dir: &draft_dir,
                submit_url: submit_url.as_deref(),
                output: cli.output,
                quiet: cli.quiet,
            });
        }
        Commands::Serve { port, config } => {
            let serve_config = match serve::config::load_config(&config) {
                Ok(c) => c,
                Err(e) => {
                    report_error(&e, cli.output, cli.quiet);
                    process::exit(1);
                }
            };
            let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
            if let Err(e) = rt.block_on(serve::start_server(port, serve_config)) {
                eprintln!("server error: {}", e);
                process::exit(1);
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
