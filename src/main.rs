//! spag CLI - templated HTTP request files
//!
//! Logging goes to stderr and is controlled by `SPAG_LOG` (default `warn`),
//! so stdout only ever carries command output.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use spag::commands::{self, CommandError, RequestOptions, Workspace};
use spag::config::load_config;
use spag::files;

#[derive(Parser)]
#[command(name = "spag")]
#[command(about = "spag - reusable, templated HTTP request files")]
#[command(version)]
struct Cli {
    /// Directory holding environments, remembers and history
    #[arg(long, global = true, value_name = "DIR")]
    spag_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or prepare a request file
    Request {
        /// Request name, e.g. `things/get`
        name: Option<String>,

        /// Directory to look for request files in
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Print the raw file instead of preparing it
        #[arg(long)]
        show: bool,

        /// Template binding, key=value
        #[arg(short, long = "with", value_name = "KEY=VALUE")]
        withs: Vec<String>,

        /// Endpoint to use instead of the environment's
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Extra header, Key:Value
        #[arg(short = 'H', long = "header", value_name = "KEY:VALUE")]
        headers: Vec<String>,

        /// Body to send instead of the file's
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Describe the placeholders of a request file
    Params {
        name: String,

        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Untemplate a piece of text
    Render {
        text: String,

        #[arg(short, long = "with", value_name = "KEY=VALUE")]
        withs: Vec<String>,

        /// Leave `@` shortcuts alone
        #[arg(long)]
        no_shortcuts: bool,
    },

    /// Manage environments
    #[command(subcommand)]
    Env(EnvCommands),

    /// Show recorded requests
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },

    /// Import a captured exchange into the remembers and history
    Record {
        /// YAML file with `request` and `response` sections
        file: PathBuf,

        /// Also remember the exchange under this name
        #[arg(long = "as", value_name = "NAME")]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum EnvCommands {
    /// Make an environment the active one
    Activate { name: String },

    /// Go back to the default environment
    Deactivate,

    /// Print an environment (the active one by default)
    Show { name: Option<String> },

    /// Set values in the active environment
    Set {
        /// Values to set, key=value (dotted keys allowed)
        #[arg(value_name = "KEY=VALUE")]
        assignments: Vec<String>,

        /// Default header, Key:Value
        #[arg(short = 'H', long = "header", value_name = "KEY:VALUE")]
        headers: Vec<String>,
    },

    /// Remove values from the active environment
    Unset {
        key: Option<String>,

        /// Remove everything
        #[arg(long)]
        everything: bool,
    },

    /// List environments
    List,
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List recorded requests, newest first
    List,

    /// Show one recorded request and its response
    Show { index: String },

    /// Forget every recorded request
    Clear,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SPAG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn run(cli: Cli) -> Result<(), CommandError> {
    let config = load_config(cli.spag_dir)?;
    let ws = Workspace::new(config);

    match cli.command {
        Commands::Request {
            name,
            dir,
            show,
            withs,
            endpoint,
            headers,
            data,
        } => match name {
            None => print_lines(&commands::list_requests(&ws, dir.as_deref())?),
            Some(name) if show => print!("{}", commands::show_request(&ws, &name, dir.as_deref())?),
            Some(name) => {
                let options = RequestOptions {
                    withs,
                    endpoint,
                    headers,
                    data,
                };
                print!("{}", commands::prepare_request(&ws, &name, dir.as_deref(), &options)?);
            }
        },
        Commands::Params { name, dir } => {
            for param in commands::request_params(&ws, &name, dir.as_deref())? {
                println!("{}", param);
            }
        }
        Commands::Render {
            text,
            withs,
            no_shortcuts,
        } => println!("{}", commands::render(&ws, &text, &withs, !no_shortcuts)?),
        Commands::Env(command) => match command {
            EnvCommands::Activate { name } => println!("{}", commands::env_activate(&ws, &name)?),
            EnvCommands::Deactivate => println!("{}", commands::env_deactivate(&ws)?),
            EnvCommands::Show { name } => print!("{}", commands::env_show(&ws, name.as_deref())?),
            EnvCommands::Set {
                assignments,
                headers,
            } => print!("{}", commands::env_set(&ws, &assignments, &headers)?),
            EnvCommands::Unset { key, everything } => {
                print!("{}", commands::env_unset(&ws, key.as_deref(), everything)?)
            }
            EnvCommands::List => print_lines(&commands::env_list(&ws)?),
        },
        Commands::History { command } => match command.unwrap_or(HistoryCommands::List) {
            HistoryCommands::List => print_lines(&commands::history_list(&ws)?),
            HistoryCommands::Show { index } => {
                print!("{}", commands::history_show(&ws, &index)?)
            }
            HistoryCommands::Clear => println!("{}", commands::history_clear(&ws)?),
        },
        Commands::Record { file, name } => {
            let text = files::read_file(&file)?;
            println!("{}", commands::record(&ws, &text, name.as_deref())?);
        }
    }

    Ok(())
}
