mod app;
mod commands;
mod config;

use anyhow::Result;
use app::{App, CloseChoice, Prompt};
use clap::Parser;
use colored::Colorize;
use config::Config;
use quire_workspace::RealFileSystem;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Quire - multi-document text and XML editor
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workspace root; every opened file must live below it
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file (default: <root>/quire.config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with an empty workspace
    #[arg(long)]
    no_restore: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Reads the close confirmation from stdin
struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm_close(&mut self, path: &Path) -> CloseChoice {
        print!("{} has unsaved changes, save changes? (y/n/c) ", path.display());
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return CloseChoice::Cancel;
        }
        match answer.trim() {
            "y" | "Y" => CloseChoice::Save,
            "n" | "N" => CloseChoice::Discard,
            _ => CloseChoice::Cancel,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref(), &cli.root)?;
    let mut app = App::new(RealFileSystem, &cli.root, &config);

    println!("{}", "Quire - text and XML editor".bright_blue().bold());
    println!("Type 'help' for commands, 'exit' to quit");
    if config.restore_on_start && !cli.no_restore {
        let restored = app.restore();
        if restored > 0 {
            println!("  {} Restored {} document(s)", "✓".green(), restored);
        }
    }

    let stdin = io::stdin();
    loop {
        match app.session().workspace().active_path() {
            Some(active) => print!("[{}]> ", active.display()),
            None => print!("> "),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // End of input behaves like `exit`
            for line in app.exit().lines {
                println!("{line}");
            }
            return Ok(());
        }

        match app.handle(&line, &mut StdinPrompt) {
            Ok(reply) => {
                for line in &reply.lines {
                    println!("{line}");
                }
                if reply.exit {
                    return Ok(());
                }
            }
            Err(err) => eprintln!("{} {}", "Error:".red().bold(), err),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
