//! lispytex command line interface
//!
//! # Usage
//!
//! ```bash
//! # Expand every macro block of a document
//! lispytex expand paper.tex -o paper.out.tex
//!
//! # Expand a single block
//! lispytex eval '(frac! (+ a b) 2)'
//!
//! # Inspect the parser and tokenizer
//! echo '(begin! center x)' | lispytex parse --format json
//! lispytex tokens '(quote "a" ; note)'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use lispytex::{expand_block, parse_block, tokenize, ConfigLoader, Environment, Expander};

#[derive(Parser)]
#[command(name = "lispytex")]
#[command(version)]
#[command(about = "Expand s-expression macros embedded in LaTeX comments")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (falls back to ./lispytex.yaml)
    #[arg(long, global = true, env = "LISPYTEX_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand every macro block of a document
    Expand {
        /// Input document (reads stdin if not provided)
        file: Option<PathBuf>,

        /// Output file (writes stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Expand the expressions of a single block
    Eval {
        /// Block source (reads stdin if not provided)
        expr: Option<String>,

        /// Nesting level of the block
        #[arg(long, default_value_t = 0)]
        level: usize,

        /// Extra spaces added to every layout line
        #[arg(long, default_value_t = 0)]
        base: usize,
    },

    /// Print the expression tree of a block
    Parse {
        /// Block source (reads stdin if not provided)
        expr: Option<String>,

        #[arg(long, default_value = "text", value_enum)]
        format: OutputFormat,
    },

    /// Print the token stream of a block
    Tokens {
        /// Block source (reads stdin if not provided)
        expr: Option<String>,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Expand { file, output } => cmd_expand(cli.config, file, output),
        Commands::Eval { expr, level, base } => cmd_eval(cli.config, expr, level, base),
        Commands::Parse { expr, format } => cmd_parse(expr, format),
        Commands::Tokens { expr } => cmd_tokens(expr),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_expand(config: Option<PathBuf>, file: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = ConfigLoader::from_env(config).load()?;
    let document = read_document(file.as_ref())?;

    let expanded = Expander::new(config).expand_document(&document)?;

    match output {
        Some(path) => std::fs::write(&path, expanded)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{expanded}"),
    }
    Ok(())
}

fn cmd_eval(config: Option<PathBuf>, expr: Option<String>, level: usize, base: usize) -> Result<()> {
    let config = ConfigLoader::from_env(config).load()?;
    let source = read_source(expr)?;

    let mut env = Environment::new();
    let markup = expand_block(&mut env, &source, level, base, config.indent_width)?;
    println!("{markup}");
    Ok(())
}

fn cmd_parse(expr: Option<String>, format: OutputFormat) -> Result<()> {
    let source = read_source(expr)?;
    let exprs = parse_block(&source)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&exprs)?);
        }
        OutputFormat::Text => {
            for expr in &exprs {
                println!("{}", expr.to_source());
            }
        }
    }
    Ok(())
}

fn cmd_tokens(expr: Option<String>) -> Result<()> {
    let source = read_source(expr)?;
    for token in tokenize(&source) {
        println!(
            "{:>4}..{:<4} {}",
            token.span.start,
            token.span.end,
            serde_json::to_string(&token.kind)?
        );
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn read_document(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => read_stdin(),
    }
}

fn read_source(expr: Option<String>) -> Result<String> {
    match expr {
        Some(expr) => Ok(expr),
        None => read_stdin(),
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}
