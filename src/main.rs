use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use redline::cli::output::OutputFormat;
use redline::provider::HttpChecker;
use redline::{checker, cli, Config};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "redline")]
#[command(version, about = "Grammar and spelling checker backed by a remote edits API", long_about = None)]
struct Cli {
    /// Files to check
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Apply every suggested correction in place
    #[arg(short, long)]
    fix: bool,

    /// Interactive mode for selecting corrections
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if issues are found
    #[arg(long)]
    no_fail: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Edits API endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// Edits API key
    #[arg(long, env = "REDLINE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Provider rule id to suppress (regex)
    #[arg(long)]
    ignore_rule: Vec<String>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "redline", &mut io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = Config::load(
        cli.api_url.clone(),
        cli.api_key.clone(),
        cli.ignore_rule.clone(),
    )?;

    // Validate input files
    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    // Initialize checker
    let provider = HttpChecker::new(&config)
        .context("Grammar service is not configured (set --api-key or REDLINE_API_KEY)")?;
    let checker = checker::GrammarChecker::new(Box::new(provider), &config)?;

    // Process files
    let mut total_errors = 0;
    let mut total_fixed = 0;

    for file_path in &cli.files {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        let result = if cli.fix {
            if cli.interactive {
                checker.fix_interactive(file_path, &config, !cli.no_color)?
            } else {
                checker.fix_auto(file_path, &config, !cli.no_color)?
            }
        } else {
            checker.check(file_path, &config, !cli.no_color, &cli.format)?
        };

        total_errors += result.error_count;
        total_fixed += result.fixed_count;
    }

    // Print summary
    if cli.fix {
        cli::output::print_fix_summary(total_fixed, &cli.files, !cli.no_color);
    } else {
        cli::output::print_check_summary(total_errors, &cli.files, !cli.no_color);
    }

    // Exit with appropriate code
    if total_errors > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}
