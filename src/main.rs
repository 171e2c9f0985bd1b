use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use ripple_core::{OutputFormat, Prediction, RippleConfig};
use ripple_gitlog::{GitHistory, HistoryOptions};
use ripple_rules::{AssociationRuleExtractor, Pipeline};

#[derive(Parser)]
#[command(
    name = "ripple",
    version,
    about = "Co-change impact analysis from git history",
    long_about = "Ripple mines your git history for files that change together, and predicts\n\
                   which files the change you are working on is likely to touch next.\n\n\
                   Examples:\n  \
                     ripple predict src/auth.rs      Who usually changes with auth.rs?\n  \
                     ripple predict a.rs b.rs --min-confidence 0.5\n  \
                     ripple mcp --path .             Start the MCP server for IDE agents\n  \
                     ripple doctor                   Check setup and environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .ripple.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose diagnostics on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Predict which files are likely to change with the given ones
    #[command(
        long_about = "Predict which files are likely to change with the given ones.\n\n\
        Mines recent commits for transactions (sets of files changed together), keeps\n\
        the ones most similar to your query, and extracts association rules ranked by\n\
        confidence (co-change probability) and support (occurrence count).\n\n\
        Examples:\n  ripple predict src/auth.rs\n  ripple predict a.rs b.rs --min-support 2\n  ripple predict src/api.rs --path ../service --format json"
    )]
    Predict {
        /// Files already modified, relative to the repository root
        #[arg(required = true)]
        files: Vec<String>,

        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Minimum confidence in [0, 1] (default: 0.7, or the configured value)
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Minimum support count (default: 3, or the configured value)
        #[arg(long)]
        min_support: Option<u64>,

        /// Number of commits to mine, 0 for the full history
        #[arg(long)]
        max_commits: Option<usize>,

        /// Branch to walk (default: HEAD)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Start the MCP server for IDE integration
    #[command(
        long_about = "Start the MCP (Model Context Protocol) server for IDE integration.\n\n\
        Exposes the impact_analysis tool over stdio transport for use by AI coding\n\
        agents and IDE extensions.\n\n\
        Example:\n  ripple mcp --path /my/project"
    )]
    Mcp {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Create a default .ripple.toml configuration file
    #[command(long_about = "Create a default .ripple.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .ripple.toml already exists.")]
    Init,
    /// Check your Ripple setup and environment
    #[command(long_about = "Check your Ripple setup and environment.\n\n\
        Runs diagnostics for git repo, config file, and minable history.\n\
        Use --format json for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[34m◉\x1b[0m \x1b[1mripple\x1b[0m v{version} — files that change together, found before you forget one\n");

        println!("Quick start:");
        println!("  \x1b[36mripple predict src/auth.rs\x1b[0m    Who usually changes with auth.rs?");
        println!("  \x1b[36mripple mcp --path .\x1b[0m           Start the MCP server for IDE agents\n");

        println!("All commands:");
        println!("  \x1b[32mpredict\x1b[0m   Predict co-changing files for the files you touched");
        println!("  \x1b[32mmcp\x1b[0m       Start MCP server for IDE integration");
        println!("  \x1b[32minit\x1b[0m      Create default configuration");
        println!("  \x1b[32mdoctor\x1b[0m    Check your setup and environment\n");
    } else {
        println!("ripple v{version} — files that change together, found before you forget one\n");

        println!("Quick start:");
        println!("  ripple predict src/auth.rs    Who usually changes with auth.rs?");
        println!("  ripple mcp --path .           Start the MCP server for IDE agents\n");

        println!("All commands:");
        println!("  predict   Predict co-changing files for the files you touched");
        println!("  mcp       Start MCP server for IDE integration");
        println!("  init      Create default configuration");
        println!("  doctor    Check your setup and environment\n");
    }
}

const DEFAULT_CONFIG: &str = r#"# Ripple Configuration
# See: https://github.com/ripple-dev/ripple

[history]
# Number of commits to mine (0 = full history)
# max_commits = 200
# Commits touching more files than this are ignored as noise
# max_changed_files = 30
# Branch to walk (default: HEAD)
# branch = "main"

[mining]
# Minimum co-change probability for a prediction, 0.0 to 1.0
# min_confidence = 0.7
# Minimum number of historical co-occurrences
# min_support = 3
"#;

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn run_doctor(config: &RippleConfig, format: OutputFormat, use_color: bool) -> Result<()> {
    use ripple_rules::TransactionSource;

    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Git repository
    let mut git_root = None;
    let cwd = std::env::current_dir().into_diagnostic()?;
    let mut dir = cwd.as_path();
    loop {
        if dir.join(".git").exists() {
            git_root = Some(dir.to_path_buf());
            break;
        }
        let Some(parent) = dir.parent() else {
            break;
        };
        dir = parent;
    }
    match &git_root {
        Some(root) => checks.push(CheckResult::pass(
            "git_repository",
            format!("detected at {}", root.display()),
        )),
        None => checks.push(CheckResult::fail(
            "git_repository",
            "not a git repository",
            "run ripple from inside a git repository",
        )),
    }

    // 2. Config file
    let config_path = std::path::Path::new(".ripple.toml");
    if config_path.exists() {
        checks.push(CheckResult::pass("config_file", ".ripple.toml found"));
    } else {
        checks.push(CheckResult::info(
            "config_file",
            ".ripple.toml not found, using defaults (run `ripple init` to create one)",
        ));
    }

    // 3. Minable history
    if let Some(root) = &git_root {
        let source = GitHistory::new(
            root.clone(),
            HistoryOptions {
                max_commits: config.history.max_commits,
                branch: config.history.branch.clone(),
            },
        );
        match source.transactions() {
            Ok(log) => checks.push(CheckResult::pass(
                "history",
                format!(
                    "{} transaction(s) mined across {} file(s)",
                    log.transactions.len(),
                    log.paths.len()
                ),
            )),
            Err(e) => checks.push(CheckResult::fail(
                "history",
                format!("mining failed: {e}"),
                "does the repository have any commits?",
            )),
        }
    }

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&checks).into_diagnostic()?
            );
        }
        _ => {
            println!("ripple doctor\n");
            for check in &checks {
                let symbol = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                println!("  {symbol} {}: {}", check.name, check.detail);
                if let Some(hint) = &check.hint {
                    println!("      hint: {hint}");
                }
            }
            let failures = checks.iter().filter(|c| c.status == "fail").count();
            if failures == 0 {
                println!("\nAll checks passed.");
            } else {
                println!("\n{failures} check(s) failed.");
            }
        }
    }

    Ok(())
}

fn print_predictions(
    predictions: &[Prediction],
    format: OutputFormat,
    min_confidence: f64,
    min_support: u64,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(predictions).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("# Co-change predictions\n");
            if predictions.is_empty() {
                println!(
                    "No candidates with confidence >= {min_confidence} and support >= {min_support}."
                );
            } else {
                println!("| File | Confidence | Support |");
                println!("|------|-----------:|--------:|");
                for p in predictions {
                    println!("| {} | {:.3} | {} |", p.path, p.confidence, p.support);
                }
            }
        }
        OutputFormat::Text => {
            if predictions.is_empty() {
                println!(
                    "No co-change candidates with confidence >= {min_confidence} and support >= {min_support}."
                );
                println!("Try lowering --min-confidence or --min-support.");
            } else {
                println!("{:>10}  {:>7}  FILE", "CONFIDENCE", "SUPPORT");
                for p in predictions {
                    println!("{:>10.3}  {:>7}  {}", p.confidence, p.support, p.path);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries results and, in MCP mode,
    // the protocol transport.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RIPPLE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => RippleConfig::from_file(path).into_diagnostic()?,
        None => {
            let default_path = std::path::Path::new(".ripple.toml");
            if default_path.exists() {
                RippleConfig::from_file(default_path).into_diagnostic()?
            } else {
                RippleConfig::default()
            }
        }
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Predict {
            ref files,
            ref path,
            min_confidence,
            min_support,
            max_commits,
            ref branch,
        }) => {
            let min_confidence = min_confidence.unwrap_or(config.mining.min_confidence);
            let min_support = min_support.unwrap_or(config.mining.min_support);
            if !(0.0..=1.0).contains(&min_confidence) {
                miette::bail!("--min-confidence must be within [0, 1], got {min_confidence}");
            }

            // Hint: not a git repository
            if !path.join(".git").exists() && git2::Repository::open(path).is_err() {
                miette::bail!(miette::miette!(
                    help = "Run ripple from a repository root, or point --path at one",
                    "Not a git repository: {}",
                    path.display()
                ));
            }

            let source = GitHistory::new(
                path.clone(),
                HistoryOptions {
                    max_commits: max_commits.unwrap_or(config.history.max_commits),
                    branch: branch.clone().or_else(|| config.history.branch.clone()),
                },
            );
            let pipeline = Pipeline::standard(
                config.history.max_changed_files,
                AssociationRuleExtractor::new(min_confidence, min_support),
            );

            let predictions = pipeline.execute(&source, files).into_diagnostic()?;
            print_predictions(&predictions, cli.format, min_confidence, min_support)?;
        }
        Some(Command::Mcp { ref path }) => {
            ripple_mcp::server::run_server(path.clone(), config).await.into_diagnostic()?;
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".ripple.toml");
            if path.exists() {
                miette::bail!(".ripple.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .ripple.toml with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ripple", &mut std::io::stdout());
        }
    }

    Ok(())
}
