//! Prosaic CLI - A command-line linter for prose.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use prosaic::check::EXTENSION_POINTS;
use prosaic::output::{JsonFormatter, LineFormatter, OutputFormatter, TextFormatter};
use prosaic::{Config, Linter, Registry, Severity};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "prosaic",
    version,
    about = "A command-line linter for prose",
    long_about = "A fast, extensible linter for prose. Rules are YAML manifests grouped \
                  into styles; documents are scoped by format (Markdown, HTML, source \
                  comments, plain text) and every alert carries an exact location."
)]
struct Cli {
    /// Files, directories, or glob patterns to lint (stdin when empty)
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Restrict directory walks to a glob pattern (e.g., '*.md')
    #[arg(long, default_value = "*")]
    glob: String,

    /// Output style
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputStyle,

    /// The lowest alert level to report
    #[arg(long, value_enum)]
    min_alert_level: Option<MinLevel>,

    /// Extension to associate with stdin input
    #[arg(long, default_value = ".txt")]
    ext: String,

    /// Don't return a nonzero exit code on alerts
    #[arg(long)]
    no_exit: bool,

    /// Sort files by path in output
    #[arg(long)]
    sort: bool,

    /// Lint all files as plain prose, ignoring markup structure
    #[arg(long)]
    ignore_syntax: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Number of worker threads (0 = auto)
    #[arg(short, long, default_value = "0")]
    jobs: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a YAML template for the given extension point
    NewRule {
        /// One of the ten rule kinds (e.g., existence, substitution)
        kind: String,
    },
    /// Print the resolved configuration
    LsConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputStyle {
    Text,
    Line,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum MinLevel {
    Suggestion,
    Warning,
    Error,
}

impl From<MinLevel> for Severity {
    fn from(level: MinLevel) -> Self {
        match level {
            MinLevel::Suggestion => Severity::Suggestion,
            MinLevel::Warning => Severity::Warning,
            MinLevel::Error => Severity::Error,
        }
    }
}

/// Starter manifest for each extension point.
fn template_for(kind: &str) -> Option<&'static str> {
    let template = match kind {
        "existence" => {
            "extends: existence\nmessage: \"Consider removing '%s'.\"\nlevel: warning\nignorecase: false\ntokens:\n  - appears to be\n  - arguably\n"
        }
        "substitution" => {
            "extends: substitution\nmessage: \"Use '%s' instead of '%s'.\"\nlevel: warning\nignorecase: false\nswap:\n  abundance: plenty\n  accelerate: speed up\n"
        }
        "occurrence" => {
            "extends: occurrence\nmessage: \"More than 3 commas!\"\nlevel: error\nmax: 3\ntoken: ','\n"
        }
        "repetition" => {
            "extends: repetition\nmessage: \"'%s' is repeated!\"\nlevel: error\nalpha: true\ntokens:\n  - '[^\\s]+'\n"
        }
        "consistency" => {
            "extends: consistency\nmessage: \"Inconsistent spelling of '%s'.\"\nlevel: error\nignorecase: true\neither:\n  advisor: adviser\n  centre: center\n"
        }
        "conditional" => {
            "extends: conditional\nmessage: \"'%s' has no definition.\"\nlevel: error\nfirst: '\\b([A-Z]{3,5})\\b'\nsecond: '(?:\\b[A-Z][a-z]+ )+\\(([A-Z]{3,5})\\)'\n"
        }
        "capitalization" => {
            "extends: capitalization\nmessage: \"'%s' should be in title case.\"\nlevel: warning\nscope: text.heading\nmatch: $title\nstyle: AP\n"
        }
        "readability" => {
            "extends: readability\nmessage: \"Grade level (%s) too high!\"\nlevel: warning\ngrade: 8\nmetrics:\n  - Flesch-Kincaid\n  - Gunning Fog\n"
        }
        "spelling" => {
            "extends: spelling\nmessage: \"Did you really mean '%s'?\"\nlevel: error\ndic: en_US.dic\n"
        }
        "sequence" => {
            "extends: sequence\nmessage: \"The preposition '%s' is repeated.\"\nlevel: warning\ntokens:\n  - pattern: of\n  - tag: DT\n  - pattern: of\n"
        }
        _ => return None,
    };
    Some(template)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    // Only a config-parse failure at startup is fatal.
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    config.merge_cli(cli.min_alert_level.map(Into::into), None);

    match &cli.command {
        Some(Commands::NewRule { kind }) => {
            match template_for(kind) {
                Some(template) => {
                    print!("{}", template);
                    return Ok(0);
                }
                None => {
                    anyhow::bail!(
                        "unknown extension point '{}' (expected one of: {})",
                        kind,
                        EXTENSION_POINTS.join(", ")
                    );
                }
            }
        }
        Some(Commands::LsConfig) => {
            print!("{}", serde_yaml::to_string(&config)?);
            return Ok(0);
        }
        None => {}
    }

    let no_exit = cli.no_exit;
    let output = cli.output;

    let registry = Registry::new(&config);
    let mut linter = Linter::new(config, registry);
    linter.sorted = cli.sort;
    linter.simple = cli.ignore_syntax;
    linter.jobs = cli.jobs;
    if cli.glob != "*" {
        linter.glob = Some(glob::Pattern::new(&cli.glob)?);
    }

    let files = if cli.files.is_empty() {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        vec![linter.lint_string(&buffer, &cli.ext)]
    } else {
        linter.lint(&cli.files)?
    };

    // Rule-load errors surface before alert output.
    let errors = linter.registry_errors();
    if !errors.is_empty() {
        match output {
            OutputStyle::Json => {
                let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                eprintln!("{}", serde_json::to_string(&rendered)?);
            }
            _ => {
                for error in errors {
                    eprintln!("{} {}", "error:".red().bold(), error);
                }
            }
        }
    }

    let formatter: Box<dyn OutputFormatter> = match output {
        OutputStyle::Text => Box::new(TextFormatter::new()),
        OutputStyle::Line => Box::new(LineFormatter::new()),
        OutputStyle::Json => Box::new(JsonFormatter::new()),
    };
    print!("{}", formatter.format(&files));

    let has_alerts = files.iter().any(|f| !f.alerts.is_empty());
    Ok(if has_alerts && !no_exit { 1 } else { 0 })
}
