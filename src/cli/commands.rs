use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use strsim::levenshtein;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::conditions::{self, DiagnosticSink, EditConditionParser, ErrorReporter, EvalError};
use crate::config::{self, Config};
use crate::subject::{Subject, SubjectContext};

use super::exit_codes;
use super::output::{self, CheckData, EvalData, OutputMode, TokenData, TokensData};

/// edit distance within which field and condition names are suggested
const SUGGESTION_THRESHOLD: usize = 2;

#[derive(Parser)]
#[command(name = "editcond")]
#[command(about = "Parse and evaluate edit condition expressions")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides EDITCOND_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse an expression and show its compiled form
    Check {
        /// Expression to parse, e.g. "bEnabled && Mode == EMode::On"
        expr: String,

        /// Show the lexed tokens instead of the compiled sequence
        #[arg(long)]
        tokens: bool,
    },

    /// Evaluate an expression against a subject file
    Eval {
        /// Expression to evaluate
        #[arg(required_unless_present = "condition", conflicts_with = "condition")]
        expr: Option<String>,

        /// Evaluate a named condition from the config instead
        #[arg(short, long)]
        condition: Option<String>,

        /// Subject file (.json or .json5)
        #[arg(short, long)]
        subject: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Set a configuration value
    Set {
        /// Configuration key (settings.epsilon, settings.log_level or conditions.<name>)
        key: String,
        /// Value to set; an empty value removes a named condition
        value: String,
    },
    /// Reset configuration to defaults
    Reset,
    /// Verify configuration file for errors
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl CompletionShell {
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            CompletionShell::Bash => clap_complete::Shell::Bash,
            CompletionShell::Zsh => clap_complete::Shell::Zsh,
            CompletionShell::Fish => clap_complete::Shell::Fish,
        }
    }
}

/// reporter lines at debug level; `fail` prints the user-facing error
struct DebugSink;

impl DiagnosticSink for DebugSink {
    fn emit(&self, line: &str) {
        tracing::debug!(target: "edit_condition", "{}", line);
    }
}

/// print an error in the current output mode and exit with `code`
fn fail(output_mode: OutputMode, code: i32, message: &str, suggestions: Vec<String>) -> ! {
    if output_mode.is_json() {
        output::print_json_error_with_suggestions(code, message, suggestions);
    } else {
        eprintln!("Error: {}", message);
        if !suggestions.is_empty() {
            eprintln!("Did you mean: {}?", suggestions.join(", "));
        }
    }
    std::process::exit(code);
}

fn load_config(config_path: Option<&Path>, output_mode: OutputMode) -> Config {
    match config::load_with_override(config_path) {
        Ok(config) => config,
        Err(e) => fail(
            output_mode,
            exit_codes::CONFIG_ERROR,
            &format!("{:#}", e),
            vec![],
        ),
    }
}

/// candidates within the suggestion threshold, closest first
pub fn suggest<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let mut matches: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|c| (levenshtein(&query_lower, &c.to_lowercase()), c))
        .filter(|(distance, c)| *distance <= SUGGESTION_THRESHOLD && *c != query)
        .collect();

    matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    matches.into_iter().map(|(_, c)| c.to_string()).collect()
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);

    match cli.command {
        Commands::Check { expr, tokens } => {
            if tokens {
                let lexed = match conditions::lex(&expr) {
                    Ok(lexed) => lexed,
                    Err(e) => fail(
                        output_mode,
                        exit_codes::PARSE_ERROR,
                        &format!("lex error: {}", e),
                        vec![],
                    ),
                };

                let data = TokensData {
                    source: expr,
                    tokens: lexed.iter().map(TokenData::from_lexed).collect(),
                };

                match output_mode {
                    OutputMode::Json => output::print_json(&data),
                    OutputMode::Text => {
                        for token in &data.tokens {
                            println!("{:>4}  {:<9} {}", token.position, token.token_type, token.text);
                        }
                    }
                    OutputMode::Quiet => {}
                }
                return Ok(());
            }

            let compiled = match conditions::parse(&expr) {
                Ok(compiled) => compiled,
                Err(e) => fail(output_mode, exit_codes::PARSE_ERROR, &e.to_string(), vec![]),
            };

            let data = CheckData::from_expression(&compiled);
            match output_mode {
                OutputMode::Json => output::print_json(&data),
                OutputMode::Text => {
                    println!("{}", compiled);
                    if !data.properties.is_empty() {
                        println!("properties: {}", data.properties.join(", "));
                    }
                }
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Eval {
            expr,
            condition,
            subject,
        } => {
            let config = load_config(config_path, output_mode);

            let source = match (expr, &condition) {
                (Some(expr), None) => expr,
                (None, Some(name)) => match config.condition(name) {
                    Some(source) => source.to_string(),
                    None => fail(
                        output_mode,
                        exit_codes::INVALID_ARGS,
                        &format!("no condition named '{}' in config", name),
                        suggest(name, config.conditions.keys().map(String::as_str)),
                    ),
                },
                _ => fail(
                    output_mode,
                    exit_codes::INVALID_ARGS,
                    "provide either an expression or --condition",
                    vec![],
                ),
            };

            let subject = match Subject::load(&subject) {
                Ok(subject) => subject,
                Err(e) => fail(
                    output_mode,
                    exit_codes::SUBJECT_ERROR,
                    &format!("{:#}", e),
                    vec![],
                ),
            };

            let reporter = ErrorReporter::with_sink(Arc::new(DebugSink));
            let parser = EditConditionParser::with_epsilon(config.settings.epsilon);
            let ctx = SubjectContext::new(&subject)
                .with_epsilon(config.settings.epsilon)
                .with_reporter(&reporter);

            let compiled = match parser.parse_for(&source, &ctx, &reporter) {
                Ok(compiled) => compiled,
                Err(e) => fail(output_mode, exit_codes::PARSE_ERROR, &e.to_string(), vec![]),
            };

            let result = match parser.evaluate(&compiled, &ctx, &reporter) {
                Ok(result) => result,
                Err(e) => {
                    let suggestions = eval_suggestions(&e, &subject);
                    fail(
                        output_mode,
                        exit_codes::EVAL_ERROR,
                        &format!("{}: {}", subject.name(), e),
                        suggestions,
                    )
                }
            };

            match output_mode {
                OutputMode::Json => output::print_json(&EvalData {
                    source,
                    condition,
                    subject: subject.name().to_string(),
                    instances: subject.instance_count(),
                    result,
                }),
                OutputMode::Text => println!("{}", result),
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = load_config(config_path, output_mode);
                if output_mode.is_json() {
                    output::print_json(&config);
                } else {
                    let json = serde_json::to_string_pretty(&config)
                        .context("Failed to serialize config")?;
                    println!("{}", json);
                }
                Ok(())
            }
            ConfigCommands::Path => {
                let path = config::get_config_path_with_override(config_path)?;
                if output_mode.is_json() {
                    output::print_json(&serde_json::json!({ "path": path.display().to_string() }));
                } else {
                    println!("{}", path.display());
                }
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                let mut config = load_config(config_path, output_mode);
                if let Err(e) = config::set_value(&mut config, &key, &value) {
                    fail(
                        output_mode,
                        exit_codes::CONFIG_ERROR,
                        &format!("{:#}", e),
                        vec![],
                    );
                }
                config::save_with_override(&config, config_path)?;
                if output_mode.is_json() {
                    output::print_json(&serde_json::json!({ "key": key, "value": value }));
                } else if !output_mode.is_quiet() {
                    println!("Set {} = {}", key, value);
                }
                Ok(())
            }
            ConfigCommands::Reset => {
                let config = Config::default();
                config::save_with_override(&config, config_path)?;
                if !output_mode.is_quiet() {
                    println!("Configuration reset to defaults");
                }
                Ok(())
            }
            ConfigCommands::Verify => {
                let path = config::get_config_path_with_override(config_path)?;
                let errors = match config::verify(&path) {
                    Ok(errors) => errors,
                    Err(e) => fail(
                        output_mode,
                        exit_codes::CONFIG_ERROR,
                        &format!("{:#}", e),
                        vec![],
                    ),
                };

                if output_mode.is_json() {
                    if errors.is_empty() {
                        output::print_json(&serde_json::json!({
                            "path": path.display().to_string(),
                            "valid": true,
                        }));
                        return Ok(());
                    }
                    let error = output::JsonRpcError::new(
                        exit_codes::CONFIG_ERROR,
                        "configuration validation failed",
                    )
                    .with_details(errors.join("\n"));
                    if let Ok(json) = serde_json::to_string(&error) {
                        println!("{}", json);
                    }
                    std::process::exit(exit_codes::CONFIG_ERROR);
                }

                if errors.is_empty() {
                    println!("✓ Configuration is valid: {}", path.display());
                    Ok(())
                } else {
                    println!(
                        "✗ Configuration has {} error(s): {}",
                        errors.len(),
                        path.display()
                    );
                    println!();
                    for error in &errors {
                        println!("  - {}", error);
                    }
                    eprintln!("Error: configuration validation failed");
                    std::process::exit(exit_codes::CONFIG_ERROR);
                }
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let mut buf = Vec::new();
            clap_complete::generate(shell.to_clap_shell(), &mut cmd, "editcond", &mut buf);
            let script = String::from_utf8(buf)
                .map_err(|e| anyhow!("completion script is not UTF-8: {}", e))?;
            print!("{}", script);
            Ok(())
        }
    }
}

/// field names close to the operand an evaluation tripped over
fn eval_suggestions(err: &EvalError, subject: &Subject) -> Vec<String> {
    match err.operand_name() {
        Some(name) if subject.field_type(name).is_none() => suggest(name, subject.field_names()),
        _ => vec![],
    }
}
