//! CLI front-end: argument parsing and dispatch for the `oomangle` binary.

mod help;

pub mod dispatch;

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use crate::logging::{LogFormat, LogLevel, LogOptions, LogSettings};

/// Top-level commands supported by the `oomangle` CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Entity {
        owner: String,
        name: String,
        descriptor: Option<String>,
        is_static: bool,
    },
    Vtable {
        class: String,
    },
    Batch {
        manifest: PathBuf,
    },
    Help {
        topic: Option<String>,
    },
    Version,
}

/// Parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
    pub log_options: LogOptions,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    message: String,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn with_usage(message: impl Into<String>) -> Self {
        let mut owned = message.into();
        owned.push_str("\n\n");
        owned.push_str(&Cli::usage());
        Self::new(owned)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for CliError {}

#[derive(Debug, Default)]
struct GlobalOptions {
    log: LogSettings,
    config: Option<PathBuf>,
}

impl Cli {
    /// Parse arguments from the environment.
    ///
    /// # Errors
    /// Returns a [`CliError`] when the arguments cannot be interpreted as a supported command.
    pub fn parse() -> Result<Self, CliError> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from an iterator (useful for testing).
    ///
    /// # Errors
    /// Returns a [`CliError`] when the provided iterator does not describe a valid invocation.
    pub fn parse_from<I, T>(args: I) -> Result<Self, CliError>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut iter = args.map(Into::<String>::into).peekable();
        let mut globals = GlobalOptions::default();
        while let Some(flag) = iter.peek().cloned() {
            if !flag.starts_with('-') || flag == "--" {
                break;
            }
            if is_help_flag(&flag) || matches!(flag.as_str(), "--version" | "-V") {
                break;
            }
            if consume_global_option(&mut iter, &mut globals)? {
                continue;
            }
            return Err(CliError::with_usage(format!(
                "unsupported global option '{flag}'"
            )));
        }

        let Some(raw_command) = iter.next() else {
            return Err(CliError::with_usage("missing command"));
        };

        let rest: Vec<String> = iter.collect();
        let command = match raw_command.as_str() {
            "help" | "--help" | "-h" => Command::Help {
                topic: rest
                    .first()
                    .filter(|value| !is_help_flag(value))
                    .map(|value| value.to_ascii_lowercase()),
            },
            "version" | "--version" | "-V" => {
                if rest.iter().any(|value| is_help_flag(value)) {
                    Command::Help {
                        topic: Some("version".into()),
                    }
                } else if let Some(extra) = rest.first() {
                    return Err(CliError::with_usage(format!(
                        "unsupported option '{extra}' for command"
                    )));
                } else {
                    Command::Version
                }
            }
            "entity" | "e" => parse_entity(rest)?,
            "vtable" | "v" => parse_vtable(rest)?,
            "batch" => parse_batch(rest)?,
            other => {
                return Err(CliError::with_usage(format!("unknown command '{other}'")));
            }
        };

        Ok(Cli {
            command,
            log_options: globals.log.merged_with_env(),
            config: globals.config,
        })
    }

    /// Return the general usage string.
    #[must_use]
    pub fn usage() -> String {
        help::render_general_help()
    }

    /// Return help text for a specific command.
    ///
    /// # Errors
    /// Returns a [`CliError`] when the requested topic is unknown.
    pub fn help_for(topic: &str) -> Result<String, CliError> {
        help::render_command_help(topic)
            .ok_or_else(|| CliError::with_usage(help::format_unknown_topic(topic)))
    }
}

pub(crate) fn is_help_flag(value: &str) -> bool {
    matches!(value, "-h" | "--help")
}

fn help_requested(args: &[String], topic: &str) -> Option<Command> {
    args.iter().any(|arg| is_help_flag(arg)).then(|| Command::Help {
        topic: Some(topic.into()),
    })
}

fn parse_entity(args: Vec<String>) -> Result<Command, CliError> {
    if let Some(help) = help_requested(&args, "entity") {
        return Ok(help);
    }
    let mut positional = Vec::new();
    let mut descriptor = None;
    let mut is_static = false;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--static" | "-s" => is_static = true,
            "--descriptor" | "-d" => {
                let value = iter.next().ok_or_else(|| {
                    CliError::with_usage("expected descriptor after --descriptor")
                })?;
                descriptor = Some(value);
            }
            _ if arg.starts_with("--descriptor=") => {
                descriptor = Some(arg["--descriptor=".len()..].to_string());
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(CliError::with_usage(format!(
                    "unsupported option '{arg}' for entity"
                )));
            }
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    let (Some(owner), Some(name)) = (positional.next(), positional.next()) else {
        return Err(CliError::with_usage(
            "entity requires <owner> and <name[.descriptor]>",
        ));
    };
    if let Some(extra) = positional.next() {
        return Err(CliError::with_usage(format!(
            "unexpected argument '{extra}' for entity"
        )));
    }
    if name.is_empty() {
        return Err(CliError::with_usage("entity name must not be empty"));
    }
    Ok(Command::Entity {
        owner,
        name,
        descriptor,
        is_static,
    })
}

fn parse_vtable(args: Vec<String>) -> Result<Command, CliError> {
    if let Some(help) = help_requested(&args, "vtable") {
        return Ok(help);
    }
    match args.as_slice() {
        [class] if !class.starts_with('-') => Ok(Command::Vtable {
            class: class.clone(),
        }),
        [] => Err(CliError::with_usage("vtable requires <class>")),
        [flag] => Err(CliError::with_usage(format!(
            "unsupported option '{flag}' for vtable"
        ))),
        [_, extra, ..] => Err(CliError::with_usage(format!(
            "unexpected argument '{extra}' for vtable"
        ))),
    }
}

fn parse_batch(args: Vec<String>) -> Result<Command, CliError> {
    if let Some(help) = help_requested(&args, "batch") {
        return Ok(help);
    }
    match args.as_slice() {
        [path] if !path.starts_with('-') && !path.trim().is_empty() => Ok(Command::Batch {
            manifest: PathBuf::from(path),
        }),
        [] => Err(CliError::with_usage("batch requires <manifest.yaml>")),
        [single] => Err(CliError::with_usage(format!(
            "invalid manifest path '{single}'"
        ))),
        [_, extra, ..] => Err(CliError::with_usage(format!(
            "unexpected argument '{extra}' for batch"
        ))),
    }
}

fn consume_global_option<I>(
    iter: &mut std::iter::Peekable<I>,
    globals: &mut GlobalOptions,
) -> Result<bool, CliError>
where
    I: Iterator<Item = String>,
{
    let Some(flag) = iter.peek().cloned() else {
        return Ok(false);
    };
    if !matches!(flag.as_str(), "--log-format" | "--log-level" | "--config") {
        return Ok(false);
    }
    iter.next();
    let value = iter
        .next()
        .ok_or_else(|| CliError::with_usage(format!("expected value after {flag}")))?;
    match flag.as_str() {
        "--log-format" => {
            let format = LogFormat::parse(&value).ok_or_else(|| {
                CliError::with_usage(format!(
                    "unsupported log format '{value}'; expected auto, text or json"
                ))
            })?;
            globals.log.format = Some(format);
        }
        "--log-level" => {
            let level = LogLevel::parse(&value).ok_or_else(|| {
                CliError::with_usage(format!(
                    "unsupported log level '{value}'; expected error, warn, info, debug or trace"
                ))
            })?;
            globals.log.level = Some(level);
        }
        _ => globals.config = Some(PathBuf::from(value)),
    }
    Ok(true)
}
