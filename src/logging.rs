//! `tracing` setup for the binary. Library code only emits events (target
//! `mangle`); installing a subscriber is left to [`init_logging`].

use std::env;
use std::fmt;
use std::str::FromStr;

pub const LOG_FORMAT_ENV: &str = "OOMANGLE_LOG_FORMAT";
pub const LOG_LEVEL_ENV: &str = "OOMANGLE_LOG_LEVEL";

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Auto,
    Text,
    Json,
}

/// Logging verbosity, quietest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

const FORMAT_NAMES: &[(&str, LogFormat)] = &[
    ("auto", LogFormat::Auto),
    ("text", LogFormat::Text),
    ("plain", LogFormat::Text),
    ("json", LogFormat::Json),
];

const LEVEL_NAMES: &[(&str, LogLevel)] = &[
    ("error", LogLevel::Error),
    ("err", LogLevel::Error),
    ("warn", LogLevel::Warn),
    ("warning", LogLevel::Warn),
    ("info", LogLevel::Info),
    ("debug", LogLevel::Debug),
    ("trace", LogLevel::Trace),
    ("verbose", LogLevel::Trace),
];

fn lookup<T: Copy>(table: &[(&str, T)], value: &str) -> Option<T> {
    let value = value.trim();
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, parsed)| *parsed)
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        lookup(FORMAT_NAMES, value)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Auto => "auto",
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        lookup(LEVEL_NAMES, value)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| format!("unknown log format `{value}`"))
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| format!("unknown log level `{value}`"))
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective log configuration after env and CLI layering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogOptions {
    pub const DEFAULT: Self = Self {
        format: LogFormat::Auto,
        level: LogLevel::Warn,
    };

    /// Defaults overlaid with `OOMANGLE_LOG_FORMAT` / `OOMANGLE_LOG_LEVEL`.
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |key: &str| env::var_os(key).map(|value| value.to_string_lossy().into_owned());
        Self::DEFAULT.overlay(LogSettings {
            format: read(LOG_FORMAT_ENV).as_deref().and_then(LogFormat::parse),
            level: read(LOG_LEVEL_ENV).as_deref().and_then(LogLevel::parse),
        })
    }

    /// Replace every field `settings` carries.
    #[must_use]
    pub fn overlay(self, settings: LogSettings) -> Self {
        Self {
            format: settings.format.unwrap_or(self.format),
            level: settings.level.unwrap_or(self.level),
        }
    }

    /// `Auto` becomes `Text`; no other format is inferred.
    #[must_use]
    pub fn resolved(self) -> Self {
        let format = match self.format {
            LogFormat::Auto => LogFormat::Text,
            other => other,
        };
        Self { format, ..self }
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Partial log configuration, as given on the command line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub format: Option<LogFormat>,
    pub level: Option<LogLevel>,
}

impl LogSettings {
    pub fn is_empty(&self) -> bool {
        self.format.is_none() && self.level.is_none()
    }

    /// Command line beats environment beats defaults.
    #[must_use]
    pub fn merged_with_env(self) -> LogOptions {
        LogOptions::from_env().overlay(self)
    }
}

/// Install the global subscriber writing to stderr. `RUST_LOG`, when set,
/// replaces the level filter. Only the first call has an effect.
pub fn init_logging(options: LogOptions) {
    use std::io::IsTerminal;
    use std::sync::OnceLock;
    use tracing_subscriber::EnvFilter;

    static INITIALISED: OnceLock<()> = OnceLock::new();

    INITIALISED.get_or_init(|| {
        let options = options.resolved();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(options.level.as_str()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .with_target(true);

        let installed = match options.format {
            LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
            LogFormat::Auto | LogFormat::Text => {
                tracing::subscriber::set_global_default(builder.compact().finish())
            }
        };
        if installed.is_err() {
            tracing::debug!(target: "mangle", "global subscriber already installed");
        }
    });
}
