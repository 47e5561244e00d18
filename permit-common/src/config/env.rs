//! Environment variable parsing with type safety.
//!
//! Parses `PERMIT_*` variables, collecting every error so they can be
//! reported together instead of failing on the first one.

use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Invalid value for a variable.
    #[error("Invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },

    /// Invalid log level.
    #[error("Invalid log level for {var}: {value}")]
    InvalidLogLevel { var: String, value: String },
}

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    Environment(String),
}

/// A value tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> Sourced<T> {
    pub fn default_value(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::Default,
        }
    }

    pub fn from_env(value: T, var: String) -> Self {
        Self {
            value,
            source: ConfigSource::Environment(var),
        }
    }

    pub fn is_default(&self) -> bool {
        self.source == ConfigSource::Default
    }
}

type Lookup = Box<dyn Fn(&str) -> Option<String>>;

/// Type-safe environment variable parser.
///
/// Collects errors during parsing so all issues can be reported at once.
pub struct EnvParser {
    prefix: &'static str,
    lookup: Lookup,
    errors: Vec<EnvError>,
}

impl EnvParser {
    /// Create a new parser with the PERMIT_ prefix reading the process
    /// environment.
    pub fn new() -> Self {
        Self::with_lookup(|name| env::var(name).ok())
    }

    /// Parser reading variables through `lookup` instead of the process
    /// environment.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Self {
            prefix: "PERMIT_",
            lookup: Box::new(lookup),
            errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn raw(&self, var_name: &str) -> Option<String> {
        (self.lookup)(var_name)
    }

    /// Get an optional string (None if not set or empty).
    pub fn get_optional_string(&mut self, name: &str) -> Sourced<Option<String>> {
        let var_name = self.var_name(name);
        match self.raw(&var_name) {
            Some(value) if value.is_empty() => Sourced::from_env(None, var_name),
            Some(value) => Sourced::from_env(Some(value), var_name),
            None => Sourced::default_value(None),
        }
    }

    /// Get an optional path with `~/` expansion (None if not set or empty).
    pub fn get_optional_path(&mut self, name: &str) -> Sourced<Option<PathBuf>> {
        let sourced = self.get_optional_string(name);
        Sourced {
            value: sourced.value.map(|v| expand_tilde(&v)),
            source: sourced.source,
        }
    }

    /// Get a log filter value.
    ///
    /// Plain level names are lowercased; anything containing `=` or `,` is
    /// passed through as an `EnvFilter` directive.
    pub fn get_log_level(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        match self.raw(&var_name) {
            Some(value) if value.contains('=') || value.contains(',') => {
                Sourced::from_env(value, var_name)
            }
            Some(value) => {
                let lower = value.to_lowercase();
                match lower.as_str() {
                    "trace" | "debug" | "info" | "warn" | "error" | "off" => {
                        Sourced::from_env(lower, var_name)
                    }
                    _ => {
                        self.errors.push(EnvError::InvalidLogLevel {
                            var: var_name.clone(),
                            value,
                        });
                        Sourced::from_env(default.to_string(), var_name)
                    }
                }
            }
            None => Sourced::default_value(default.to_string()),
        }
    }

    /// Get a value restricted to `allowed` (case-insensitive).
    pub fn get_choice(&mut self, name: &str, default: &str, allowed: &[&str]) -> Sourced<String> {
        let var_name = self.var_name(name);
        match self.raw(&var_name) {
            Some(value) => {
                let lower = value.to_lowercase();
                if allowed.contains(&lower.as_str()) {
                    Sourced::from_env(lower, var_name)
                } else {
                    self.errors.push(EnvError::InvalidValue {
                        var: var_name.clone(),
                        expected: allowed.join("|"),
                        value,
                    });
                    Sourced::from_env(default.to_string(), var_name)
                }
            }
            None => Sourced::default_value(default.to_string()),
        }
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_tilde(value: &str) -> PathBuf {
    if let Some(stripped) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(value)
}

/// Installer settings read from `PERMIT_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub claude_dir: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub profile: Option<PathBuf>,
}

impl EnvConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, Vec<EnvError>> {
        Self::parse(&mut EnvParser::new())
    }

    /// Read through `parser`, returning every error encountered.
    pub fn parse(parser: &mut EnvParser) -> Result<Self, Vec<EnvError>> {
        let config = Self {
            claude_dir: traced(parser.get_optional_path("CLAUDE_DIR")),
            source_dir: traced(parser.get_optional_path("SOURCE_DIR")),
            base_url: traced(parser.get_optional_string("BASE_URL"))
                .map(|url| url.trim_end_matches('/').to_string()),
            profile: traced(parser.get_optional_path("PROFILE")),
        };

        if parser.has_errors() {
            Err(parser.take_errors())
        } else {
            Ok(config)
        }
    }
}

fn traced<T: std::fmt::Debug>(sourced: Sourced<T>) -> T {
    if !sourced.is_default() {
        debug!(source = ?sourced.source, value = ?sourced.value, "environment override");
    }
    sourced.value
}
