//! Startup configuration for fzz.
//!
//! The placeholder token and the command template are fixed once at startup
//! and validated here, so the rest of the program can take them as given.

use std::env;
use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};

/// Placeholder used when neither the flag nor the environment provides one
pub const DEFAULT_PLACEHOLDER: &str = "{{}}";

/// Environment variable that overrides the default placeholder
pub const PLACEHOLDER_ENV_VAR: &str = "FZZ_PLACEHOLDER";

/// Environment variable naming a file to write logs to
pub const LOG_FILE_ENV_VAR: &str = "FZZ_LOG_FILE";

/// A validated placeholder token.
///
/// Must be non-empty and have an even number of characters (an opening and
/// closing half, like `{{}}` or `%%`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder(String);

impl Placeholder {
    /// Validates `token` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPlaceholder`] if the token is empty or has an odd
    /// number of characters.
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() || token.chars().count() % 2 != 0 {
            return Err(Error::InvalidPlaceholder(token.to_string()));
        }

        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Placeholder {
    fn default() -> Self {
        Self(DEFAULT_PLACEHOLDER.to_string())
    }
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Picks the placeholder token to use.
///
/// An explicit argument wins, then a non-empty `FZZ_PLACEHOLDER`, then
/// [`DEFAULT_PLACEHOLDER`]. The result is not validated yet.
pub fn resolve_placeholder(placeholder_arg: &Option<String>) -> String {
    resolve_placeholder_from(placeholder_arg, env::var(PLACEHOLDER_ENV_VAR).ok())
}

fn resolve_placeholder_from(
    placeholder_arg: &Option<String>,
    from_env: Option<String>,
) -> String {
    if let Some(placeholder) = placeholder_arg {
        return placeholder.clone();
    }

    match from_env {
        Some(placeholder) if !placeholder.is_empty() => placeholder,
        _ => DEFAULT_PLACEHOLDER.to_string(),
    }
}

/// Picks the log file, if any: the explicit argument, then a non-empty
/// `FZZ_LOG_FILE`.
pub fn resolve_log_file(log_file_arg: &Option<String>) -> Option<String> {
    log_file_arg
        .clone()
        .or_else(|| env::var(LOG_FILE_ENV_VAR).ok())
        .filter(|path| !path.is_empty())
}

/// The command template and placeholder, validated together.
#[derive(Clone, Debug)]
pub struct Config {
    template: Vec<String>,
    placeholder: Placeholder,
}

impl Config {
    /// Validates the placeholder shape and that it occurs in the template.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPlaceholder`] for a badly shaped token, regardless of
    ///   the template
    /// - [`Error::MissingCommand`] unless the template names a program and at
    ///   least one argument
    /// - [`Error::MissingPlaceholder`] if no argument contains the token
    pub fn new(template: Vec<String>, placeholder: &str) -> Result<Self> {
        let placeholder = Placeholder::new(placeholder)?;

        if template.len() < 2 {
            return Err(Error::MissingCommand {
                placeholder: placeholder.to_string(),
            });
        }

        if !contains_placeholder(&template, &placeholder) {
            return Err(Error::MissingPlaceholder(placeholder.to_string()));
        }

        Ok(Self {
            template,
            placeholder,
        })
    }

    pub fn template(&self) -> &[String] {
        &self.template
    }

    pub fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }
}

fn contains_placeholder(template: &[String], placeholder: &Placeholder) -> bool {
    template
        .iter()
        .any(|argument| argument.contains(placeholder.as_str()))
}
