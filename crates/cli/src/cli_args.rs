//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure using the `clap`
//! crate. Everything from the first positional argument on is the command
//! template, flags included.

use clap::Parser;

/// Command-line arguments for the fzz tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use fzz_cli::cli_args::Args;
///
/// let args = Args::parse_from(["fzz", "grep", "-i", "{{}}", "notes.txt"]);
/// assert_eq!(args.command, vec!["grep", "-i", "{{}}", "notes.txt"]);
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(
    name = "fzz",
    term_width = 0, // Just to make testing across clap features easier
    about = "fzz allows you to run a command interactively.",
    long_about = "fzz allows you to run a command interactively.\n\n\
                  The command MUST include the placeholder '{{}}', which is replaced by \
                  the input on every keystroke. Enter accepts and prints the output of \
                  the last run, Escape aborts."
)]
pub struct Args {
    /// Print version and exit.
    #[arg(long, short = 'v', action)]
    pub version: bool,

    /// Placeholder token replaced by the input.
    ///
    /// Overrides `FZZ_PLACEHOLDER`. Needs an even number of characters.
    /// Defaults to `{{}}`.
    #[arg(long, short = 'p')]
    pub placeholder: Option<String>,

    /// File to append logs to. Falls back to `FZZ_LOG_FILE`.
    ///
    /// Log levels are filtered with `RUST_LOG`.
    #[arg(long)]
    pub log_file: Option<String>,

    /// The command to run and its arguments, one of which must contain the placeholder.
    #[arg(trailing_var_arg = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(["fzz"]).unwrap();
        assert!(!args.version);
        assert!(args.placeholder.is_none());
        assert!(args.log_file.is_none());
        assert!(args.command.is_empty());
    }

    #[test]
    fn test_version_flag() {
        let args = Args::try_parse_from(["fzz", "-v"]).unwrap();
        assert!(args.version);

        let args = Args::try_parse_from(["fzz", "--version"]).unwrap();
        assert!(args.version);
    }

    #[test]
    fn test_command_collected() {
        let args = Args::try_parse_from(["fzz", "ag", "{{}}"]).unwrap();
        assert_eq!(args.command, vec!["ag", "{{}}"]);
    }

    #[test]
    fn test_command_flags_belong_to_command() {
        let args = Args::try_parse_from(["fzz", "grep", "-v", "-p", "{{}}", "--log-file"]).unwrap();
        assert!(!args.version);
        assert!(args.placeholder.is_none());
        assert!(args.log_file.is_none());
        assert_eq!(args.command, vec!["grep", "-v", "-p", "{{}}", "--log-file"]);
    }

    #[test]
    fn test_placeholder_and_log_file() {
        let args = Args::try_parse_from([
            "fzz",
            "--placeholder",
            "%%",
            "--log-file",
            "/tmp/fzz.log",
            "echo",
            "%%",
        ])
        .unwrap();
        assert_eq!(args.placeholder, Some("%%".to_string()));
        assert_eq!(args.log_file, Some("/tmp/fzz.log".to_string()));
        assert_eq!(args.command, vec!["echo", "%%"]);
    }

    #[test]
    fn test_short_placeholder() {
        let args = Args::try_parse_from(["fzz", "-p", "[[]]", "echo", "[[]]"]).unwrap();
        assert_eq!(args.placeholder, Some("[[]]".to_string()));
    }

    #[test]
    fn test_double_dash_separator() {
        let args = Args::try_parse_from(["fzz", "--", "-weird-program", "{{}}"]).unwrap();
        assert_eq!(args.command, vec!["-weird-program", "{{}}"]);
    }

    #[test]
    fn test_unknown_flag_is_error() {
        let result = Args::try_parse_from(["fzz", "--bogus", "echo", "{{}}"]);
        assert!(result.is_err());
    }
}
