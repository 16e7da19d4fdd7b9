//! fzz CLI Library
//!
//! This crate provides the interactive front end of fzz: it reads keystrokes,
//! edits the input, re-runs the command template on every change and streams
//! the output of the current run below the prompt.
//!
//! # Key Features
//!
//! - **Live Re-execution**: Every keystroke starts a fresh run and kills the old one
//! - **Bounded Rendering**: Output fills the terminal below the prompt and never scrolls
//! - **Piping**: Standard input is handed to every run; the accepted output goes to standard output
//! - **Clean Exit**: The terminal is restored on accept, abort, interrupt, error and panic
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`keys`]: Decoding terminal key events into edit commands
//! - [`printer`]: The bounded output viewport
//! - [`screen`]: Prompt and viewport drawn through one writer
//! - [`session`]: The event loop tying input, runs and screen together
//! - [`terminal`]: Raw mode, `/dev/tty` and the keystroke reader
//!
//! # Examples
//!
//! ```bash
//! # Search a file while typing the pattern
//! fzz grep -i {{}} notes.txt
//!
//! # Filter piped input, print the final result
//! ps aux | fzz grep {{}} | awk '{print $2}'
//!
//! # Use another placeholder
//! FZZ_PLACEHOLDER=%% fzz ag %%
//! ```

pub mod cli_args;
pub mod keys;
pub mod printer;
pub mod screen;
pub mod session;
pub mod terminal;
