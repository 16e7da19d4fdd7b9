//! fzz Core Library
//!
//! This crate provides the re-execution engine behind fzz, a tool that re-runs
//! a templated command on every keystroke while the user edits the text
//! substituted into it.
//!
//! # Key Features
//!
//! - **Configuration**: Placeholder and command template validation
//! - **Input Editing**: Character and word deletion on a raw byte buffer
//! - **Substitution**: Literal placeholder replacement into the template
//! - **Process Lifecycle**: Spawning, streaming, capturing and killing runs
//! - **Error Handling**: One error type for all failure modes
//!
//! # Examples
//!
//! Running the template for an edited input and reading its output:
//!
//! ```no_run
//! use std::sync::Arc;
//! use fzz_core::config::Config;
//! use fzz_core::runner::Runner;
//! use fzz_core::substitution::build_args;
//!
//! let config = Config::new(vec!["echo".to_string(), "{{}}".to_string()], "{{}}")?;
//! let argv = build_args(config.template(), config.placeholder(), b"hello");
//!
//! let runner = Runner::new(argv, Arc::from(Vec::new()));
//! for line in runner.run()? {
//!     println!("{line}");
//! }
//! # Ok::<(), fzz_core::error::Error>(())
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod runner;
pub mod substitution;
