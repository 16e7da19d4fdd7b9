use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::{debug, info};

use fzz_cli::cli_args::Args;
use fzz_cli::screen::Screen;
use fzz_cli::session::{Outcome, Session};
use fzz_cli::terminal::{self, TerminalGuard};
use fzz_core::config::{self, Config};
use fzz_core::error::{Error, Result};

fn init_logging(log_file_arg: &Option<String>) {
    let mut builder = env_logger::Builder::from_default_env();

    if let Some(path) = config::resolve_log_file(log_file_arg) {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Could not open log file `{path}`: {e}"),
        }
    }

    builder.init();
}

/// Validates the configuration, then runs the interactive session.
///
/// The terminal is restored when this returns, before anything is written to
/// standard output.
fn execute(args: Args) -> Result<Outcome> {
    let placeholder = config::resolve_placeholder(&args.placeholder);
    let config = Config::new(args.command, &placeholder)?;
    debug!("Template {:?} with placeholder `{}`", config.template(), config.placeholder());

    let stdin = terminal::read_piped_stdin()?;

    let mut tty = terminal::open_tty()?;
    let (cols, rows) = terminal::size()?;
    info!("Terminal is {cols}x{rows}");

    let _guard = TerminalGuard::enter(&mut tty)?;

    let screen = Screen::new(BufWriter::new(tty), cols, rows);
    let session = Session::new(config, stdin, screen);
    terminal::spawn_key_reader(session.sender())?;

    session.run()
}

fn write_output(output: &[u8]) -> Result<()> {
    let mut stdout = stdout();
    stdout.write_all(output)?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if args.version {
        println!("fzz {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_logging(&args.log_file);

    match execute(args) {
        Ok(Outcome::Accepted(output)) => match write_output(&output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
        Ok(outcome) => outcome.exit_code(),
        Err(e @ Error::MissingCommand { .. }) => {
            eprintln!("{e}\n\n{}", Args::command().render_usage());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
