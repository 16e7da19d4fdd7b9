//! Controlling terminal setup and teardown.
//!
//! The screen is drawn on `/dev/tty` rather than standard output, so the
//! accepted output can be piped into another program. Raw mode and the
//! alternate screen are restored by [`TerminalGuard`] on drop and by a panic
//! hook, on every way out of the program.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use crossbeam_channel::Sender;
use crossterm::cursor::Show;
use crossterm::event::{self, Event as TerminalEvent};
use crossterm::execute;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::{debug, warn};

use fzz_core::error::{Error, Result};

use crate::keys::Key;
use crate::session::Event;

const TTY_PATH: &str = "/dev/tty";

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static ALT_SCREEN_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Opens the controlling terminal for drawing.
pub fn open_tty() -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(TTY_PATH)
        .map_err(|e| Error::terminal_error("opening", e))
}

/// Terminal size as `(cols, rows)`, read once at startup.
pub fn size() -> Result<(u16, u16)> {
    terminal::size().map_err(|e| Error::terminal_error("reading the size of", e))
}

/// Reads all of standard input when it is piped in.
///
/// Returns nothing when standard input is the terminal itself.
pub fn read_piped_stdin() -> Result<Arc<[u8]>> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(Arc::from(Vec::new()));
    }

    let mut bytes = Vec::new();
    io::Read::read_to_end(&mut stdin, &mut bytes)?;
    debug!("Read {} bytes of piped standard input", bytes.len());
    Ok(Arc::from(bytes))
}

/// RAII guard for raw mode and the alternate screen.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Switches `tty` to raw mode on the alternate screen.
    pub fn enter(tty: &mut File) -> Result<Self> {
        install_panic_hook();
        let guard = TerminalGuard { _private: () };

        enable_raw_mode().map_err(|e| Error::terminal_error("enabling raw mode on", e))?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);

        execute!(tty, EnterAlternateScreen)
            .map_err(|e| Error::terminal_error("entering the alternate screen on", e))?;
        ALT_SCREEN_ENABLED.store(true, Ordering::SeqCst);

        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Undoes whatever [`TerminalGuard::enter`] changed. Safe to call repeatedly.
pub fn restore_terminal() {
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }

    if ALT_SCREEN_ENABLED.swap(false, Ordering::SeqCst) {
        match OpenOptions::new().write(true).open(TTY_PATH) {
            Ok(mut tty) => {
                let _ = execute!(tty, LeaveAlternateScreen, Show);
                let _ = tty.flush();
            }
            Err(_) => {
                let mut stderr = io::stderr();
                let _ = execute!(stderr, LeaveAlternateScreen, Show);
            }
        }
    }
}

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

/// Starts the thread that reads keystrokes and feeds them to the session.
///
/// crossterm assembles multi-byte input into whole characters, so the
/// session only ever sees complete keys.
pub fn spawn_key_reader(events: Sender<Event>) -> Result<()> {
    thread::Builder::new()
        .name("fzz-keys".to_string())
        .spawn(move || loop {
            match event::read() {
                Ok(TerminalEvent::Key(key_event)) => {
                    let Some(key) = Key::from_event(key_event) else {
                        continue;
                    };
                    if events.send(Event::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Reading keys failed: {e}");
                    let _ = events.send(Event::InputClosed);
                    break;
                }
            }
        })?;

    Ok(())
}
