//! The interactive session: one loop over keystrokes and run output.
//!
//! Every edit of the input starts a new generation. The runner of the previous
//! generation is killed on a separate thread, and output that still arrives
//! from it is dropped by comparing generations, so only the current run ever
//! reaches the screen. All screen writes happen on the loop thread.

use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};

use fzz_core::config::Config;
use fzz_core::editor;
use fzz_core::error::Result;
use fzz_core::runner::Runner;
use fzz_core::substitution::build_args;

use crate::keys::Key;
use crate::screen::Screen;

/// Everything the session loop reacts to.
#[derive(Debug, PartialEq)]
pub enum Event {
    Key(Key),
    /// A line of output from the run of `generation`
    Output { generation: u64, line: String },
    /// The run of `generation` closed its output
    Finished { generation: u64 },
    /// The key reader stopped; no more keystrokes will come
    InputClosed,
}

/// How the session ended.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The user accepted; holds the standard output of the last run
    Accepted(Vec<u8>),
    Aborted,
    Interrupted,
}

impl Outcome {
    /// Exit status for the process. Only an interrupt counts as failure.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Outcome::Accepted(_) | Outcome::Aborted => ExitCode::SUCCESS,
            Outcome::Interrupted => ExitCode::FAILURE,
        }
    }
}

pub struct Session<W: Write> {
    config: Config,
    stdin: Arc<[u8]>,
    input: Vec<u8>,
    screen: Screen<W>,
    current: Option<Arc<Runner>>,
    generation: Arc<AtomicU64>,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
}

impl<W: Write> Session<W> {
    /// Creates a session running `config` for every edit, feeding each run
    /// `stdin`.
    pub fn new(config: Config, stdin: Arc<[u8]>, screen: Screen<W>) -> Self {
        let (sender, receiver) = unbounded();

        Self {
            config,
            stdin,
            input: Vec::new(),
            screen,
            current: None,
            generation: Arc::new(AtomicU64::new(0)),
            sender,
            receiver,
        }
    }

    /// Channel for feeding events (keystrokes) into the session.
    pub fn sender(&self) -> Sender<Event> {
        self.sender.clone()
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn current_runner(&self) -> Option<Arc<Runner>> {
        self.current.clone()
    }

    pub fn screen(&self) -> &Screen<W> {
        &self.screen
    }

    /// Runs the loop until the user accepts, aborts or interrupts.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn run(mut self) -> Result<Outcome> {
        self.redraw()?;
        self.screen.cursor_after_prompt()?;
        self.screen.flush()?;

        loop {
            let Ok(event) = self.receiver.recv() else {
                // unreachable while the session holds a sender
                return Ok(Outcome::Aborted);
            };

            if let Some(outcome) = self.handle_event(event)? {
                return Ok(outcome);
            }

            // draw once per burst of events
            if self.receiver.is_empty() {
                self.screen.cursor_after_prompt()?;
                self.screen.flush()?;
            }
        }
    }

    /// Handles one event, returning the outcome if it ends the session.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn handle_event(&mut self, event: Event) -> Result<Option<Outcome>> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Output { generation, line } => {
                if self.is_current(generation) {
                    self.screen.print_line(&line)?;
                }
                Ok(None)
            }
            Event::Finished { generation } => {
                if self.is_current(generation) {
                    debug!("Generation {generation} finished");
                    self.screen.cursor_after_prompt()?;
                }
                Ok(None)
            }
            Event::InputClosed => {
                warn!("Keyboard input closed, aborting");
                Ok(Some(self.stop(Outcome::Aborted)))
            }
        }
    }

    fn handle_key(&mut self, key: Key) -> Result<Option<Outcome>> {
        match key {
            Key::Accept => return Ok(Some(self.accept())),
            Key::Abort => return Ok(Some(self.stop(Outcome::Aborted))),
            Key::Interrupt => return Ok(Some(self.stop(Outcome::Interrupted))),
            Key::DeleteChar => self.edit(editor::delete_last_rune),
            Key::DeleteWord => self.edit(editor::delete_last_word),
            Key::Char(c) => {
                let mut encoded = [0u8; 4];
                let text: &str = c.encode_utf8(&mut encoded);
                self.edit(|input| editor::append_text(input, text));
            }
        }

        self.restart()?;
        Ok(None)
    }

    fn edit<F: FnOnce(Vec<u8>) -> Vec<u8>>(&mut self, f: F) {
        let input = std::mem::take(&mut self.input);
        self.input = f(input);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Replaces the current run with one for the edited input.
    fn restart(&mut self) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.kill_current_async();
        self.redraw()?;

        if self.input.is_empty() {
            return Ok(());
        }

        let argv = build_args(self.config.template(), self.config.placeholder(), &self.input);
        debug!("Generation {generation}: {argv:?}");

        let runner = Arc::new(Runner::new(argv, Arc::clone(&self.stdin)));
        match runner.run() {
            Ok(lines) => {
                self.current = Some(runner);
                spawn_drain(lines, generation, Arc::clone(&self.generation), self.sender.clone())?;
            }
            Err(e) => {
                warn!("Generation {generation} did not start: {e}");
                self.screen.print_line(&e.to_string())?;
            }
        }

        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        self.screen.draw_prompt(&self.input)?;
        self.screen.reset_output()?;
        Ok(())
    }

    /// Kills the current runner without waiting for it.
    fn kill_current_async(&mut self) {
        let Some(runner) = self.current.take() else {
            return;
        };

        let killer = Arc::clone(&runner);
        let spawned = thread::Builder::new()
            .name("fzz-kill".to_string())
            .spawn(move || killer.kill_wait());

        if let Err(e) = spawned {
            warn!("Could not start kill thread, killing inline: {e}");
            runner.kill_wait();
        }
    }

    fn stop(&mut self, outcome: Outcome) -> Outcome {
        if let Some(runner) = self.current.take() {
            runner.kill_wait();
        }
        info!("Session ended: {outcome:?}");
        outcome
    }

    fn accept(&mut self) -> Outcome {
        let output = match self.current.take() {
            Some(runner) => {
                runner.wait();
                runner.take_output()
            }
            None => Vec::new(),
        };

        info!("Accepted with {} bytes of output", output.len());
        Outcome::Accepted(output)
    }
}

/// Forwards the lines of one run into the session while it is still current.
fn spawn_drain(
    lines: Receiver<String>,
    generation: u64,
    current: Arc<AtomicU64>,
    events: Sender<Event>,
) -> Result<()> {
    thread::Builder::new()
        .name(format!("fzz-drain-{generation}"))
        .spawn(move || {
            for line in lines {
                if current.load(Ordering::SeqCst) != generation {
                    debug!("Generation {generation} superseded, dropping its output");
                    return;
                }
                if events.send(Event::Output { generation, line }).is_err() {
                    return;
                }
            }
            let _ = events.send(Event::Finished { generation });
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fzz_core::runner::RunState;
    use std::time::{Duration, Instant};

    fn session(args: &[&str]) -> Session<Vec<u8>> {
        let template = args.iter().map(ToString::to_string).collect();
        let config = Config::new(template, "{{}}").unwrap();
        Session::new(config, Arc::from(Vec::new()), Screen::new(Vec::new(), 80, 10))
    }

    fn written(session: &Session<Vec<u8>>) -> String {
        String::from_utf8_lossy(session.screen().writer()).into_owned()
    }

    fn type_text(session: &mut Session<Vec<u8>>, text: &str) {
        for c in text.chars() {
            assert_eq!(session.handle_event(Event::Key(Key::Char(c))).unwrap(), None);
        }
    }

    fn wait_for_state(runner: &Runner, expected: RunState) {
        let started = Instant::now();
        while runner.state() != expected {
            assert!(
                started.elapsed() < Duration::from_secs(10),
                "runner stuck in {:?}",
                runner.state()
            );
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_typing_starts_a_run_per_keystroke() {
        let mut session = session(&["echo", "{{}}"]);
        type_text(&mut session, "ab");

        assert_eq!(session.input(), b"ab");
        assert_eq!(session.generation(), 2);
        let runner = session.current_runner().unwrap();
        assert_eq!(runner.argv(), ["echo", "ab"]);
        assert!(written(&session).contains("> ab"));
    }

    #[test]
    fn test_superseded_runner_is_killed() {
        let mut session = session(&["sh", "-c", "echo [{{}}]; sleep 30"]);
        type_text(&mut session, "a");
        let first = session.current_runner().unwrap();

        type_text(&mut session, "b");
        let second = session.current_runner().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        wait_for_state(&first, RunState::Killed);
        assert_eq!(second.state(), RunState::Running);

        session.handle_event(Event::Key(Key::Abort)).unwrap();
        assert_eq!(second.state(), RunState::Killed);
    }

    #[test]
    fn test_stale_output_is_discarded() {
        let mut session = session(&["true", "{{}}"]);
        type_text(&mut session, "ab");

        session
            .handle_event(Event::Output { generation: 1, line: "stale-line".to_string() })
            .unwrap();
        session
            .handle_event(Event::Output { generation: 2, line: "fresh-line".to_string() })
            .unwrap();

        let written = written(&session);
        assert!(!written.contains("stale-line"));
        assert!(written.contains("fresh-line"));
        assert_eq!(session.screen().printer().printed(), 1);
    }

    #[test]
    fn test_output_after_clearing_input_is_discarded() {
        let mut session = session(&["true", "{{}}"]);
        type_text(&mut session, "a");
        session.handle_event(Event::Key(Key::DeleteChar)).unwrap();

        assert!(session.input().is_empty());
        assert!(session.current_runner().is_none());

        session
            .handle_event(Event::Output { generation: 1, line: "late-line".to_string() })
            .unwrap();
        assert!(!written(&session).contains("late-line"));
    }

    #[test]
    fn test_delete_word() {
        let mut session = session(&["true", "{{}}"]);
        type_text(&mut session, "foo bar");
        session.handle_event(Event::Key(Key::DeleteWord)).unwrap();

        assert_eq!(session.input(), b"foo ");
        assert_eq!(session.current_runner().unwrap().argv(), ["true", "foo "]);
    }

    #[test]
    fn test_spawn_failure_is_shown_and_editing_continues() {
        let mut session = session(&["/nonexistent/fzz-{{}}"]);
        type_text(&mut session, "x");

        assert!(session.current_runner().is_none());
        assert!(written(&session).contains("Error spawning `/nonexistent/fzz-x`"));

        type_text(&mut session, "y");
        assert_eq!(session.input(), b"xy");
    }

    #[test]
    fn test_accept_without_run() {
        let mut session = session(&["echo", "{{}}"]);
        let outcome = session.handle_event(Event::Key(Key::Accept)).unwrap();
        assert_eq!(outcome, Some(Outcome::Accepted(Vec::new())));
    }

    #[test]
    fn test_accept_waits_for_current_run() {
        let mut session = session(&["sh", "-c", "sleep 0.2; echo [{{}}]"]);
        type_text(&mut session, "ok");

        let outcome = session.handle_event(Event::Key(Key::Accept)).unwrap();
        assert_eq!(outcome, Some(Outcome::Accepted(b"[ok]\n".to_vec())));
    }

    #[test]
    fn test_interrupt_kills_current_run() {
        let mut session = session(&["sh", "-c", "sleep 30 # {{}}"]);
        type_text(&mut session, "a");
        let runner = session.current_runner().unwrap();

        let outcome = session.handle_event(Event::Key(Key::Interrupt)).unwrap();
        assert_eq!(outcome, Some(Outcome::Interrupted));
        assert_eq!(runner.state(), RunState::Killed);
    }

    #[test]
    fn test_input_closed_aborts() {
        let mut session = session(&["echo", "{{}}"]);
        let outcome = session.handle_event(Event::InputClosed).unwrap();
        assert_eq!(outcome, Some(Outcome::Aborted));
    }
}
