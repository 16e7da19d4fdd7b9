//! Lifecycle of one spawned command.
//!
//! A [`Runner`] spawns the process, feeds it the captured standard input,
//! streams its output line by line over a channel and keeps a verbatim copy
//! of standard output for replay once the user accepts the run.
//!
//! The line channel closes only after both output streams reached EOF and
//! the process was reaped, so a closed channel means the run is over.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use itertools::Itertools;
use log::{debug, warn};

use crate::error::{Error, Result};

/// How often the supervisor checks whether the process has exited
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Where a runner is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Constructed, nothing spawned yet
    Created,
    /// Process spawned and not yet reaped
    Running,
    /// Process exited on its own and was reaped
    Completed,
    /// Process was killed and reaped
    Killed,
}

/// State shared between the runner handle and its background threads.
///
/// Lock order is `child` before `state`.
struct Shared {
    child: Mutex<Option<Child>>,
    state: Mutex<RunState>,
    output: Mutex<Vec<u8>>,
}

/// Owns one external process end-to-end.
pub struct Runner {
    argv: Vec<String>,
    stdin: Arc<[u8]>,
    shared: Arc<Shared>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Runner {
    /// Creates a runner for `argv`. Every run gets its own view of `stdin`.
    pub fn new(argv: Vec<String>, stdin: Arc<[u8]>) -> Self {
        Self {
            argv,
            stdin,
            shared: Arc::new(Shared {
                child: Mutex::new(None),
                state: Mutex::new(RunState::Created),
                output: Mutex::new(Vec::new()),
            }),
            supervisor: Mutex::new(None),
        }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn state(&self) -> RunState {
        *lock(&self.shared.state)
    }

    /// Spawns the process and returns the stream of its output lines.
    ///
    /// Standard output and standard error lines both arrive on the stream, in
    /// the order each was produced. Only standard output is captured for
    /// [`Runner::take_output`].
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyStarted`] if the runner was started before
    /// - [`Error::Spawn`] if the process could not be started
    pub fn run(&self) -> Result<Receiver<String>> {
        let mut child_slot = lock(&self.shared.child);
        if *lock(&self.shared.state) != RunState::Created {
            return Err(Error::AlreadyStarted);
        }

        let Some((program, args)) = self.argv.split_first() else {
            return Err(Error::spawn_error(
                String::new(),
                io::Error::new(io::ErrorKind::InvalidInput, "empty argument list"),
            ));
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so a kill also reaches what a shell started
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command
            .spawn()
            .map_err(|e| Error::spawn_error(program.clone(), e))?;

        debug!("Started `{}` as pid {}", self.argv.iter().join(" "), child.id());

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        *child_slot = Some(child);
        *lock(&self.shared.state) = RunState::Running;
        drop(child_slot);

        if let Some(stdin) = stdin {
            feed_stdin(stdin, Arc::clone(&self.stdin))?;
        }

        let (sender, receiver) = unbounded();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("fzz-runner".to_string())
            .spawn(move || supervise(&shared, stdout, stderr, sender))?;
        *lock(&self.supervisor) = Some(handle);

        Ok(receiver)
    }

    /// Blocks until the process exited on its own and its output stream closed.
    ///
    /// Returns straight away for a runner that was never started or was
    /// already waited on.
    pub fn wait(&self) {
        let handle = lock(&self.supervisor).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("Output thread of `{}` panicked", self.argv.iter().join(" "));
            }
        }
    }

    /// Kills the process group and blocks until the process is reaped.
    ///
    /// Safe to call any number of times and concurrently with the process
    /// exiting on its own. A run whose output already closed is left alone.
    pub fn kill_wait(&self) {
        let mut child_slot = lock(&self.shared.child);
        let Some(child) = child_slot.as_mut() else {
            return;
        };

        if *lock(&self.shared.state) != RunState::Running {
            return;
        }

        // The leader may be gone while the rest of its group holds the output open
        kill_process_group(child.id());
        if let Err(e) = child.kill() {
            debug!("Kill of pid {} failed: {}", child.id(), e);
        }
        match child.wait() {
            Ok(status) => debug!("Killed pid {}: {}", child.id(), status),
            Err(e) => warn!("Could not reap pid {}: {}", child.id(), e),
        }

        let mut state = lock(&self.shared.state);
        if *state == RunState::Running {
            *state = RunState::Killed;
        }
    }

    /// Takes the captured standard output, leaving the capture empty.
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut *lock(&self.shared.output))
    }
}

fn kill_process_group(pid: u32) {
    #[cfg(unix)]
    unsafe {
        if libc::kill(-(pid as i32), libc::SIGKILL) != 0 {
            debug!(
                "Kill of process group {pid} failed: {}",
                io::Error::last_os_error()
            );
        }
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
    }
}

fn feed_stdin(mut stdin: ChildStdin, bytes: Arc<[u8]>) -> Result<()> {
    if bytes.is_empty() {
        // dropping closes the pipe
        return Ok(());
    }

    thread::Builder::new()
        .name("fzz-stdin".to_string())
        .spawn(move || {
            if let Err(e) = stdin.write_all(&bytes) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    debug!("Writing standard input failed: {e}");
                }
            }
        })?;

    Ok(())
}

fn supervise(
    shared: &Shared,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    sender: Sender<String>,
) {
    let stderr_reader = stderr.and_then(|stderr| {
        let sender = sender.clone();
        thread::Builder::new()
            .name("fzz-stderr".to_string())
            .spawn(move || forward_lines(stderr, &sender, None))
            .map_err(|e| warn!("Could not start standard error reader: {e}"))
            .ok()
    });

    if let Some(stdout) = stdout {
        forward_lines(stdout, &sender, Some(&shared.output));
    }

    if let Some(stderr_reader) = stderr_reader {
        let _ = stderr_reader.join();
    }

    let status = loop {
        {
            let mut child_slot = lock(&shared.child);
            match child_slot.as_mut().map(Child::try_wait) {
                Some(Ok(Some(status))) => break Some(status),
                Some(Ok(None)) => {}
                Some(Err(e)) => {
                    warn!("Could not reap child: {e}");
                    break None;
                }
                None => break None,
            }
        }
        thread::sleep(REAP_POLL_INTERVAL);
    };

    {
        let mut state = lock(&shared.state);
        if *state == RunState::Running {
            *state = RunState::Completed;
        }
    }

    debug!("Output closed, exit status {status:?}");
    drop(sender);
}

/// Reads `reader` line by line until EOF or a read error.
///
/// Lines go out without their line ending; the capture gets the raw bytes.
/// A receiver that went away does not stop the capture.
fn forward_lines<R: Read>(
    reader: R,
    sender: &Sender<String>,
    capture: Option<&Mutex<Vec<u8>>>,
) {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                if let Some(capture) = capture {
                    lock(capture).extend_from_slice(&line);
                }
                let _ = sender.send(display_line(&line));
            }
            Err(e) => {
                debug!("Output stream ended early: {e}");
                break;
            }
        }
    }
}

fn display_line(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
