//! Running external build scripts
//!
//! [`SubprocessRunner`] starts a script without a shell, reports the
//! successful launch, streams its standard output line by line into a
//! [`LineSink`] on the calling thread, and returns once the output closes
//! and the child has exited.
//! Standard error is drained by a helper thread while stdout streams, and
//! forwarded to the sink, in order, after stdout closes.

use crate::console::LineSink;
use crate::error::LaunchError;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, warn};

/// What happened while running a script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout_lines: usize,
    pub stderr_lines: usize,
    /// The sink rejected a line; output after that point was drained but not shown
    pub sink_failed: bool,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Narrow seam over subprocess execution
///
/// Blocks for the lifetime of the child. `on_spawn` is called once the
/// child is running and before any of its output is forwarded; it is never
/// called when the launch fails. Implementations must forward every output
/// line to `sink` before returning.
pub trait ProcessRunner {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        sink: &dyn LineSink,
        on_spawn: &mut dyn FnMut(),
    ) -> Result<RunOutcome, LaunchError>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        sink: &dyn LineSink,
        on_spawn: &mut dyn FnMut(),
    ) -> Result<RunOutcome, LaunchError> {
        (**self).run(program, args, sink, on_spawn)
    }
}

/// Runs scripts with `std::process::Command`
#[derive(Debug, Clone, Default)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SubprocessRunner {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        sink: &dyn LineSink,
        on_spawn: &mut dyn FnMut(),
    ) -> Result<RunOutcome, LaunchError> {
        debug!(program = %program.display(), ?args, "spawning script");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LaunchError::new(program, e))?;

        on_spawn();

        let stderr_lines = child.stderr.take().map(spawn_line_reader);

        let mut outcome = RunOutcome::default();

        if let Some(stdout) = child.stdout.take() {
            for_each_line(stdout, |line| {
                outcome.stdout_lines += 1;
                forward(sink, &line, &mut outcome.sink_failed);
            });
        }

        if let Some(receiver) = stderr_lines {
            for line in receiver {
                outcome.stderr_lines += 1;
                forward(sink, &line, &mut outcome.sink_failed);
            }
        }

        let status = child.wait().map_err(|e| LaunchError::new(program, e))?;
        outcome.exit_code = status.code();

        debug!(
            program = %program.display(),
            exit_code = ?outcome.exit_code,
            stdout_lines = outcome.stdout_lines,
            stderr_lines = outcome.stderr_lines,
            "script finished"
        );

        Ok(outcome)
    }
}

fn forward(sink: &dyn LineSink, line: &str, failed: &mut bool) {
    if *failed {
        return;
    }
    if let Err(e) = sink.write_line(line) {
        warn!(error = %e, "console rejected output; continuing without it");
        *failed = true;
    }
}

/// Call `f` for every line of `reader`, without the line terminator
///
/// A trailing `\r` is stripped and invalid UTF-8 is replaced.
fn for_each_line<R: Read>(reader: R, mut f: impl FnMut(String)) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
                f(String::from_utf8_lossy(&buf).into_owned());
            }
            Err(e) => {
                warn!(error = %e, "stopped reading script output");
                break;
            }
        }
    }
}

fn spawn_line_reader<R: Read + Send + 'static>(reader: R) -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for_each_line(reader, |line| {
            let _ = sender.send(line);
        });
    });
    receiver
}
