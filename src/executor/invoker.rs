//! Out-of-process plugin invocation
//!
//! Config-repo plugins ship a command-line entry point that checks pipeline
//! files without a GoCD server:
//!
//! ```text
//! java -jar yaml-config-plugin-0.13.0.jar syntax a.gocd.yaml b.gocd.yaml
//! ```
//!
//! Exit status 0 means the files are valid. The output is captured for
//! diagnostics only and is never inspected for a pass/fail signal: a plugin
//! that exits 0 while printing error text still passes.

use super::deadline::Deadline;
use crate::pipeline::SyntaxError;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Output of a plugin run that exited successfully
#[derive(Debug, Clone)]
pub struct PluginRun {
    /// Combined stdout and stderr, in the order written
    pub output: String,

    /// Exit code
    pub exit_code: i32,

    /// Duration of execution
    pub duration: Duration,
}

/// Runs plugin jars with a Java runtime
#[derive(Debug, Clone)]
pub struct PluginRunner {
    runtime: String,
}

impl Default for PluginRunner {
    fn default() -> Self {
        Self::new("java")
    }
}

impl PluginRunner {
    /// Creates a runner using `runtime` as the Java executable
    #[must_use]
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }

    /// Builds `<runtime> -jar <artifact> syntax <files...>`
    #[must_use]
    pub fn command<P: AsRef<Path>>(&self, artifact: &Path, files: &[P]) -> Command {
        let mut cmd = Command::new(&self.runtime);
        cmd.arg("-jar").arg(artifact).arg("syntax");
        for file in files {
            let file: &Path = file.as_ref();
            cmd.arg(file);
        }
        cmd
    }

    /// Runs the plugin's syntax check over `files`
    ///
    /// Returns the captured output on exit status 0. A process that cannot be
    /// started or exits non-zero yields [`SyntaxError::PipelineValidation`]
    /// carrying whatever was captured. If `deadline` expires the process is
    /// killed and [`SyntaxError::Timeout`] is returned. The deadline also
    /// bounds collecting the output, which stays open for as long as any
    /// process the plugin left behind holds the pipe.
    pub fn run_syntax<P: AsRef<Path>>(
        &self,
        artifact: &Path,
        files: &[P],
        deadline: &Deadline,
    ) -> Result<PluginRun, SyntaxError> {
        deadline.check()?;

        let mut cmd = self.command(artifact, files);
        let (mut reader, writer) = os_pipe::pipe()?;
        cmd.stdin(Stdio::null());
        cmd.stdout(writer.try_clone()?);
        cmd.stderr(writer);

        tracing::debug!(command = ?cmd, "Running plugin syntax check");

        let start = Instant::now();
        let child = cmd.spawn();
        // The command owns the parent's copies of the pipe writers; drop it so
        // the reader sees EOF when the child exits.
        drop(cmd);
        let mut child = child.map_err(|e| SyntaxError::PipelineValidation {
            output: format!("failed to start '{}': {e}", self.runtime),
        })?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });

        let status = wait_with_deadline(&mut child, deadline)?;
        let output = collect_output(&rx, deadline)?;
        let duration = start.elapsed();
        let exit_code = status.code().unwrap_or(-1);

        tracing::debug!(
            exit_code,
            duration_ms = duration.as_millis(),
            output = %output,
            "Plugin exited"
        );

        if !status.success() {
            return Err(SyntaxError::PipelineValidation { output });
        }

        Ok(PluginRun {
            output,
            exit_code,
            duration,
        })
    }
}

fn collect_output(rx: &Receiver<String>, deadline: &Deadline) -> Result<String, SyntaxError> {
    let Some(remaining) = deadline.remaining() else {
        return Ok(rx.recv().unwrap_or_default());
    };

    match rx.recv_timeout(remaining) {
        Ok(output) => Ok(output),
        Err(RecvTimeoutError::Disconnected) => Ok(String::new()),
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!("Plugin output still open after the process exited");
            Err(deadline.timeout_error())
        }
    }
}

fn wait_with_deadline(child: &mut Child, deadline: &Deadline) -> Result<ExitStatus, SyntaxError> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        if let Err(err) = deadline.check() {
            tracing::warn!(pid = child.id(), "Killing plugin process: {}", err);
            let _ = child.kill();
            let _ = child.wait();
            return Err(err);
        }

        let pause = deadline
            .remaining()
            .map_or(POLL_INTERVAL, |left| left.min(POLL_INTERVAL));
        thread::sleep(pause);
    }
}
