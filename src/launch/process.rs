//! Running the launcher process and classifying how it ended

use crate::log::Log;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Outcome code reported when the process could not be started or awaited
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = -1;
/// Outcome code reported when the global timeout killed the process
pub const TIMEOUT_EXIT_CODE: i32 = -2;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const KILL_GRACE: Duration = Duration::from_secs(5);

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Dry-run: command line written, nothing started
    DryRun,
    /// The process exited on its own with this code
    Completed(i32),
    /// The global timeout was reached and the process was killed
    TimedOut,
    /// The process could not be started or awaited
    LaunchFailed,
}

impl RunOutcome {
    /// Integer form: 0, the child's own code, or a negative sentinel
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::DryRun => 0,
            RunOutcome::Completed(code) => code,
            RunOutcome::TimedOut => TIMEOUT_EXIT_CODE,
            RunOutcome::LaunchFailed => LAUNCH_FAILURE_EXIT_CODE,
        }
    }

    pub fn timed_out(self) -> bool {
        self == RunOutcome::TimedOut
    }

    pub fn is_success(self) -> bool {
        matches!(self, RunOutcome::DryRun | RunOutcome::Completed(0))
    }

    /// Whether the run failed for operational reasons rather than failing tests
    pub fn is_operational_failure(self) -> bool {
        matches!(self, RunOutcome::TimedOut | RunOutcome::LaunchFailed)
    }
}

/// Everything needed to start the launcher once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    command: Vec<String>,
    cmd_log: PathBuf,
    out_log: PathBuf,
    err_log: PathBuf,
    timeout: Duration,
    dry_run: bool,
}

impl LaunchPlan {
    /// Plan a run whose log files live in `target_dir`
    pub fn new(command: Vec<String>, target_dir: &Path, timeout: Duration, dry_run: bool) -> Self {
        LaunchPlan {
            command,
            cmd_log: target_dir.join("console-launcher.cmd.log"),
            out_log: target_dir.join("console-launcher.out.log"),
            err_log: target_dir.join("console-launcher.err.log"),
            timeout,
            dry_run,
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn cmd_log(&self) -> &Path {
        &self.cmd_log
    }

    pub fn out_log(&self) -> &Path {
        &self.out_log
    }

    pub fn err_log(&self) -> &Path {
        &self.err_log
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Spawns, waits for and classifies one launcher process
pub struct ProcessRunner<'a> {
    log: &'a dyn Log,
}

impl<'a> ProcessRunner<'a> {
    pub fn new(log: &'a dyn Log) -> Self {
        ProcessRunner { log }
    }

    /// Execute the plan
    pub fn run(&self, plan: LaunchPlan) -> RunOutcome {
        if let Err(e) = prepare_target(&plan) {
            self.log.warn(&format!(
                "Preparing target path failed: {}: {}",
                plan.cmd_log.parent().unwrap_or(Path::new("")).display(),
                e
            ));
        }

        if plan.dry_run {
            self.log
                .info("Dry-run mode is active -- only printing command line");
            for token in &plan.command {
                self.log.info(token);
            }
            return RunOutcome::DryRun;
        }

        self.log.debug("Starting process...");
        for token in &plan.command {
            self.log.debug(token);
        }

        let mut child = match self.spawn(&plan) {
            Ok(child) => child,
            Err(e) => {
                self.log.error(&format!("Executing process failed: {}", e));
                return RunOutcome::LaunchFailed;
            }
        };
        self.log.debug(&format!("Process started: #{}", child.id()));

        let status = match wait_timeout(&mut child, plan.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                self.log.error(&format!(
                    "Global timeout of {} reached.",
                    describe(plan.timeout)
                ));
                self.log.error(&format!("Killing process #{}", child.id()));
                self.kill(&mut child);
                return RunOutcome::TimedOut;
            }
            Err(e) => {
                self.log.error(&format!("Executing process failed: {}", e));
                self.kill(&mut child);
                return RunOutcome::LaunchFailed;
            }
        };

        let code = exit_code(status);
        let (out_level, err_level) = if code == 0 {
            (tracing::Level::INFO, tracing::Level::WARN)
        } else {
            (tracing::Level::ERROR, tracing::Level::ERROR)
        };
        for (path, level) in [(&plan.out_log, out_level), (&plan.err_log, err_level)] {
            if let Err(e) = self.forward(path, level) {
                self.log.error(&format!(
                    "Reading {} failed: {}",
                    path.display(),
                    e
                ));
                return RunOutcome::LaunchFailed;
            }
        }
        RunOutcome::Completed(code)
    }

    fn spawn(&self, plan: &LaunchPlan) -> std::io::Result<Child> {
        let (program, args) = plan.command.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line")
        })?;
        Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(File::create(&plan.out_log)?)
            .stderr(File::create(&plan.err_log)?)
            .spawn()
    }

    /// Kill and reap, giving up after a short grace period
    fn kill(&self, child: &mut Child) {
        if let Err(e) = child.kill() {
            self.log
                .warn(&format!("Killing process #{} failed: {}", child.id(), e));
        }
        if let Ok(None) = wait_timeout(child, KILL_GRACE) {
            self.log
                .warn(&format!("Process #{} did not exit after kill", child.id()));
        }
    }

    /// Send every line of a captured stream to the log
    fn forward(&self, path: &Path, level: tracing::Level) -> std::io::Result<()> {
        let bytes = fs::read(path)?;
        for line in String::from_utf8_lossy(&bytes).lines() {
            self.log.log(level, line);
        }
        Ok(())
    }
}

/// Create the target directory, write the command log and truncate the stream logs
fn prepare_target(plan: &LaunchPlan) -> std::io::Result<()> {
    if let Some(dir) = plan.cmd_log.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut lines = plan.command.join("\n");
    lines.push('\n');
    fs::write(&plan.cmd_log, lines)?;
    for path in [&plan.err_log, &plan.out_log] {
        File::create(path)?;
    }
    Ok(())
}

/// Poll until the child exits or `timeout` elapses
fn wait_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(LAUNCH_FAILURE_EXIT_CODE)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(LAUNCH_FAILURE_EXIT_CODE)
}

fn describe(timeout: Duration) -> String {
    if timeout.subsec_nanos() != 0 {
        return format!("{:?}", timeout);
    }
    let secs = timeout.as_secs();
    let s = if secs == 1 { "" } else { "s" };
    format!("{} second{}", secs, s)
}
