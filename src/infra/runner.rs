//! External process execution
//!
//! [`Runner`] is the single seam through which enki launches programs.
//! [`SystemRunner`] spawns real processes; [`FakeRunner`] records the
//! invocations and can be told to fail, for tests.

use std::ffi::{OsStr, OsString};
use std::io;
use std::process::Command;
use std::sync::{Mutex, PoisonError};

/// Outcome of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
    /// All of stdout, then all of stderr
    ///
    /// The two streams are captured separately, so writes are not
    /// interleaved in the order the process made them. Invalid UTF-8 is
    /// replaced.
    pub output: String,
}

impl RunOutput {
    /// Successful run with the given output
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            output: output.into(),
        }
    }

    /// Whether the process exited with status zero
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Execute a program and capture its output
///
/// A launch failure is an `Err`; a process that ran is always `Ok`, even
/// when it exited non-zero.
pub trait Runner {
    /// Run `program` with `args` and wait for it to exit
    ///
    /// Arguments reach the process byte for byte, including paths that are
    /// not valid UTF-8.
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<RunOutput>;
}

/// Runs processes on the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<RunOutput> {
        let output = Command::new(program).args(args).output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(RunOutput {
            code: output.status.code(),
            output: combined,
        })
    }
}

/// Runner double that records every invocation
///
/// With `fail_with` set, each run is recorded and then reported as a
/// non-zero exit carrying that message as output.
#[derive(Debug, Default)]
pub struct FakeRunner {
    cmds: Mutex<Vec<Vec<OsString>>>,
    fail_with: Option<String>,
    output: String,
}

impl FakeRunner {
    /// Runner that succeeds with empty output
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner whose invocations all exit with status 1
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// Output returned by successful runs
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// All recorded invocations, program first, lossily converted to UTF-8
    pub fn cmds(&self) -> Vec<Vec<String>> {
        self.os_cmds()
            .iter()
            .map(|cmd| {
                cmd.iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect()
            })
            .collect()
    }

    /// All recorded invocations exactly as passed
    pub fn os_cmds(&self) -> Vec<Vec<OsString>> {
        self.cmds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check that `expected` were run in this relative order
    ///
    /// Returns a description of the first command not found.
    pub fn includes_cmds(&self, expected: &[Vec<&str>]) -> Result<(), String> {
        let cmds = self.os_cmds();
        let mut from = 0;
        for wanted in expected {
            let position = cmds[from..].iter().position(|cmd| {
                cmd.len() == wanted.len()
                    && cmd.iter().zip(wanted).all(|(a, b)| a.as_os_str() == OsStr::new(b))
            });
            match position {
                Some(offset) => from += offset + 1,
                None => {
                    return Err(format!(
                        "command '{}' not found in {:?}",
                        wanted.join(" "),
                        cmds
                    ))
                }
            }
        }
        Ok(())
    }

    /// Forget all recorded invocations
    pub fn clear(&self) {
        self.cmds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Runner for FakeRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<RunOutput> {
        let mut cmd = Vec::with_capacity(args.len() + 1);
        cmd.push(OsString::from(program));
        cmd.extend(args.iter().cloned());
        self.cmds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cmd);

        Ok(match &self.fail_with {
            Some(message) => RunOutput {
                code: Some(1),
                output: message.clone(),
            },
            None => RunOutput::success(self.output.clone()),
        })
    }
}
