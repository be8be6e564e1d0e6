//! Runs external commands and captures their output.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::command::MixerCommand;

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// A successful run that printed `stdout`.
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// A run that exited with `code` and printed `stderr`.
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },
}

/// Executes a [`MixerCommand`] to completion.
///
/// There is no timeout: a hung utility blocks the caller.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &MixerCommand) -> Result<CommandOutput, InvokeError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &MixerCommand) -> Result<CommandOutput, InvokeError> {
        debug!(%command, "invoking");

        let output = Command::new(&command.program)
            .args(&command.args)
            // Report text is parsed; keep it untranslated
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| InvokeError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(any(test, feature = "testing"))]
pub use scripted::ScriptedRunner;

#[cfg(any(test, feature = "testing"))]
mod scripted {
    use super::*;
    use std::sync::Mutex;

    enum Reply {
        Output(CommandOutput),
        Missing,
    }

    struct Rule {
        program: Option<String>,
        args: Vec<String>,
        reply: Reply,
    }

    impl Rule {
        fn matches(&self, command: &MixerCommand) -> bool {
            let program_ok = self
                .program
                .as_ref()
                .map_or(true, |p| p == &command.program);
            let needle: Vec<&str> = self.args.iter().map(String::as_str).collect();
            program_ok && command.has_args(&needle)
        }
    }

    /// Canned replies keyed by argument runs, with a log of every invocation.
    ///
    /// The first matching rule wins. Unmatched commands succeed with empty output.
    #[derive(Default)]
    pub struct ScriptedRunner {
        rules: Mutex<Vec<Rule>>,
        calls: Mutex<Vec<MixerCommand>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        fn push(&self, program: Option<&str>, args: &[&str], reply: Reply) {
            self.rules.lock().unwrap().push(Rule {
                program: program.map(str::to_string),
                args: args.iter().map(|a| a.to_string()).collect(),
                reply,
            });
        }

        /// Reply with `output` to commands containing `args`.
        pub fn on(&self, args: &[&str], output: CommandOutput) -> &Self {
            self.push(None, args, Reply::Output(output));
            self
        }

        /// Reply with `output` to `program` invocations containing `args`.
        pub fn on_program(&self, program: &str, args: &[&str], output: CommandOutput) -> &Self {
            self.push(Some(program), args, Reply::Output(output));
            self
        }

        /// Fail to spawn commands containing `args`, as if the program were missing.
        pub fn missing(&self, args: &[&str]) -> &Self {
            self.push(None, args, Reply::Missing);
            self
        }

        /// Every command run so far, in order.
        pub fn calls(&self) -> Vec<MixerCommand> {
            self.calls.lock().unwrap().clone()
        }

        /// Rendered command lines, in order.
        pub fn call_lines(&self) -> Vec<String> {
            self.calls().iter().map(ToString::to_string).collect()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, command: &MixerCommand) -> Result<CommandOutput, InvokeError> {
            self.calls.lock().unwrap().push(command.clone());

            let rules = self.rules.lock().unwrap();
            match rules.iter().find(|rule| rule.matches(command)) {
                Some(Rule {
                    reply: Reply::Output(output),
                    ..
                }) => Ok(output.clone()),
                Some(Rule {
                    reply: Reply::Missing,
                    ..
                }) => Err(InvokeError::Spawn {
                    program: command.program.clone(),
                    source: io::Error::new(io::ErrorKind::NotFound, "scripted: not found"),
                }),
                None => Ok(CommandOutput::ok(Vec::new())),
            }
        }
    }
}
