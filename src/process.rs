use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not start {program}: {err}")]
    Spawn {
        program: String,
        err: std::io::Error,
    },

    #[error("`{command}` exited with code {status}")]
    Exit {
        command: String,
        status: ExitStatus,
    },

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// An external command, as it will be executed.
///
/// Arguments are passed to the program directly; no shell is involved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    /// Written to the child's standard input, then closed.
    /// Never echoed to the console.
    pub stdin: Option<String>,
}

impl CommandLine {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            ..Default::default()
        }
    }

    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub fn path_arg<P: AsRef<Path>>(self, path: P) -> Self {
        let path = path.as_ref().to_string_lossy().to_string();
        self.arg(path)
    }

    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn stdin(mut self, input: String) -> Self {
        self.stdin = Some(input);
        self
    }

    fn command(&self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command.stdin(if self.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        command
    }

    fn spawn_error(&self, err: std::io::Error) -> Error {
        Error::Spawn {
            program: self.program.clone(),
            err,
        }
    }

    fn check(&self, status: ExitStatus) -> Result<(), Error> {
        if status.success() {
            Ok(())
        } else {
            Err(Error::Exit {
                command: self.to_string(),
                status,
            })
        }
    }
}

impl Display for CommandLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Executes external commands on behalf of the pipeline and the listers.
pub trait Runner {
    /// Run a command to completion, with its output going straight to the console.
    fn run(&self, command: &CommandLine) -> Result<(), Error>;

    /// Run a command to completion and return its standard output.
    /// Standard error still goes to the console.
    fn capture(&self, command: &CommandLine) -> Result<String, Error>;
}

/// Runs commands on the local machine.
///
/// Child processes inherit our stdout and stderr, so their output reaches
/// the terminal as it is written and nothing is lost when they exit.
pub struct System;

impl Runner for System {
    fn run(&self, command: &CommandLine) -> Result<(), Error> {
        println!("+ {command}");
        if let Some(dir) = &command.current_dir {
            debug!("working directory: {}", dir.display());
        }

        let mut child = command
            .command()
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| command.spawn_error(err))?;

        // A write error is reported only if the child itself succeeded.
        let written = match (&command.stdin, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => stdin.write_all(input.as_bytes()),
            _ => Ok(()),
        };

        let status = child.wait()?;
        command.check(status)?;
        Ok(written?)
    }

    fn capture(&self, command: &CommandLine) -> Result<String, Error> {
        debug!("capturing output of `{command}`");

        let child = command
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| command.spawn_error(err))?;

        let output = child.wait_with_output()?;
        command.check(output.status)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
