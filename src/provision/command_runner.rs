use std::process::Stdio;

use compio::process::Command;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

/// Runs an external program to completion.
pub trait CommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<(), CommandError>;
}

/// Spawns real OS processes, output goes straight to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    fn create_command(program: &str, args: &[String]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        let _ = cmd.stdin(Stdio::null());
        cmd
    }
}

impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<(), CommandError> {
        let command_line = format!("{} {}", program, args.join(" "));
        debug!("Spawning '{}'", command_line);

        let mut handle = Self::create_command(program, args)
            .spawn()
            .context(SpawnSnafu {
                command: command_line.clone(),
            })?;

        let status = handle.wait().await.context(WaitSnafu {
            command: command_line.clone(),
        })?;

        if status.success() {
            info!("'{}' completed successfully", command_line);
            Ok(())
        } else {
            Err(CommandError::UnsuccessfulExecution {
                command: command_line,
                status: status.code().unwrap_or(-1),
            })
        }
    }
}

#[derive(Debug, Snafu)]
pub enum CommandError {
    #[snafu(display("Failed to spawn command '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for command '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Command '{}' failed with exit code {}", command, status))]
    UnsuccessfulExecution { command: String, status: i32 },
}
