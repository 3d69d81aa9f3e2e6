//! External AI agent process supervision.
//!
//! The host owns one [`AgentSession`] and hands it to whatever needs to show
//! or stop the agent. The puzzle core never sees it.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    NotRunning,
    Running { pid: u32 },
    FailedToStart(String),
    /// Exited on its own. `code` is `None` when killed by a signal.
    Finished { code: Option<i32> },
    /// Stopped by us.
    Terminated,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => write!(f, "AI Agent: Not running"),
            Self::Running { pid } => write!(f, "AI Agent: Running (PID: {})", pid),
            Self::FailedToStart(e) => write!(f, "AI Agent: Failed to start ({})", e),
            Self::Finished { code: Some(code) } => {
                write!(f, "AI Agent: Finished (Exit Code: {})", code)
            }
            Self::Finished { code: None } => write!(f, "AI Agent: Finished (Exit Code: unknown)"),
            Self::Terminated => write!(f, "AI Agent: Terminated"),
        }
    }
}

#[derive(Debug)]
pub struct AgentSession {
    child: Option<Child>,
    status: AgentStatus,
}

impl AgentSession {
    /// A session with no agent process.
    pub fn none() -> Self {
        Self {
            child: None,
            status: AgentStatus::NotRunning,
        }
    }

    /// Start `command` through the platform shell. Output goes to `log_path`
    /// when given, otherwise it is discarded.
    pub fn spawn(command: &str, log_path: Option<&Path>) -> Self {
        let (stdout, stderr) = match log_path.map(File::create) {
            Some(Ok(file)) => match file.try_clone() {
                Ok(copy) => (Stdio::from(file), Stdio::from(copy)),
                Err(_) => (Stdio::from(file), Stdio::null()),
            },
            Some(Err(e)) => {
                log::warn!("Cannot open agent log: {}", e);
                (Stdio::null(), Stdio::null())
            }
            None => (Stdio::null(), Stdio::null()),
        };

        match shell_command(command)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
        {
            Ok(child) => {
                let pid = child.id();
                log::info!("Started AI agent {:?} (PID {})", command, pid);
                Self {
                    child: Some(child),
                    status: AgentStatus::Running { pid },
                }
            }
            Err(e) => {
                log::error!("Error starting AI agent {:?}: {}", command, e);
                Self {
                    child: None,
                    status: AgentStatus::FailedToStart(e.to_string()),
                }
            }
        }
    }

    /// Check whether the agent has exited, without blocking.
    pub fn poll(&mut self) -> &AgentStatus {
        if let Some(child) = self.child.as_mut() {
            match child.try_wait() {
                Ok(Some(exit)) => {
                    log::info!("AI agent exited: {}", exit);
                    self.status = AgentStatus::Finished { code: exit.code() };
                    self.child = None;
                }
                Ok(None) => {}
                Err(e) => log::warn!("Cannot poll AI agent: {}", e),
            }
        }
        &self.status
    }

    /// Kill and reap the agent if it is still running. Safe to call repeatedly.
    pub fn terminate(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(exit)) => {
                self.status = AgentStatus::Finished { code: exit.code() };
            }
            _ => {
                if let Err(e) = child.kill() {
                    log::warn!("Cannot kill AI agent: {}", e);
                }
                let _ = child.wait();
                log::info!("AI agent terminated");
                self.status = AgentStatus::Terminated;
            }
        }
    }

    pub fn status(&self) -> &AgentStatus {
        &self.status
    }

    pub fn has_finished(&self) -> bool {
        matches!(self.status, AgentStatus::Finished { .. })
    }
}

impl Drop for AgentSession {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
