//! Running DREAMM as a child process while the launcher window is hidden.

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};

use super::command::EmulatorCommand;
use crate::error::LaunchError;

/// Environment variable that makes SDL warp the pointer in relative mode.
/// Fixes sluggish mouse movement in DREAMM on some setups.
pub const MOUSE_WARP_VAR: &str = "SDL_MOUSE_RELATIVE_MODE_WARP";

/// The launcher's own window, hidden while a title runs.
pub trait HostWindow {
    fn hide(&mut self);
    /// Show the window again and bring it to the front.
    fn restore(&mut self);
}

/// Host window for front ends without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWindow;

impl HostWindow for NoWindow {
    fn hide(&mut self) {}
    fn restore(&mut self) {}
}

/// Configuration for launching an executable.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub binary: PathBuf,
    pub arguments: Vec<String>,
    /// Additional environment variables.
    pub env_vars: Vec<(String, String)>,
    /// Variables removed from the inherited environment.
    pub env_removed: Vec<String>,
    /// Wrapper commands prepended before the real command (e.g. gamemoderun).
    pub wrapper_commands: Vec<String>,
}

impl LaunchConfig {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            arguments: Vec::new(),
            env_vars: Vec::new(),
            env_removed: Vec::new(),
            wrapper_commands: Vec::new(),
        }
    }

    /// Configuration running a built emulator command.
    pub fn from_command(command: &EmulatorCommand) -> Self {
        Self::new(&command.program).with_arguments(command.process_args())
    }

    pub fn with_arguments(mut self, args: Vec<String>) -> Self {
        self.arguments = args;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.env_removed.retain(|k| *k != key);
        self.env_vars.push((key, value.into()));
        self
    }

    pub fn without_env(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.env_vars.retain(|(k, _)| *k != key);
        self.env_removed.push(key);
        self
    }

    /// Set or clear [`MOUSE_WARP_VAR`] for the child.
    pub fn with_mouse_warp(self, enabled: bool) -> Self {
        if enabled {
            self.with_env(MOUSE_WARP_VAR, "1")
        } else {
            self.without_env(MOUSE_WARP_VAR)
        }
    }

    pub fn with_wrapper(mut self, commands: Vec<String>) -> Self {
        self.wrapper_commands = commands;
        self
    }

    /// Program that is actually executed (the first wrapper, if any).
    pub fn program(&self) -> String {
        self.wrapper_commands
            .first()
            .cloned()
            .unwrap_or_else(|| self.binary.display().to_string())
    }

    fn command(&self) -> Command {
        let mut cmd = if self.wrapper_commands.is_empty() {
            Command::new(&self.binary)
        } else {
            let mut c = Command::new(&self.wrapper_commands[0]);
            // Insert remaining wrapper args, then the real binary
            for arg in &self.wrapper_commands[1..] {
                c.arg(arg);
            }
            c.arg(&self.binary);
            c
        };
        cmd.args(&self.arguments);

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        for key in &self.env_removed {
            cmd.env_remove(key);
        }
        cmd
    }
}

/// Start the process without waiting for it.
pub fn spawn(config: &LaunchConfig) -> Result<Child, LaunchError> {
    tracing::info!(
        "Starting {} {:?} (wrapper: {:?})",
        config.binary.display(),
        config.arguments,
        config.wrapper_commands
    );
    config.command().spawn().map_err(|source| LaunchError::Spawn {
        program: config.program(),
        source,
    })
}

/// Start the process and block until it exits.
///
/// A non-zero exit is reported through the returned status, not as an error.
pub fn run_blocking(config: &LaunchConfig) -> Result<ExitStatus, LaunchError> {
    let mut child = spawn(config)?;
    let status = child.wait().map_err(|source| LaunchError::Wait {
        program: config.program(),
        source,
    })?;
    tracing::info!("{} exited with {status}", config.binary.display());
    Ok(status)
}

/// Hide `window`, run the process to completion, then restore `window`.
/// The window is restored even when the process fails to start.
pub fn run_with_hidden_window(
    config: &LaunchConfig,
    window: &mut dyn HostWindow,
) -> Result<ExitStatus, LaunchError> {
    window.hide();
    let result = run_blocking(config);
    window.restore();
    result
}
