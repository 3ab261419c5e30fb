//! Turning library entries into running DREAMM processes.

pub mod command;
pub mod process;

pub use command::{
    build_command, build_persistent_profile, Arg, EmulatorCommand, FsProbe, PathProbe,
};
pub use process::{HostWindow, LaunchConfig, NoWindow, MOUSE_WARP_VAR};
