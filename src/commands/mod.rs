mod init;
mod verify;

pub use init::{cmd_init, cmd_init_with_fs};
pub use verify::{cmd_verify, cmd_verify_with_fs};

/// Process exit codes shared by all commands.
pub mod exit_code {
    /// Verification ran and found no violations.
    pub const COMPLIANT: i32 = 0;
    /// Verification ran and found violations.
    pub const VIOLATIONS: i32 = 1;
    /// Input, configuration or output could not be handled.
    pub const FAILURE: i32 = 2;
}
