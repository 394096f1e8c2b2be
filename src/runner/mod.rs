//! Running a wrapped command.

pub mod invocation;
pub mod mode;

pub use invocation::{run_wrapper, Invocation};
pub use mode::{detect_mode, invoked_command, Mode, MANAGEMENT_NAME};
