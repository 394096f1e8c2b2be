//! envshim - launch-time wrapper for command-line tools.
//!
//! envshim sits in front of a real binary under the same name. On every
//! launch it finds the real binary, makes sure a recent copy of a centrally
//! managed environment script is cached, layers the user's overrides on
//! top, and replaces itself with the real binary.
//!
//! # Modules
//!
//! - [`cache`] - Atomic cache writes, freshness, and the refresh policy
//! - [`cli`] - Management-mode argument parsing and commands
//! - [`config`] - Settings, per-command directories, and `local.env`
//! - [`environment`] - Script loading, layering, and the child environment
//! - [`error`] - Error types, result alias, and exit codes
//! - [`fetch`] - Bounded HTTP fetches of the remote script
//! - [`install`] - One-time setup of a wrapped command
//! - [`launch`] - Handing over to the real binary
//! - [`resolver`] - Finding the real binary past the wrapper itself
//! - [`runner`] - One wrapper invocation and mode detection
//! - [`ui`] - Terminal output and prompts
//!
//! # Example
//!
//! ```
//! use envshim::environment::{ChildEnv, EnvLayer, EnvLayerStack};
//!
//! let mut remote = EnvLayer::new("remote");
//! remote.set("BASE_URL", "https://central.example.com");
//! let mut stack = EnvLayerStack::new();
//! stack.push(remote);
//!
//! // Values the user already exported always win.
//! let env = ChildEnv::compose(&stack, [("BASE_URL", "https://mine.example.com")]);
//! assert_eq!(env.get("BASE_URL").unwrap(), "https://mine.example.com");
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod fetch;
pub mod install;
pub mod launch;
pub mod resolver;
pub mod runner;
pub mod ui;

pub use error::{Result, ShimError};
