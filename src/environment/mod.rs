//! Environment composition for the wrapped binary.
//!
//! Layers, lowest to highest priority:
//!
//! 1. `remote` - the cached remote script
//! 2. `local` - the user's `local.env` overrides
//! 3. `middleware` - optional `middleware.sh` next to the config
//! 4. The inherited process environment, which always wins
//!
//! The composed result is a [`ChildEnv`], handed to the launch in one piece.

pub mod env_file;
pub mod layer;
pub mod loader;

pub use env_file::{is_valid_name, EnvFileParser};
pub use layer::{ChildEnv, EnvLayer, EnvLayerStack};
pub use loader::{LoaderKind, ScriptLoader, DEFAULT_SHELL};
