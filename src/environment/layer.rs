//! Environment variable layering.
//!
//! This module provides priority-based environment variable management
//! with source tracking for debugging, and the immutable [`ChildEnv`] that
//! is finally handed to the real binary.

use std::collections::{BTreeMap, HashMap};
use std::ffi::{OsStr, OsString};

/// Represents a layer of environment variables.
///
/// # Example
///
/// ```
/// use envshim::environment::EnvLayer;
///
/// let mut layer = EnvLayer::new("remote");
/// layer.set("ANTHROPIC_BASE_URL", "https://llm.example.com");
///
/// assert_eq!(layer.vars.get("ANTHROPIC_BASE_URL").map(String::as_str), Some("https://llm.example.com"));
/// assert_eq!(layer.source, "remote");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvLayer {
    /// Variables in this layer.
    pub vars: HashMap<String, String>,
    /// Source of this layer (for debugging).
    pub source: String,
}

impl EnvLayer {
    /// Create a new layer with the given source name.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            vars: HashMap::new(),
            source: source.into(),
        }
    }

    /// Create a layer from an existing map.
    pub fn from_vars(source: impl Into<String>, vars: HashMap<String, String>) -> Self {
        Self {
            vars,
            source: source.into(),
        }
    }

    /// Add a variable to this layer.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Check if this layer has a variable.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Get the number of variables in this layer.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if this layer is empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Manages layered environment variables.
///
/// Variables from higher layers override variables from lower layers.
/// The first layer pushed has lowest priority, the last has highest.
///
/// # Example
///
/// ```
/// use envshim::environment::{EnvLayer, EnvLayerStack};
///
/// let mut stack = EnvLayerStack::new();
///
/// let mut remote = EnvLayer::new("remote");
/// remote.set("BASE_URL", "https://central.example.com");
/// remote.set("MODEL", "large");
/// stack.push(remote);
///
/// let mut local = EnvLayer::new("local");
/// local.set("BASE_URL", "https://mine.example.com");
/// stack.push(local);
///
/// assert_eq!(stack.get("BASE_URL"), Some("https://mine.example.com"));
/// assert_eq!(stack.get("MODEL"), Some("large"));
/// assert_eq!(stack.source_of("BASE_URL"), Some("local"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvLayerStack {
    /// Layers from lowest to highest priority.
    layers: Vec<EnvLayer>,
}

impl EnvLayerStack {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self { layers: vec![] }
    }

    /// Add a layer above all existing ones.
    pub fn push(&mut self, layer: EnvLayer) {
        self.layers.push(layer);
    }

    /// Get the resolved value for a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.vars.get(key).map(String::as_str))
    }

    /// Get all resolved variables.
    pub fn resolve(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for layer in &self.layers {
            result.extend(layer.vars.clone());
        }
        result
    }

    /// Get the source of a variable's value.
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.vars.contains_key(key))
            .map(|layer| layer.source.as_str())
    }

    /// Get the number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

/// The complete, immutable environment for the child process.
///
/// Built in one pass from the injected layers and the inherited process
/// environment, which always wins. Inherited values are kept as raw
/// `OsString`s so non-UTF-8 values pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildEnv {
    vars: BTreeMap<OsString, OsString>,
}

impl ChildEnv {
    /// Compose injected layers under the inherited environment.
    pub fn compose<I, K, V>(stack: &EnvLayerStack, inherited: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut vars: BTreeMap<OsString, OsString> = stack
            .resolve()
            .into_iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect();

        for (key, value) in inherited {
            vars.insert(key.into(), value.into());
        }

        Self { vars }
    }

    /// Look up a variable.
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    /// Iterate over every variable in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
