//! Program providers: the decompiler side of the system.
//!
//! A provider turns input files into a [`ProgramGraph`] and reconstructs
//! source text on demand. Reconstruction can be slow and can fail for a single
//! class without affecting the others.

pub mod snapshot;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CoreResult;
use crate::model::{ClassSymbol, MethodSymbol, ProgramGraph};

pub use snapshot::SnapshotProvider;

/// Trait implemented by decompiler backends.
pub trait ProgramProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `path` is an input this provider can load (used for directory loads).
    fn accepts(&self, path: &Path) -> bool;

    /// Load `inputs` (in order) into one graph.
    fn load(&self, inputs: &[PathBuf]) -> CoreResult<ProgramGraph>;

    /// Reconstructed source of a whole class.
    fn class_source(&self, class: &ClassSymbol) -> CoreResult<String>;

    /// Reconstructed source of one method; `Ok(None)` when the method has no body.
    fn method_source(&self, method: &MethodSymbol) -> CoreResult<Option<String>>;
}

/// Registry for program providers; callers select by name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ProgramProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { providers: HashMap::new() }
    }

    pub fn register<P: ProgramProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.providers.insert(provider.name().to_string(), Arc::new(provider));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ProgramProvider>> {
        self.providers.get(name).cloned()
    }

    /// Return a sorted list of registered provider names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.providers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Registry populated with the built-in providers.
pub fn default_provider_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(SnapshotProvider);
    registry
}
