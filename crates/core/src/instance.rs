//! Program instances: one input path bound to one provider.
//!
//! A [`ProgramInstance`] owns at most one [`LoadedProgram`]. Loading again
//! drops the previous program (and its AIDL cache) before the new one is
//! built. Every graph-reading operation fails with [`CoreError::NotLoaded`]
//! while nothing is bound.
//!
//! Class arguments may be written in either dialect; binary descriptors are
//! converted to source names first. Members are matched against their
//! rendered signatures (`com.example.Foo.bar(int):void`,
//! `com.example.Foo.count :int`), and binary member references are converted
//! the same way.
//!
//! [`InstanceRegistry`] is the multi-program surface for a long-running
//! transport; [`InstanceRegistry::from_config`] sizes it from
//! [`ServiceConfig`]. The CLI opens one instance per run and does not use it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::aidl::{
    detect_aidl_interface, resolve_batch, AidlInterface, ImplementationResolver, ListClassSearch,
    ResolutionCache,
};
use crate::config::ServiceConfig;
use crate::error::{CoreError, CoreResult};
use crate::model::{ClassSymbol, FieldSymbol, MethodSymbol, ProgramGraph};
use crate::provider::ProgramProvider;
use crate::search::search_methods_containing;
use crate::signature::{
    class_name_to_source, classify_dialect, field_reference_to_source, method_reference_to_source,
    Dialect,
};

/// A bound program graph together with the cache scoped to it.
#[derive(Debug)]
pub struct LoadedProgram {
    graph: ProgramGraph,
    cache: ResolutionCache,
}

impl LoadedProgram {
    pub fn new(graph: ProgramGraph) -> Self {
        Self { graph, cache: ResolutionCache::new() }
    }

    pub fn graph(&self) -> &ProgramGraph {
        &self.graph
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }
}

/// Summary of an instance for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub id: String,
    pub path: String,
    pub provider: String,
    pub loaded: bool,
    pub class_count: Option<usize>,
    pub fingerprint: Option<String>,
    pub loaded_at: Option<String>,
    pub cached_interfaces: usize,
}

pub struct ProgramInstance {
    id: String,
    path: PathBuf,
    provider: Arc<dyn ProgramProvider>,
    program: Option<LoadedProgram>,
}

impl ProgramInstance {
    pub fn new(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        provider: Arc<dyn ProgramProvider>,
    ) -> Self {
        Self { id: id.into(), path: path.into(), provider, program: None }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.program.is_some()
    }

    /// Load the instance path as a single input file.
    pub fn load(&mut self) -> CoreResult<()> {
        self.unload();

        let metadata = fs::metadata(&self.path).map_err(|_| self.invalid_path("no such file"))?;
        if !metadata.is_file() {
            return Err(self.invalid_path("not a file"));
        }

        let graph = self.provider.load(std::slice::from_ref(&self.path))?;
        self.bind(graph);
        Ok(())
    }

    /// Load every input the provider accepts from the instance directory,
    /// in file-name order.
    pub fn load_dir(&mut self) -> CoreResult<()> {
        self.unload();

        let metadata =
            fs::metadata(&self.path).map_err(|_| self.invalid_path("no such directory"))?;
        if !metadata.is_dir() {
            return Err(self.invalid_path("not a directory"));
        }

        let entries = fs::read_dir(&self.path)
            .map_err(|e| self.invalid_path(&format!("cannot read directory: {e}")))?;
        let mut inputs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.provider.accepts(path))
            .collect();
        inputs.sort();
        if inputs.is_empty() {
            return Err(self.invalid_path("contains no loadable inputs"));
        }

        let graph = self.provider.load(&inputs)?;
        self.bind(graph);
        Ok(())
    }

    /// Bind an already-built graph, replacing whatever was loaded.
    pub fn bind(&mut self, graph: ProgramGraph) {
        self.unload();
        info!(instance = %self.id, classes = graph.class_count(), "bound program");
        self.program = Some(LoadedProgram::new(graph));
    }

    /// Drop the bound program and its cache. Returns whether anything was bound.
    pub fn unload(&mut self) -> bool {
        let released = self.program.take().is_some();
        if released {
            info!(instance = %self.id, "unloaded program");
        }
        released
    }

    pub fn loaded(&self) -> CoreResult<&LoadedProgram> {
        self.program.as_ref().ok_or(CoreError::NotLoaded)
    }

    pub fn info(&self) -> InstanceInfo {
        let program = self.program.as_ref();
        InstanceInfo {
            id: self.id.clone(),
            path: self.path.display().to_string(),
            provider: self.provider.name().to_string(),
            loaded: program.is_some(),
            class_count: program.map(|p| p.graph.class_count()),
            fingerprint: program.and_then(|p| p.graph.fingerprint.clone()),
            loaded_at: program.and_then(|p| p.graph.loaded_at.clone()),
            cached_interfaces: program.map(|p| p.cache.len()).unwrap_or(0),
        }
    }

    pub fn manifest(&self) -> CoreResult<String> {
        self.loaded()?
            .graph
            .manifest
            .clone()
            .ok_or_else(|| CoreError::NotFound("AndroidManifest.xml".to_string()))
    }

    pub fn all_classes(&self) -> CoreResult<Vec<String>> {
        let program = self.loaded()?;
        Ok(program.graph.classes_with_inners().iter().map(|c| c.full_name.clone()).collect())
    }

    pub fn class_source(&self, class_name: &str) -> CoreResult<String> {
        let class = self.class(class_name)?;
        self.provider.class_source(class)
    }

    pub fn method_source(&self, class_name: &str, method: &str) -> CoreResult<String> {
        let method = self.method(class_name, method)?;
        self.provider.method_source(method)?.ok_or_else(|| {
            CoreError::NotFound(format!("source of {}", method.render_signature()))
        })
    }

    /// Declared superclass, `java.lang.Object` when none is declared.
    pub fn superclass(&self, class_name: &str) -> CoreResult<String> {
        Ok(self.class(class_name)?.superclass_or_default().to_string())
    }

    pub fn interfaces(&self, class_name: &str) -> CoreResult<Vec<String>> {
        Ok(self.class(class_name)?.interfaces.clone())
    }

    pub fn class_methods(&self, class_name: &str) -> CoreResult<Vec<String>> {
        Ok(self.class(class_name)?.methods.iter().map(MethodSymbol::render_signature).collect())
    }

    pub fn class_fields(&self, class_name: &str) -> CoreResult<Vec<String>> {
        Ok(self.class(class_name)?.fields.iter().map(FieldSymbol::render_signature).collect())
    }

    pub fn class_callers(&self, class_name: &str) -> CoreResult<Vec<String>> {
        Ok(self.class(class_name)?.used_in.clone())
    }

    pub fn method_callers(&self, class_name: &str, method: &str) -> CoreResult<Vec<String>> {
        Ok(self.method(class_name, method)?.used_in.clone())
    }

    pub fn field_callers(&self, class_name: &str, field: &str) -> CoreResult<Vec<String>> {
        Ok(self.field(class_name, field)?.used_in.clone())
    }

    pub fn method_overrides(&self, class_name: &str, method: &str) -> CoreResult<Vec<String>> {
        Ok(self.method(class_name, method)?.overrides.clone())
    }

    /// Methods whose reconstructed source contains `needle`. Classes that
    /// fail to reconstruct are skipped.
    pub fn search_text(&self, needle: &str) -> CoreResult<Vec<String>> {
        let program = self.loaded()?;
        let classes = program.graph.classes_with_inners();
        Ok(search_methods_containing(self.provider.as_ref(), &classes, needle))
    }

    /// Detect every AIDL interface, resolve all implementations in one pass
    /// and refresh the cache. Names are returned in class order.
    pub fn search_aidl_classes(&self) -> CoreResult<Vec<String>> {
        let program = self.loaded()?;
        let classes = program.graph.classes_with_inners();
        let detected: Vec<AidlInterface> =
            classes.iter().filter_map(|class| detect_aidl_interface(class)).collect();

        let names = detected.iter().map(|i| i.interface_name().to_string()).collect();
        for interface in resolve_batch(&detected, &classes) {
            program.cache.insert(interface);
        }
        Ok(names)
    }

    /// Cached AIDL interface for `interface_name`, detecting and resolving
    /// on a miss or when `force` is set.
    pub fn aidl_interface(
        &self,
        interface_name: &str,
        force: bool,
    ) -> CoreResult<Arc<AidlInterface>> {
        let program = self.loaded()?;
        let name = normalize_class_name(interface_name)?;
        let classes = program.graph.classes_with_inners();
        let resolver = ImplementationResolver::new(&program.cache, ListClassSearch::new(&classes));
        resolver.lookup(&name, force, |n| program.graph.find_class(n))
    }

    pub fn aidl_methods(&self, interface_name: &str) -> CoreResult<Vec<String>> {
        Ok(self.aidl_interface(interface_name, false)?.methods().to_vec())
    }

    pub fn aidl_implementation(&self, interface_name: &str) -> CoreResult<String> {
        let interface = self.aidl_interface(interface_name, false)?;
        interface.implementation().map(str::to_string).ok_or_else(|| {
            CoreError::NotFound(format!("implementation of {}", interface.interface_name()))
        })
    }

    fn class(&self, class_name: &str) -> CoreResult<&ClassSymbol> {
        let program = self.loaded()?;
        let name = normalize_class_name(class_name)?;
        program.graph.find_class(&name).ok_or_else(|| CoreError::NotFound(format!("class {name}")))
    }

    fn method(&self, class_name: &str, method: &str) -> CoreResult<&MethodSymbol> {
        let class = self.class(class_name)?;
        let signature = normalize_member(method, method_reference_to_source)?;
        class
            .find_method(&signature)
            .ok_or_else(|| CoreError::NotFound(format!("method {signature}")))
    }

    fn field(&self, class_name: &str, field: &str) -> CoreResult<&FieldSymbol> {
        let class = self.class(class_name)?;
        let signature = normalize_member(field, field_reference_to_source)?;
        class.find_field(&signature).ok_or_else(|| CoreError::NotFound(format!("field {signature}")))
    }

    fn invalid_path(&self, reason: &str) -> CoreError {
        error!(instance = %self.id, path = %self.path.display(), reason, "invalid source path");
        CoreError::source_path(&self.path, reason)
    }
}

/// Source-dialect class name for `input` in either dialect.
pub fn normalize_class_name(input: &str) -> CoreResult<String> {
    match classify_dialect(input)? {
        Dialect::Binary => class_name_to_source(input),
        Dialect::Source => Ok(input.to_string()),
    }
}

fn normalize_member(input: &str, convert: fn(&str) -> CoreResult<String>) -> CoreResult<String> {
    match classify_dialect(input)? {
        Dialect::Binary => convert(input),
        Dialect::Source => Ok(input.to_string()),
    }
}

/// Bounded set of program instances keyed by id.
///
/// When the bound is exceeded the oldest inserted instances are evicted and
/// unloaded.
pub struct InstanceRegistry {
    max_instances: usize,
    instances: Vec<ProgramInstance>,
}

impl InstanceRegistry {
    pub fn new(max_instances: usize) -> Self {
        Self { max_instances: max_instances.max(1), instances: Vec::new() }
    }

    /// Registry bounded by `config.max_instances`.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.max_instances)
    }

    pub fn max_instances(&self) -> usize {
        self.max_instances
    }

    /// Insert `instance`, replacing one with the same id. Returns evicted ids.
    pub fn insert(&mut self, instance: ProgramInstance) -> Vec<String> {
        self.unload(instance.id());
        self.instances.push(instance);
        self.evict_over_limit()
    }

    /// Change the bound (at least 1). Returns evicted ids.
    pub fn set_max_instances(&mut self, max_instances: usize) -> Vec<String> {
        self.max_instances = max_instances.max(1);
        self.evict_over_limit()
    }

    pub fn get(&self, id: &str) -> Option<&ProgramInstance> {
        self.instances.iter().find(|i| i.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ProgramInstance> {
        self.instances.iter_mut().find(|i| i.id() == id)
    }

    /// Remove and unload one instance. Returns whether it existed.
    pub fn unload(&mut self, id: &str) -> bool {
        match self.instances.iter().position(|i| i.id() == id) {
            Some(idx) => {
                self.instances.remove(idx).unload();
                true
            }
            None => false,
        }
    }

    /// Remove and unload every instance. Returns how many there were.
    pub fn unload_all(&mut self) -> usize {
        let count = self.instances.len();
        for mut instance in self.instances.drain(..) {
            instance.unload();
        }
        count
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn evict_over_limit(&mut self) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.instances.len() > self.max_instances {
            let mut oldest = self.instances.remove(0);
            info!(instance = oldest.id(), "evicting instance over limit");
            oldest.unload();
            evicted.push(oldest.id().to_string());
        }
        evicted
    }
}
