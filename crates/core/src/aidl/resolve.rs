use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::aidl::{detect_aidl_interface, AidlInterface, ClassSearch};
use crate::error::{CoreError, CoreResult};
use crate::model::ClassSymbol;

/// Full name of the first class whose superclass renders as
/// `<interface>$Stub`, if any.
///
/// When several classes extend the same stub only the first one in search
/// order is reported.
pub fn resolve_implementation(
    interface: &AidlInterface,
    search: &dyn ClassSearch,
) -> Option<String> {
    let stub = interface.stub_class_name();
    search
        .find_class(&|candidate: &ClassSymbol| {
            candidate.superclass.as_deref() == Some(stub.as_str())
        })
        .map(|class| class.full_name.clone())
}

/// Resolve many interfaces with a single pass over `classes`.
///
/// Gives the same answer as calling [`resolve_implementation`] per interface
/// over the same list: the first extender of each stub wins.
pub fn resolve_batch(
    interfaces: &[AidlInterface],
    classes: &[&ClassSymbol],
) -> Vec<AidlInterface> {
    let mut first_by_super: HashMap<&str, &str> = HashMap::new();
    for class in classes {
        if let Some(superclass) = class.superclass.as_deref() {
            first_by_super.entry(superclass).or_insert(class.full_name.as_str());
        }
    }
    interfaces
        .iter()
        .map(|interface| {
            let stub = interface.stub_class_name();
            let implementation = first_by_super.get(stub.as_str()).map(|name| name.to_string());
            interface.resolved(implementation)
        })
        .collect()
}

/// Detection and resolution results keyed by interface full name.
///
/// Belongs to one loaded program and is dropped with it. Reads and writes may
/// come from any thread; a write replaces the whole entry.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: RwLock<HashMap<String, Arc<AidlInterface>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, interface_name: &str) -> Option<Arc<AidlInterface>> {
        self.entries.read().get(interface_name).cloned()
    }

    /// Store `interface`, replacing any previous entry for the same name.
    pub fn insert(&self, interface: AidlInterface) -> Arc<AidlInterface> {
        let entry = Arc::new(interface);
        self.entries.write().insert(entry.interface_name().to_string(), Arc::clone(&entry));
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Cached interface names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Memoizing front end over detection and [`resolve_implementation`].
pub struct ImplementationResolver<'a, S> {
    cache: &'a ResolutionCache,
    search: S,
}

impl<'a, S: ClassSearch> ImplementationResolver<'a, S> {
    pub fn new(cache: &'a ResolutionCache, search: S) -> Self {
        Self { cache, search }
    }

    /// Cached interface for `interface_name`, detecting and resolving it on a
    /// miss.
    ///
    /// `locate` maps the name to its class and is only called on a miss or
    /// when `force` is set. A forced lookup always recomputes and overwrites
    /// the entry; concurrent forced lookups each do the work and the last
    /// write stays.
    pub fn lookup<'c, F>(
        &self,
        interface_name: &str,
        force: bool,
        locate: F,
    ) -> CoreResult<Arc<AidlInterface>>
    where
        F: FnOnce(&str) -> Option<&'c ClassSymbol>,
    {
        if !force {
            if let Some(hit) = self.cache.get(interface_name) {
                debug!(interface = interface_name, "AIDL cache hit");
                return Ok(hit);
            }
        }

        let class = locate(interface_name)
            .ok_or_else(|| CoreError::NotFound(format!("class {interface_name}")))?;
        let detected = detect_aidl_interface(class).ok_or_else(|| {
            CoreError::NotFound(format!("{interface_name} is not an AIDL interface"))
        })?;
        let implementation = resolve_implementation(&detected, &self.search);
        debug!(
            interface = interface_name,
            implementation = implementation.as_deref().unwrap_or("<none>"),
            force,
            "resolved AIDL interface"
        );
        Ok(self.cache.insert(detected.resolved(implementation)))
    }
}
