//! Detection and resolution of generated AIDL interfaces.
//!
//! The AIDL compiler emits an interface `IFoo` with nested `IFoo.Default` and
//! `IFoo.Stub`, and `IFoo.Stub.Proxy` inside the stub. Services implement the
//! interface by extending `IFoo$Stub`. Detection here is purely structural:
//! it looks for those three fixed nested names and nothing else.

pub mod detect;
pub mod resolve;
pub mod search;

use serde::{Deserialize, Serialize};

pub use detect::detect_aidl_interface;
pub use resolve::{resolve_batch, resolve_implementation, ImplementationResolver, ResolutionCache};
pub use search::{find_first, ClassSearch, ListClassSearch};

pub const AIDL_DEFAULT: &str = "Default";
pub const AIDL_STUB: &str = "Stub";
pub const AIDL_STUB_PROXY: &str = "Proxy";

/// An interface whose nested classes match the AIDL shape.
///
/// Values are never modified once built; resolving the implementation
/// produces a new value through [`AidlInterface::resolved`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidlInterface {
    interface_name: String,
    methods: Vec<String>,
    implementation: Option<String>,
}

impl AidlInterface {
    // Only the detector builds these, so every value satisfies the shape.
    pub(crate) fn new(interface_name: String, methods: Vec<String>) -> Self {
        Self { interface_name, methods, implementation: None }
    }

    /// Copy of this interface carrying the given implementation class.
    pub fn resolved(&self, implementation: Option<String>) -> Self {
        Self {
            interface_name: self.interface_name.clone(),
            methods: self.methods.clone(),
            implementation,
        }
    }

    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    /// Rendered signatures of the interface's own declared methods.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn implementation(&self) -> Option<&str> {
        self.implementation.as_deref()
    }

    /// Superclass rendering an implementation must declare.
    pub fn stub_class_name(&self) -> String {
        format!("{}${}", self.interface_name, AIDL_STUB)
    }
}
