use tracing::trace;

use crate::aidl::{AidlInterface, AIDL_DEFAULT, AIDL_STUB, AIDL_STUB_PROXY};
use crate::model::ClassSymbol;

/// Classify `candidate` as an AIDL interface from its nested classes.
///
/// Requires a direct nested `Default`, a direct nested `Stub`, and a `Proxy`
/// nested in that `Stub`. The method list comes from `candidate` itself.
pub fn detect_aidl_interface(candidate: &ClassSymbol) -> Option<AidlInterface> {
    let mut default = None;
    let mut stub = None;
    for inner in &candidate.inner_classes {
        if default.is_none() && inner.name == AIDL_DEFAULT {
            default = Some(inner);
        } else if stub.is_none() && inner.name == AIDL_STUB {
            stub = Some(inner);
        }
        if default.is_some() && stub.is_some() {
            break;
        }
    }

    let (Some(_), Some(stub)) = (default, stub) else {
        return None;
    };
    if !stub.inner_classes.iter().any(|inner| inner.name == AIDL_STUB_PROXY) {
        return None;
    }

    trace!(interface = %candidate.full_name, "detected AIDL interface");
    let methods = candidate.methods.iter().map(|m| m.render_signature()).collect();
    Some(AidlInterface::new(candidate.full_name.clone(), methods))
}
