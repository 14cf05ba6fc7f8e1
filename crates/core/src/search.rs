//! Full-text search over reconstructed sources.
//!
//! Each class is reconstructed and scanned on the rayon pool. A class that
//! fails, including a provider panic while decompiling it, is logged and
//! contributes nothing; it never aborts the search.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::error;

use crate::error::{CoreError, CoreResult};
use crate::model::ClassSymbol;
use crate::provider::ProgramProvider;

/// Rendered signatures of every method whose source contains `needle`.
///
/// Classes whose full source does not contain `needle` are skipped before
/// their methods are reconstructed. Results follow `classes` order, then
/// declaration order within a class. An empty needle matches nothing.
pub fn search_methods_containing(
    provider: &dyn ProgramProvider,
    classes: &[&ClassSymbol],
    needle: &str,
) -> Vec<String> {
    if needle.is_empty() {
        return Vec::new();
    }

    classes
        .par_iter()
        .flat_map_iter(|class| match scan_class_isolated(provider, class, needle) {
            Ok(hits) => hits,
            Err(err) => {
                error!(class = %class.full_name, error = %err, "failed to search in class");
                Vec::new()
            }
        })
        .collect()
}

fn scan_class_isolated(
    provider: &dyn ProgramProvider,
    class: &ClassSymbol,
    needle: &str,
) -> CoreResult<Vec<String>> {
    catch_unwind(AssertUnwindSafe(|| scan_class(provider, class, needle))).unwrap_or_else(
        |payload| Err(CoreError::per_class(&class.full_name, panic_reason(payload.as_ref()))),
    )
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("provider panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("provider panicked: {msg}")
    } else {
        "provider panicked".to_string()
    }
}

fn scan_class(
    provider: &dyn ProgramProvider,
    class: &ClassSymbol,
    needle: &str,
) -> CoreResult<Vec<String>> {
    let code = provider.class_source(class)?;
    if !code.contains(needle) {
        return Ok(Vec::new());
    }

    let mut hits = Vec::new();
    for method in &class.methods {
        if let Some(body) = provider.method_source(method)? {
            if body.contains(needle) {
                hits.push(method.render_signature());
            }
        }
    }
    Ok(hits)
}
