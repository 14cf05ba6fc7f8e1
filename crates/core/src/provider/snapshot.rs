use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::model::{ClassSymbol, MethodSymbol, ProgramGraph};
use crate::provider::ProgramProvider;

/// On-disk shape of one exported program model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassSymbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    fn for_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(SnapshotFormat::Json),
            Some("yaml") | Some("yml") => Some(SnapshotFormat::Yaml),
            _ => None,
        }
    }
}

/// Loads program models that a decompiler exported as JSON or YAML.
///
/// Source text comes from the `source` fields captured in the export; a class
/// exported without source fails reconstruction on its own.
pub struct SnapshotProvider;

impl ProgramProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn accepts(&self, path: &Path) -> bool {
        SnapshotFormat::for_path(path).is_some()
    }

    fn load(&self, inputs: &[PathBuf]) -> CoreResult<ProgramGraph> {
        let mut hasher = Sha256::new();
        let mut classes = Vec::new();
        let mut manifest = None;

        for input in inputs {
            let format = SnapshotFormat::for_path(input).ok_or_else(|| {
                CoreError::source_path(input, "unsupported snapshot extension")
            })?;
            let body = fs::read(input)
                .map_err(|e| CoreError::source_path(input, format!("failed to read: {e}")))?;
            hasher.update(&body);

            let snapshot = parse_snapshot(&body, format).map_err(|reason| {
                CoreError::Provider(format!("failed to parse {}: {reason}", input.display()))
            })?;
            debug!(input = %input.display(), classes = snapshot.classes.len(), "read snapshot");

            classes.extend(snapshot.classes);
            if manifest.is_none() {
                manifest = snapshot.manifest;
            }
        }

        let mut graph = ProgramGraph::new(classes, manifest);
        graph.inputs = inputs.to_vec();
        graph.fingerprint = Some(format!("{:x}", hasher.finalize()));
        graph.loaded_at = Some(Utc::now().to_rfc3339());
        info!(inputs = inputs.len(), classes = graph.class_count(), "loaded program snapshot");
        Ok(graph)
    }

    fn class_source(&self, class: &ClassSymbol) -> CoreResult<String> {
        class
            .source
            .clone()
            .ok_or_else(|| CoreError::per_class(&class.full_name, "no reconstructed source"))
    }

    fn method_source(&self, method: &MethodSymbol) -> CoreResult<Option<String>> {
        Ok(method.source.clone())
    }
}

fn parse_snapshot(body: &[u8], format: SnapshotFormat) -> Result<ProgramSnapshot, String> {
    match format {
        SnapshotFormat::Json => serde_json::from_slice(body).map_err(|e| e.to_string()),
        SnapshotFormat::Yaml => serde_yaml::from_slice(body).map_err(|e| e.to_string()),
    }
}
