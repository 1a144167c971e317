//! Compiled artifact lookup.
//!
//! Network clients need a unit's creation bytecode (and callers sometimes
//! its ABI) to submit a deployment. An [`ArtifactStore`] supplies both by
//! unit name. The orchestration executor never consults the store; it is a
//! pass-through dependency of the client.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A compiled contract artifact: creation bytecode plus ABI.
///
/// Matches the relevant subset of a standard compiler build artifact
/// (`build/contracts/<Name>.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// Contract name as compiled.
    pub contract_name: String,
    /// Creation bytecode as `0x`-prefixed hex.
    pub bytecode: String,
    /// ABI description.
    pub abi: serde_json::Value,
}

impl ContractArtifact {
    /// Decodes the creation bytecode to raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] if the bytecode field is not hex.
    pub fn bytecode_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let stripped = self.bytecode.strip_prefix("0x").unwrap_or(&self.bytecode);
        hex::decode(stripped).map_err(|e| ArtifactError::Invalid {
            unit: self.contract_name.clone(),
            message: format!("bytecode is not hex: {e}"),
        })
    }
}

/// Errors from artifact lookup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// No artifact exists for the unit.
    #[error("artifact not found for '{unit}' at {path}")]
    NotFound {
        /// The unit name requested.
        unit: String,
        /// Where the store looked.
        path: PathBuf,
    },

    /// The artifact exists but could not be used.
    #[error("invalid artifact for '{unit}': {message}")]
    Invalid {
        /// The unit name requested.
        unit: String,
        /// Description of the problem.
        message: String,
    },

    /// Reading the artifact failed.
    #[error("failed to read artifact for '{unit}'")]
    Io {
        /// The unit name requested.
        unit: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Trait for artifact lookup by unit name.
pub trait ArtifactStore: Send + Sync {
    /// Loads the artifact for a unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is missing or unreadable.
    fn load(&self, unit: &str) -> Result<ContractArtifact, ArtifactError>;
}

/// Artifact store over a directory of `<Unit>.json` build files.
#[derive(Debug, Clone)]
pub struct DirArtifacts {
    dir: PathBuf,
}

impl DirArtifacts {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory this store reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactStore for DirArtifacts {
    fn load(&self, unit: &str) -> Result<ContractArtifact, ArtifactError> {
        let path = self.dir.join(format!("{unit}.json"));
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArtifactError::NotFound {
                    unit: unit.into(),
                    path,
                });
            }
            Err(e) => {
                return Err(ArtifactError::Io {
                    unit: unit.into(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|e| ArtifactError::Invalid {
            unit: unit.into(),
            message: format!("malformed artifact JSON: {e}"),
        })
    }
}

/// In-memory artifact store for tests.
#[derive(Debug, Default)]
pub struct MemoryArtifacts {
    artifacts: HashMap<String, ContractArtifact>,
}

impl MemoryArtifacts {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artifact under the given unit name.
    #[must_use]
    pub fn with_artifact(mut self, unit: impl Into<String>, artifact: ContractArtifact) -> Self {
        self.artifacts.insert(unit.into(), artifact);
        self
    }
}

impl ArtifactStore for MemoryArtifacts {
    fn load(&self, unit: &str) -> Result<ContractArtifact, ArtifactError> {
        self.artifacts
            .get(unit)
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound {
                unit: unit.into(),
                path: PathBuf::from("<memory>"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContractArtifact {
        ContractArtifact {
            contract_name: "RoleController".into(),
            bytecode: "0x6080604052".into(),
            abi: serde_json::json!([]),
        }
    }

    #[test]
    fn bytecode_decodes_to_bytes() {
        let bytes = sample().bytecode_bytes().unwrap();
        assert_eq!(bytes, vec![0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn non_hex_bytecode_is_invalid() {
        let artifact = ContractArtifact {
            bytecode: "0xnothex".into(),
            ..sample()
        };
        assert!(matches!(
            artifact.bytecode_bytes(),
            Err(ArtifactError::Invalid { .. })
        ));
    }

    #[test]
    fn dir_store_loads_build_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("RoleController.json");
        std::fs::write(&path, serde_json::to_string(&sample()).unwrap()).unwrap();

        let store = DirArtifacts::new(dir.path());
        let artifact = store.load("RoleController").unwrap();
        assert_eq!(artifact, sample());
    }

    #[test]
    fn dir_store_reports_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirArtifacts::new(dir.path());
        match store.load("Ghost") {
            Err(ArtifactError::NotFound { unit, path }) => {
                assert_eq!(unit, "Ghost");
                assert!(path.ends_with("Ghost.json"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn dir_store_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Broken.json"), "{not json").unwrap();

        let store = DirArtifacts::new(dir.path());
        assert!(matches!(
            store.load("Broken"),
            Err(ArtifactError::Invalid { .. })
        ));
    }

    #[test]
    fn memory_store_serves_registered_artifacts() {
        let store = MemoryArtifacts::new().with_artifact("RoleController", sample());
        assert!(store.load("RoleController").is_ok());
        assert!(matches!(
            store.load("Ghost"),
            Err(ArtifactError::NotFound { .. })
        ));
    }

    #[test]
    fn artifact_serde_ignores_extra_build_fields() {
        let json = r#"{
            "contractName": "RoleController",
            "abi": [],
            "bytecode": "0x6080604052",
            "deployedBytecode": "0x6080",
            "compiler": {"name": "solc", "version": "0.5.17"}
        }"#;
        let artifact: ContractArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.contract_name, "RoleController");
    }
}
