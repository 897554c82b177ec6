// src/compose/mod.rs

//! Compose document model and serialization
//!
//! The in-memory representation of the generated `docker-compose.yml`.
//! Services and volumes are keyed by the originating cluster object name,
//! and `BTreeMap` keeps the serialized output deterministic: regenerating
//! the same pod yields an identical document modulo the session root.

use serde::Serialize;
use std::collections::BTreeMap;

/// Compose schema version emitted in every generated document.
pub const COMPOSE_FILE_VERSION: &str = "3.8";

/// One full compose document: schema version, services, named volumes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComposeDocument {
    pub version: String,
    pub services: BTreeMap<String, Service>,
    pub volumes: BTreeMap<String, Volume>,
}

impl ComposeDocument {
    pub fn new() -> Self {
        Self {
            version: COMPOSE_FILE_VERSION.to_string(),
            services: BTreeMap::new(),
            volumes: BTreeMap::new(),
        }
    }

    /// Serialize to the YAML text written as `docker-compose.yml`.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// One service entry, derived from one container.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Service {
    pub image: String,
    /// Bind-mount strings, `<device>:<mount-path>[:ro]`
    pub volumes: Vec<String>,
    pub environment: BTreeMap<String, String>,
    /// Fixed to "host": preserves the pod's flat-network visibility between
    /// co-located containers without reimplementing pod networking
    pub network_mode: String,
    pub depends_on: Vec<String>,
    pub command: Vec<String>,
}

/// One named volume entry backed by a local bind mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Volume {
    pub driver: String,
    pub driver_opts: DriverOpts,
}

impl Volume {
    /// Local bind-mount volume whose device is a directory under the
    /// session root.
    pub fn local_bind(device: String) -> Self {
        Self {
            driver: "local".to_string(),
            driver_opts: DriverOpts {
                kind: "none".to_string(),
                options: "bind".to_string(),
                device,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverOpts {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "o")]
    pub options: String,
    pub device: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_expected_compose_layout() {
        let mut doc = ComposeDocument::new();
        doc.services.insert(
            "app".to_string(),
            Service {
                image: "app:2".to_string(),
                volumes: vec!["/tmp/x/volumes/cfg:/etc/app".to_string()],
                environment: BTreeMap::from([("MODE".to_string(), "prod".to_string())]),
                network_mode: "host".to_string(),
                depends_on: vec!["migrate".to_string()],
                command: vec!["/bin/app".to_string()],
            },
        );
        doc.volumes.insert(
            "cfg".to_string(),
            Volume::local_bind("/tmp/x/volumes/cfg".to_string()),
        );

        let yaml = doc.to_yaml().unwrap();
        assert!(yaml.contains("version: '3.8'"));
        assert!(yaml.contains("network_mode: host"));
        assert!(yaml.contains("depends_on:\n    - migrate"));
        assert!(yaml.contains("driver: local"));
        assert!(yaml.contains("type: none"));
        assert!(yaml.contains("o: bind"));
        assert!(yaml.contains("device: /tmp/x/volumes/cfg"));
    }

    #[test]
    fn empty_document_still_carries_version() {
        let doc = ComposeDocument::new();
        let yaml = doc.to_yaml().unwrap();
        assert!(yaml.contains("3.8"));
        assert!(yaml.contains("services: {}"));
        assert!(yaml.contains("volumes: {}"));
    }
}
