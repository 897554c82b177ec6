// src/k8s/mod.rs

//! Pod specification snapshot model
//!
//! A `PodSnapshot` is the immutable view of one running pod that a
//! generation run works from: metadata, init and regular containers,
//! and the pod's named volume sources. It is fetched exactly once per
//! run through a [`ResourceProvider`](provider::ResourceProvider) and
//! never mutated.
//!
//! Volume sources and environment indirections are sum types rather than
//! bundles of mutually exclusive optional fields, so a new upstream volume
//! type shows up as a non-exhaustive match instead of a silently ignored
//! branch.

pub mod provider;

pub use provider::{KubectlProvider, ResourceProvider};

/// Immutable snapshot of one pod, fetched once per generation run.
#[derive(Debug, Clone)]
pub struct PodSnapshot {
    pub name: String,
    pub namespace: String,
    pub uid: String,
    pub node_name: Option<String>,
    pub host_ip: Option<String>,
    pub pod_ip: Option<String>,
    pub service_account_name: Option<String>,
    /// Containers that must complete before any regular container starts
    pub init_containers: Vec<ContainerSpec>,
    pub containers: Vec<ContainerSpec>,
    pub volumes: Vec<NamedVolume>,
}

impl PodSnapshot {
    /// Look up a declared volume source by name.
    pub fn volume_by_name(&self, name: &str) -> Option<&NamedVolume> {
        self.volumes.iter().find(|v| v.name == name)
    }
}

/// One container's spec: image, start command, env declarations, mounts.
#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub env: Vec<EnvVarSpec>,
    pub mounts: Vec<VolumeMount>,
}

/// A named volume source declared at the pod level.
#[derive(Debug, Clone)]
pub struct NamedVolume {
    pub name: String,
    pub source: VolumeSource,
}

/// The content backing a named volume.
///
/// Exactly one variant per volume; shapes this tool does not understand
/// collapse into `Other` and are skipped with a diagnostic rather than
/// failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    /// Scratch directory with no initial content
    EmptyDir,
    /// All keys of the named config map become files
    ConfigMap(String),
    /// All keys of the named secret become files
    Secret(String),
    /// Content assembled from an ordered list of sub-sources
    Projected(Vec<ProjectedSource>),
    /// Anything else (hostPath, PVC, CSI, ...): unsupported
    Other,
}

/// One sub-source of a projected volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectedSource {
    ConfigMap(String),
    Secret(String),
    /// Pod metadata projection; not materialized (logged and skipped)
    DownwardApi,
    /// Materialized as a fixed placeholder file, never a real credential
    ServiceAccountToken,
    Other,
}

/// One volume mount declared by a container.
#[derive(Debug, Clone)]
pub struct VolumeMount {
    /// Name of the pod-level volume this mount refers to
    pub volume: String,
    pub mount_path: String,
    pub read_only: bool,
}

/// One declared environment variable.
#[derive(Debug, Clone)]
pub struct EnvVarSpec {
    pub name: String,
    pub value: EnvValue,
}

/// Where an environment variable's value comes from.
///
/// Literal values and indirections are mutually exclusive by construction.
/// `Unset` covers pod specs that declare a name with neither a value nor
/// a source; such entries are dropped during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    /// Resolved against a fixed table of pod metadata field paths
    FieldRef(String),
    SecretKeyRef { name: String, key: String },
    ConfigMapKeyRef { name: String, key: String },
    Unset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_lookup_finds_declared_name() {
        let pod = PodSnapshot {
            name: "p".into(),
            namespace: "ns".into(),
            uid: "u".into(),
            node_name: None,
            host_ip: None,
            pod_ip: None,
            service_account_name: None,
            init_containers: vec![],
            containers: vec![],
            volumes: vec![NamedVolume {
                name: "cfg".into(),
                source: VolumeSource::ConfigMap("app-config".into()),
            }],
        };
        assert!(pod.volume_by_name("cfg").is_some());
        assert!(pod.volume_by_name("missing").is_none());
    }
}
