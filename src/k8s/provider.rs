// src/k8s/provider.rs

//! Cluster resource access
//!
//! The generation engine only ever talks to the cluster through the
//! [`ResourceProvider`] trait: fetch one pod, one secret, one config map.
//! The default implementation shells out to `kubectl ... -o json` and
//! parses the returned object, which keeps the engine synchronous and
//! avoids dragging a full API client into a tool that performs three
//! kinds of point reads.

use crate::error::{Error, Result};
use crate::k8s::{
    ContainerSpec, EnvValue, EnvVarSpec, NamedVolume, PodSnapshot, ProjectedSource, VolumeMount,
    VolumeSource,
};
use base64::Engine as _;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Read access to the cluster objects one generation run needs.
pub trait ResourceProvider {
    /// Fetch a pod's live specification.
    fn get_pod(&self, namespace: &str, name: &str) -> Result<PodSnapshot>;

    /// Fetch a secret's key/value data (raw bytes).
    fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>>;

    /// Fetch a config map's key/value data (strings).
    fn get_config_map(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, String>>;
}

/// Provider backed by the `kubectl` binary on PATH.
#[derive(Debug, Clone, Default)]
pub struct KubectlProvider {
    /// Explicit kubeconfig file, or kubectl's own default resolution
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context override
    pub context: Option<String>,
}

impl KubectlProvider {
    pub fn new(kubeconfig: Option<PathBuf>, context: Option<String>) -> Self {
        Self {
            kubeconfig,
            context,
        }
    }

    /// Run `kubectl get <kind> <name> -n <namespace> -o json` and return stdout.
    ///
    /// A not-found object is reported by kubectl with a non-zero exit and a
    /// "NotFound" message on stderr; that case maps to `not_found`, anything
    /// else to a provider error.
    fn get_json(
        &self,
        kind: &str,
        namespace: &str,
        name: &str,
        not_found: impl FnOnce() -> Error,
    ) -> Result<Vec<u8>> {
        let mut cmd = Command::new("kubectl");
        cmd.args(["get", kind, name, "-n", namespace, "-o", "json"]);
        if let Some(kubeconfig) = &self.kubeconfig {
            cmd.arg("--kubeconfig").arg(kubeconfig);
        }
        if let Some(context) = &self.context {
            cmd.args(["--context", context]);
        }

        debug!(kind, namespace, name, "fetching cluster object via kubectl");
        let output = cmd.output().map_err(|e| Error::Provider {
            reason: format!("failed to spawn kubectl: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("NotFound") {
                return Err(not_found());
            }
            return Err(Error::Provider {
                reason: format!(
                    "kubectl get {} {}/{} failed: {}",
                    kind,
                    namespace,
                    name,
                    stderr.trim()
                ),
            });
        }

        Ok(output.stdout)
    }
}

impl ResourceProvider for KubectlProvider {
    fn get_pod(&self, namespace: &str, name: &str) -> Result<PodSnapshot> {
        let raw = self.get_json("pod", namespace, name, || Error::PodNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;
        let pod: RawPod = serde_json::from_slice(&raw).map_err(|e| Error::Provider {
            reason: format!("failed to parse pod object: {}", e),
        })?;
        Ok(pod.into_snapshot())
    }

    fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let raw = self.get_json("secret", namespace, name, || Error::SecretNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;
        let secret: RawKeyedObject = serde_json::from_slice(&raw).map_err(|e| Error::Provider {
            reason: format!("failed to parse secret object: {}", e),
        })?;

        // Secret payloads arrive base64-encoded in the `data` field.
        let mut decoded = BTreeMap::new();
        for (key, value) in secret.data {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(value.as_bytes())
                .map_err(|e| Error::Provider {
                    reason: format!("invalid base64 in secret '{}' key '{}': {}", name, key, e),
                })?;
            decoded.insert(key, bytes);
        }
        Ok(decoded)
    }

    fn get_config_map(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, String>> {
        let raw = self.get_json("configmap", namespace, name, || Error::ConfigMapNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;
        let cm: RawKeyedObject = serde_json::from_slice(&raw).map_err(|e| Error::Provider {
            reason: format!("failed to parse config map object: {}", e),
        })?;
        Ok(cm.data)
    }
}

// Wire representation of the cluster API objects. Only the fields the
// snapshot model needs are declared; everything else is ignored.

#[derive(Debug, Deserialize)]
struct RawPod {
    metadata: RawMetadata,
    spec: RawPodSpec,
    #[serde(default)]
    status: RawPodStatus,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    name: String,
    namespace: String,
    #[serde(default)]
    uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPodSpec {
    #[serde(default)]
    init_containers: Vec<RawContainer>,
    #[serde(default)]
    containers: Vec<RawContainer>,
    #[serde(default)]
    volumes: Vec<RawVolume>,
    #[serde(default)]
    service_account_name: Option<String>,
    #[serde(default)]
    node_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPodStatus {
    #[serde(default, rename = "hostIP")]
    host_ip: Option<String>,
    #[serde(default, rename = "podIP")]
    pod_ip: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContainer {
    name: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    command: Vec<String>,
    #[serde(default)]
    env: Vec<RawEnvVar>,
    #[serde(default)]
    volume_mounts: Vec<RawVolumeMount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvVar {
    name: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    value_from: Option<RawEnvVarSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvVarSource {
    #[serde(default)]
    field_ref: Option<RawFieldRef>,
    #[serde(default)]
    secret_key_ref: Option<RawKeySelector>,
    #[serde(default)]
    config_map_key_ref: Option<RawKeySelector>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldRef {
    field_path: String,
}

#[derive(Debug, Deserialize)]
struct RawKeySelector {
    name: String,
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVolumeMount {
    name: String,
    mount_path: String,
    #[serde(default)]
    read_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVolume {
    name: String,
    #[serde(default)]
    config_map: Option<RawNamedRef>,
    #[serde(default)]
    secret: Option<RawSecretVolume>,
    #[serde(default)]
    empty_dir: Option<serde_json::Value>,
    #[serde(default)]
    projected: Option<RawProjected>,
}

#[derive(Debug, Deserialize)]
struct RawNamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSecretVolume {
    secret_name: String,
}

#[derive(Debug, Deserialize)]
struct RawProjected {
    #[serde(default)]
    sources: Vec<RawProjectedSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProjectedSource {
    #[serde(default)]
    config_map: Option<RawNamedRef>,
    #[serde(default)]
    secret: Option<RawNamedRef>,
    #[serde(default, rename = "downwardAPI")]
    downward_api: Option<serde_json::Value>,
    #[serde(default)]
    service_account_token: Option<serde_json::Value>,
}

impl RawPod {
    fn into_snapshot(self) -> PodSnapshot {
        PodSnapshot {
            name: self.metadata.name,
            namespace: self.metadata.namespace,
            uid: self.metadata.uid,
            node_name: self.spec.node_name,
            host_ip: self.status.host_ip,
            pod_ip: self.status.pod_ip,
            service_account_name: self.spec.service_account_name,
            init_containers: self
                .spec
                .init_containers
                .into_iter()
                .map(RawContainer::into_spec)
                .collect(),
            containers: self
                .spec
                .containers
                .into_iter()
                .map(RawContainer::into_spec)
                .collect(),
            volumes: self.spec.volumes.into_iter().map(RawVolume::into_named).collect(),
        }
    }
}

impl RawContainer {
    fn into_spec(self) -> ContainerSpec {
        ContainerSpec {
            name: self.name,
            image: self.image,
            command: self.command,
            env: self.env.into_iter().map(RawEnvVar::into_spec).collect(),
            mounts: self
                .volume_mounts
                .into_iter()
                .map(|m| VolumeMount {
                    volume: m.name,
                    mount_path: m.mount_path,
                    read_only: m.read_only,
                })
                .collect(),
        }
    }
}

impl RawEnvVar {
    fn into_spec(self) -> EnvVarSpec {
        let value = match (self.value, self.value_from) {
            (Some(v), _) if !v.is_empty() => EnvValue::Literal(v),
            (_, Some(source)) => {
                if let Some(field_ref) = source.field_ref {
                    EnvValue::FieldRef(field_ref.field_path)
                } else if let Some(sel) = source.secret_key_ref {
                    EnvValue::SecretKeyRef {
                        name: sel.name,
                        key: sel.key,
                    }
                } else if let Some(sel) = source.config_map_key_ref {
                    EnvValue::ConfigMapKeyRef {
                        name: sel.name,
                        key: sel.key,
                    }
                } else {
                    EnvValue::Unset
                }
            }
            _ => EnvValue::Unset,
        };
        EnvVarSpec {
            name: self.name,
            value,
        }
    }
}

impl RawVolume {
    fn into_named(self) -> NamedVolume {
        let source = if let Some(cm) = self.config_map {
            VolumeSource::ConfigMap(cm.name)
        } else if let Some(secret) = self.secret {
            VolumeSource::Secret(secret.secret_name)
        } else if let Some(projected) = self.projected {
            VolumeSource::Projected(
                projected
                    .sources
                    .into_iter()
                    .map(RawProjectedSource::into_source)
                    .collect(),
            )
        } else if self.empty_dir.is_some() {
            VolumeSource::EmptyDir
        } else {
            VolumeSource::Other
        };
        NamedVolume {
            name: self.name,
            source,
        }
    }
}

impl RawProjectedSource {
    fn into_source(self) -> ProjectedSource {
        if let Some(cm) = self.config_map {
            ProjectedSource::ConfigMap(cm.name)
        } else if let Some(secret) = self.secret {
            ProjectedSource::Secret(secret.name)
        } else if self.downward_api.is_some() {
            ProjectedSource::DownwardApi
        } else if self.service_account_token.is_some() {
            ProjectedSource::ServiceAccountToken
        } else {
            ProjectedSource::Other
        }
    }
}

/// Secrets and config maps share the same `data` envelope on the wire.
#[derive(Debug, Deserialize)]
struct RawKeyedObject {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pod_object_into_snapshot() {
        let json = r#"{
            "metadata": {"name": "metering", "namespace": "ns1", "uid": "abc-123"},
            "spec": {
                "serviceAccountName": "default",
                "nodeName": "node-a",
                "initContainers": [{"name": "migrate", "image": "migrate:1"}],
                "containers": [{
                    "name": "app",
                    "image": "app:2",
                    "command": ["/bin/app", "serve"],
                    "env": [
                        {"name": "MODE", "value": "prod"},
                        {"name": "POD_NAME", "valueFrom": {"fieldRef": {"fieldPath": "metadata.name"}}},
                        {"name": "DB_PASS", "valueFrom": {"secretKeyRef": {"name": "db", "key": "pass"}}},
                        {"name": "GHOST"}
                    ],
                    "volumeMounts": [{"name": "cfg", "mountPath": "/etc/app", "readOnly": true}]
                }],
                "volumes": [
                    {"name": "cfg", "configMap": {"name": "app-config"}},
                    {"name": "scratch", "emptyDir": {}},
                    {"name": "creds", "secret": {"secretName": "db"}},
                    {"name": "token", "projected": {"sources": [
                        {"serviceAccountToken": {"path": "token"}},
                        {"downwardAPI": {"items": []}}
                    ]}},
                    {"name": "host", "hostPath": {"path": "/var/log"}}
                ]
            },
            "status": {"hostIP": "10.0.0.1", "podIP": "172.16.0.4"}
        }"#;

        let raw: RawPod = serde_json::from_str(json).unwrap();
        let pod = raw.into_snapshot();

        assert_eq!(pod.name, "metering");
        assert_eq!(pod.namespace, "ns1");
        assert_eq!(pod.uid, "abc-123");
        assert_eq!(pod.host_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(pod.init_containers.len(), 1);
        assert_eq!(pod.init_containers[0].name, "migrate");

        let app = &pod.containers[0];
        assert_eq!(app.command, vec!["/bin/app", "serve"]);
        assert_eq!(app.env[0].value, EnvValue::Literal("prod".into()));
        assert_eq!(app.env[1].value, EnvValue::FieldRef("metadata.name".into()));
        assert_eq!(
            app.env[2].value,
            EnvValue::SecretKeyRef {
                name: "db".into(),
                key: "pass".into()
            }
        );
        assert_eq!(app.env[3].value, EnvValue::Unset);
        assert!(app.mounts[0].read_only);

        assert_eq!(
            pod.volume_by_name("cfg").unwrap().source,
            VolumeSource::ConfigMap("app-config".into())
        );
        assert_eq!(pod.volume_by_name("scratch").unwrap().source, VolumeSource::EmptyDir);
        assert_eq!(
            pod.volume_by_name("creds").unwrap().source,
            VolumeSource::Secret("db".into())
        );
        assert_eq!(
            pod.volume_by_name("token").unwrap().source,
            VolumeSource::Projected(vec![
                ProjectedSource::ServiceAccountToken,
                ProjectedSource::DownwardApi
            ])
        );
        // hostPath is not something we reproduce locally
        assert_eq!(pod.volume_by_name("host").unwrap().source, VolumeSource::Other);
    }

    #[test]
    fn literal_wins_over_indirection() {
        let raw = RawEnvVar {
            name: "X".into(),
            value: Some("literal".into()),
            value_from: Some(RawEnvVarSource {
                field_ref: Some(RawFieldRef {
                    field_path: "metadata.name".into(),
                }),
                secret_key_ref: None,
                config_map_key_ref: None,
            }),
        };
        assert_eq!(raw.into_spec().value, EnvValue::Literal("literal".into()));
    }
}
