// src/generate/env.rs

//! Environment resolution for one container
//!
//! Flattens a container's declared environment entries into a name→value
//! map, resolving field references against the pod snapshot and key
//! references against the cluster. Entries are processed in declaration
//! order; a later duplicate name overwrites an earlier one.

use crate::error::{Error, Result};
use crate::k8s::{ContainerSpec, EnvValue, PodSnapshot, ResourceProvider};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Resolve a container's environment declarations into a flat mapping.
///
/// Unsatisfiable secret/config-map key references are hard errors carrying
/// the variable name. Entries with neither a value nor a source are
/// dropped.
pub fn resolve<P: ResourceProvider>(
    provider: &P,
    container: &ContainerSpec,
    pod: &PodSnapshot,
    namespace: &str,
) -> Result<BTreeMap<String, String>> {
    let mut env = BTreeMap::new();

    for var in &container.env {
        match &var.value {
            EnvValue::Literal(value) => {
                env.insert(var.name.clone(), value.clone());
            }
            EnvValue::FieldRef(field_path) => {
                let value = field_ref_value(pod, field_path, &var.name)?;
                env.insert(var.name.clone(), value);
            }
            EnvValue::SecretKeyRef { name, key } => {
                let data = provider
                    .get_secret(namespace, name)
                    .map_err(|e| reference_error(&var.name, e))?;
                let value = data.get(key).ok_or_else(|| Error::ReferenceResolution {
                    variable: var.name.clone(),
                    reason: format!("key '{}' not found in secret '{}'", key, name),
                })?;
                // Environment values must be text; flag secrets that are not.
                if std::str::from_utf8(value).is_err() {
                    warn!(
                        variable = %var.name,
                        secret = %name,
                        "secret value is not valid UTF-8, replacing invalid bytes"
                    );
                }
                env.insert(var.name.clone(), String::from_utf8_lossy(value).into_owned());
            }
            EnvValue::ConfigMapKeyRef { name, key } => {
                let data = provider
                    .get_config_map(namespace, name)
                    .map_err(|e| reference_error(&var.name, e))?;
                let value = data.get(key).ok_or_else(|| Error::ReferenceResolution {
                    variable: var.name.clone(),
                    reason: format!("key '{}' not found in config map '{}'", key, name),
                })?;
                env.insert(var.name.clone(), value.clone());
            }
            EnvValue::Unset => {
                // Declared with neither a value nor a source; dropped.
                debug!(variable = %var.name, "environment entry has no value or source, skipping");
            }
        }
    }

    Ok(env)
}

/// Resolve a downward-API field path against the pod snapshot.
///
/// Static metadata is always available. Runtime fields (IPs, node name)
/// can legitimately be empty on a pending pod; referencing them then is a
/// hard error because the container demonstrably depends on the value.
/// Paths outside the table resolve to an empty string with a diagnostic.
fn field_ref_value(pod: &PodSnapshot, field_path: &str, variable: &str) -> Result<String> {
    match field_path {
        "metadata.name" => Ok(pod.name.clone()),
        "metadata.namespace" => Ok(pod.namespace.clone()),
        "metadata.uid" => Ok(pod.uid.clone()),
        "spec.serviceAccountName" => Ok(pod.service_account_name.clone().unwrap_or_default()),
        "status.hostIP" => require_runtime_field(&pod.host_ip, field_path, variable),
        "status.podIP" => require_runtime_field(&pod.pod_ip, field_path, variable),
        "spec.nodeName" => require_runtime_field(&pod.node_name, field_path, variable),
        other => {
            info!(field_path = other, "unsupported field path, resolving to empty string");
            Ok(String::new())
        }
    }
}

fn require_runtime_field(
    value: &Option<String>,
    field_path: &str,
    variable: &str,
) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(Error::ReferenceResolution {
            variable: variable.to_string(),
            reason: format!("field path '{}' is not available on this pod", field_path),
        }),
    }
}

fn reference_error(variable: &str, source: Error) -> Error {
    Error::ReferenceResolution {
        variable: variable.to_string(),
        reason: source.to_string(),
    }
}
