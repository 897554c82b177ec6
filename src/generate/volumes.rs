// src/generate/volumes.rs

//! Volume materialization for one container
//!
//! Turns a container's volume mounts into compose bind-mount strings and
//! writes the referenced content under `<session-root>/volumes/<name>/`.
//! Each supported volume source type has its own fetch-and-write path;
//! unsupported types are skipped with a diagnostic and register no compose
//! volume entry. A mount naming a volume the pod never declares is a hard
//! error.

use crate::compose::Volume;
use crate::error::{Error, Result};
use crate::k8s::{ContainerSpec, PodSnapshot, ProjectedSource, ResourceProvider, VolumeSource};
use crate::modifiers::Modifier;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Placeholder written instead of a real service-account token. This tool
/// never issues or copies cluster credentials.
const SERVICE_ACCOUNT_TOKEN_STAND_IN: &str = "fake-token-content-for-testing";

/// Bind-mount strings plus compose volume entries for one container.
#[derive(Debug)]
pub struct MaterializedVolumes {
    pub bind_mounts: Vec<String>,
    pub volumes: BTreeMap<String, Volume>,
}

/// Materialize every mount of `container`, in declared order.
pub fn materialize<P: ResourceProvider>(
    provider: &P,
    container: &ContainerSpec,
    pod: &PodSnapshot,
    session_root: &Path,
    modifiers: &mut [Box<dyn Modifier>],
) -> Result<MaterializedVolumes> {
    let volumes_base = session_root.join("volumes");
    let mut bind_mounts = Vec::with_capacity(container.mounts.len());
    let mut volumes = BTreeMap::new();

    for mount in &container.mounts {
        let device = volumes_base.join(&mount.volume);
        let mut bind = format!("{}:{}", device.display(), mount.mount_path);
        if mount.read_only {
            bind.push_str(":ro");
        }
        bind_mounts.push(bind);

        let volume = pod
            .volume_by_name(&mount.volume)
            .ok_or_else(|| Error::VolumeNotFound {
                volume: mount.volume.clone(),
            })?;

        match &volume.source {
            VolumeSource::ConfigMap(name) => {
                write_config_map(provider, &pod.namespace, name, &device, modifiers)?;
            }
            VolumeSource::Secret(name) => {
                write_secret(provider, &pod.namespace, name, &device)?;
            }
            VolumeSource::Projected(sources) => {
                for source in sources {
                    match source {
                        ProjectedSource::ConfigMap(name) => {
                            write_config_map(provider, &pod.namespace, name, &device, modifiers)?;
                        }
                        ProjectedSource::Secret(name) => {
                            write_secret(provider, &pod.namespace, name, &device)?;
                        }
                        ProjectedSource::DownwardApi => {
                            info!(
                                volume = %volume.name,
                                "downward API projection is not materialized, skipping"
                            );
                        }
                        ProjectedSource::ServiceAccountToken => {
                            write_file(
                                &device.join("service-account-token"),
                                SERVICE_ACCOUNT_TOKEN_STAND_IN.as_bytes(),
                            )?;
                        }
                        ProjectedSource::Other => {
                            info!(
                                volume = %volume.name,
                                "unknown projected sub-source, skipping"
                            );
                        }
                    }
                }
            }
            VolumeSource::EmptyDir => {
                fs::create_dir_all(&device)?;
                debug!(path = %device.display(), "created empty directory volume");
            }
            VolumeSource::Other => {
                // No compose volume entry for sources we cannot reproduce.
                info!(volume = %volume.name, "unsupported volume source type, skipping");
                continue;
            }
        }

        volumes.insert(
            mount.volume.clone(),
            Volume::local_bind(device.display().to_string()),
        );
    }

    Ok(MaterializedVolumes {
        bind_mounts,
        volumes,
    })
}

/// Write every key of a config map as a file, scanning each value through
/// the modifier pipeline first. Content is written unmodified; the pipeline
/// only flags.
fn write_config_map<P: ResourceProvider>(
    provider: &P,
    namespace: &str,
    name: &str,
    dir: &Path,
    modifiers: &mut [Box<dyn Modifier>],
) -> Result<()> {
    let data = provider.get_config_map(namespace, name)?;
    for (key, value) in &data {
        for modifier in modifiers.iter_mut() {
            modifier.detect(value)?;
        }
        let path = dir.join(key);
        write_file(&path, value.as_bytes())?;
        debug!(config_map = name, path = %path.display(), "materialized config map key");
    }
    Ok(())
}

/// Write every key of a secret as a file, byte for byte. Secret content is
/// deliberately not fed to the modifier pipeline.
fn write_secret<P: ResourceProvider>(
    provider: &P,
    namespace: &str,
    name: &str,
    dir: &Path,
) -> Result<()> {
    let data = provider.get_secret(namespace, name)?;
    for (key, value) in &data {
        let path = dir.join(key);
        write_file(&path, value)?;
        debug!(secret = name, path = %path.display(), "materialized secret key");
    }
    Ok(())
}

/// Write a file, creating parent directories as needed.
pub(crate) fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
