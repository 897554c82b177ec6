// tests/common/mod.rs

//! Shared fixtures: an in-memory resource provider and pod builders.

use replikate::k8s::{
    ContainerSpec, EnvValue, EnvVarSpec, NamedVolume, PodSnapshot, ResourceProvider, VolumeMount,
    VolumeSource,
};
use replikate::{Error, Result};
use std::collections::BTreeMap;

/// Resource provider serving objects from in-memory maps.
#[derive(Default)]
pub struct FixtureProvider {
    pub pods: BTreeMap<(String, String), PodSnapshot>,
    pub secrets: BTreeMap<(String, String), BTreeMap<String, Vec<u8>>>,
    pub config_maps: BTreeMap<(String, String), BTreeMap<String, String>>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pod(mut self, pod: PodSnapshot) -> Self {
        self.pods
            .insert((pod.namespace.clone(), pod.name.clone()), pod);
        self
    }

    pub fn with_config_map(
        mut self,
        namespace: &str,
        name: &str,
        data: &[(&str, &str)],
    ) -> Self {
        self.config_maps.insert(
            (namespace.to_string(), name.to_string()),
            data.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_secret(mut self, namespace: &str, name: &str, data: &[(&str, &[u8])]) -> Self {
        self.secrets.insert(
            (namespace.to_string(), name.to_string()),
            data.iter()
                .map(|(k, v)| (k.to_string(), v.to_vec()))
                .collect(),
        );
        self
    }
}

impl ResourceProvider for FixtureProvider {
    fn get_pod(&self, namespace: &str, name: &str) -> Result<PodSnapshot> {
        self.pods
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::PodNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::SecretNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    fn get_config_map(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, String>> {
        self.config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::ConfigMapNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}

/// A pod snapshot with sensible metadata and no containers or volumes.
pub fn pod(namespace: &str, name: &str) -> PodSnapshot {
    PodSnapshot {
        name: name.to_string(),
        namespace: namespace.to_string(),
        uid: format!("{}-{}-uid", namespace, name),
        node_name: Some("node-a".to_string()),
        host_ip: Some("10.0.0.1".to_string()),
        pod_ip: Some("172.16.0.4".to_string()),
        service_account_name: Some("default".to_string()),
        init_containers: vec![],
        containers: vec![],
        volumes: vec![],
    }
}

pub fn container(name: &str, image: &str) -> ContainerSpec {
    ContainerSpec {
        name: name.to_string(),
        image: image.to_string(),
        command: vec![],
        env: vec![],
        mounts: vec![],
    }
}

pub fn mount(volume: &str, mount_path: &str, read_only: bool) -> VolumeMount {
    VolumeMount {
        volume: volume.to_string(),
        mount_path: mount_path.to_string(),
        read_only,
    }
}

pub fn named_volume(name: &str, source: VolumeSource) -> NamedVolume {
    NamedVolume {
        name: name.to_string(),
        source,
    }
}

pub fn env_var(name: &str, value: EnvValue) -> EnvVarSpec {
    EnvVarSpec {
        name: name.to_string(),
        value,
    }
}
