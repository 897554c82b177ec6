// src/generate/mod.rs

//! Generation engine
//!
//! Walks a pod's resolved specification and produces a locally runnable
//! reconstruction: a session directory holding every materialized volume
//! file plus a `docker-compose.yml` whose services mirror the pod's
//! containers. Init containers become services every regular service
//! depends on, which preserves "all inits before any regular container"
//! without modeling per-init ordering.
//!
//! One engine instance owns its resource provider and base output
//! directory explicitly; each `generate` call gets a fresh session root
//! keyed by a new UUID, so repeated or concurrent runs never collide on
//! disk.

pub mod env;
pub mod volumes;

use crate::compose::ComposeDocument;
use crate::error::Result;
use crate::k8s::{ContainerSpec, PodSnapshot, ResourceProvider};
use crate::modifiers::{default_pipeline, Modifier};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Default base directory for generated sessions.
pub const DEFAULT_OUTPUT_BASE: &str = "/tmp/replikate";

/// Drives one pod-to-compose generation run at a time.
pub struct Generator<P: ResourceProvider> {
    provider: P,
    base_dir: PathBuf,
}

/// Everything a caller needs after a successful run: where the compose
/// file landed and which modifiers flagged content along the way.
pub struct GenerationResponse {
    pub compose_path: PathBuf,
    pub modifiers: Vec<Box<dyn Modifier>>,
}

impl std::fmt::Debug for GenerationResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationResponse")
            .field("compose_path", &self.compose_path)
            .field(
                "modifiers",
                &self.modifiers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl GenerationResponse {
    /// The command a user runs to bring the reconstruction up.
    pub fn command(&self) -> String {
        format!("docker compose -f {} up", self.compose_path.display())
    }
}

/// State for a single generation run: a unique root directory and the
/// compose document being accumulated. Never reused across runs.
struct GenerationSession {
    root: PathBuf,
    document: ComposeDocument,
    modifiers: Vec<Box<dyn Modifier>>,
}

impl GenerationSession {
    fn new(base_dir: &Path) -> Self {
        let id = Uuid::new_v4();
        Self {
            root: base_dir.join(id.to_string()),
            document: ComposeDocument::new(),
            modifiers: default_pipeline(),
        }
    }
}

impl<P: ResourceProvider> Generator<P> {
    pub fn new(provider: P, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            base_dir: base_dir.into(),
        }
    }

    /// Generate the local reconstruction of `pod_name` in `namespace`.
    ///
    /// On failure the session directory may hold partial output; it is not
    /// cleaned up, so a failed run can be inspected.
    pub fn generate(&self, namespace: &str, pod_name: &str) -> Result<GenerationResponse> {
        debug!(namespace, pod = pod_name, "starting pod to compose generation");
        let pod = self.provider.get_pod(namespace, pod_name)?;
        let mut session = GenerationSession::new(&self.base_dir);

        // Init containers first: they carry no dependencies of their own
        // and every regular service will depend on all of them.
        let mut init_names = Vec::with_capacity(pod.init_containers.len());
        for container in &pod.init_containers {
            self.generate_container(&pod, container, &[], &mut session)
                .map_err(|e| e.for_container(&container.name))?;
            init_names.push(container.name.clone());
        }

        for container in &pod.containers {
            self.generate_container(&pod, container, &init_names, &mut session)
                .map_err(|e| e.for_container(&container.name))?;
        }

        let compose_path = session.root.join("docker-compose.yml");
        let yaml = session.document.to_yaml()?;
        volumes::write_file(&compose_path, yaml.as_bytes())?;

        info!(path = %compose_path.display(), "compose document generated");
        Ok(GenerationResponse {
            compose_path,
            modifiers: session.modifiers,
        })
    }

    /// Add one container's service entry (and its volume entries) to the
    /// session's compose document.
    fn generate_container(
        &self,
        pod: &PodSnapshot,
        container: &ContainerSpec,
        depends_on: &[String],
        session: &mut GenerationSession,
    ) -> Result<()> {
        let materialized = volumes::materialize(
            &self.provider,
            container,
            pod,
            &session.root,
            &mut session.modifiers,
        )?;
        let environment = env::resolve(&self.provider, container, pod, &pod.namespace)?;

        // Shared volume names may be inserted more than once; the entries
        // are identical because the device path is derived from the volume
        // name and session root alone.
        session.document.volumes.extend(materialized.volumes);

        session.document.services.insert(
            container.name.clone(),
            crate::compose::Service {
                image: container.image.clone(),
                volumes: materialized.bind_mounts,
                environment,
                network_mode: "host".to_string(),
                depends_on: depends_on.to_vec(),
                command: container.command.clone(),
            },
        );
        Ok(())
    }
}
