// src/error.rs

//! Error types for pod reconstruction
//!
//! Hard errors abort the generation run and carry the offending
//! container/volume/variable name so the caller can point at the culprit.
//! Soft conditions (unsupported volume types, unknown field paths) are
//! tracing events, not errors.

use thiserror::Error;

/// Errors that can occur while reconstructing a pod locally
#[derive(Debug, Error)]
pub enum Error {
    /// The requested pod does not exist in the cluster
    #[error("pod '{name}' not found in namespace '{namespace}'")]
    PodNotFound { namespace: String, name: String },

    /// A referenced secret does not exist in the cluster
    #[error("secret '{name}' not found in namespace '{namespace}'")]
    SecretNotFound { namespace: String, name: String },

    /// A referenced config map does not exist in the cluster
    #[error("config map '{name}' not found in namespace '{namespace}'")]
    ConfigMapNotFound { namespace: String, name: String },

    /// A volume mount references a volume name the pod never declares
    #[error("mount references undeclared volume '{volume}'")]
    VolumeNotFound { volume: String },

    /// An environment variable indirection could not be satisfied
    #[error("cannot resolve environment variable '{variable}': {reason}")]
    ReferenceResolution { variable: String, reason: String },

    /// Wrapper attaching the container name to a failed generation step
    #[error("generation failed for container '{container}': {source}")]
    Container {
        container: String,
        #[source]
        source: Box<Error>,
    },

    /// The resource provider itself failed (transport, parsing, subprocess)
    #[error("resource provider error: {reason}")]
    Provider { reason: String },

    /// Directory or file creation failed under the session root
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Compose document serialization failed
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Annotate an error with the container whose generation step failed.
    pub fn for_container(self, container: &str) -> Error {
        Error::Container {
            container: container.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type for replikate operations
pub type Result<T> = std::result::Result<T, Error>;
