// src/lib.rs

//! Replikate
//!
//! Reconstructs the runtime environment of one Kubernetes pod on a local
//! machine: fetch the pod's live specification, materialize the file
//! content its volumes reference (config maps, secrets, projected
//! sources), and emit a `docker-compose.yml` whose services see the same
//! environment the original containers did.
//!
//! # Architecture
//!
//! - `k8s`: immutable pod snapshot model plus the `ResourceProvider`
//!   trait (default implementation shells out to kubectl)
//! - `generate`: the engine driving per-container volume materialization
//!   and environment resolution into one compose document per session
//! - `compose`: compose document model and YAML serialization
//! - `modifiers`: content scanners that flag host-specific patterns
//!   (currently embedded URLs) for manual review

pub mod compose;
mod error;
pub mod generate;
pub mod k8s;
pub mod modifiers;

pub use compose::{ComposeDocument, Service, Volume, COMPOSE_FILE_VERSION};
pub use error::{Error, Result};
pub use generate::{GenerationResponse, Generator, DEFAULT_OUTPUT_BASE};
pub use k8s::{KubectlProvider, PodSnapshot, ResourceProvider};
pub use modifiers::{Modifier, UrlReplacer};
