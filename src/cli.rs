// src/cli.rs
//! CLI definitions for replikate
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "replikate")]
#[command(author = "Replikate Project")]
#[command(version)]
#[command(
    about = "Reconstruct a running Kubernetes pod as a local docker-compose file",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reproduce a specific pod locally
    Reproduce {
        /// Namespace the pod lives in
        #[arg(short, long)]
        namespace: String,

        /// Name of the pod to reproduce
        #[arg(short, long)]
        pod: String,

        /// Base directory for generated sessions
        #[arg(long, default_value = replikate::DEFAULT_OUTPUT_BASE)]
        output_dir: PathBuf,

        /// Kubeconfig file (defaults to kubectl's own resolution)
        #[arg(long)]
        kubeconfig: Option<PathBuf>,

        /// Kubeconfig context to use
        #[arg(long)]
        context: Option<String>,
    },
}
