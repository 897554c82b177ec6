// src/commands.rs
//! Command handlers for the replikate CLI

use anyhow::Result;
use replikate::{Generator, KubectlProvider, Modifier};
use std::path::PathBuf;
use tracing::info;

/// Generate the compose reconstruction for one pod and print the command
/// to bring it up, plus any content detections worth reviewing first.
pub fn reproduce(
    namespace: &str,
    pod: &str,
    output_dir: PathBuf,
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
) -> Result<()> {
    let provider = KubectlProvider::new(kubeconfig, context);
    let generator = Generator::new(provider, output_dir);

    info!(namespace, pod, "generating local reconstruction");
    let response = generator.generate(namespace, pod)?;

    for modifier in &response.modifiers {
        let detections = modifier.detections();
        if detections.is_empty() {
            continue;
        }
        println!(
            "{} flagged {} pattern(s); review before running:",
            modifier.name(),
            detections.len()
        );
        for pattern in detections.keys() {
            println!("  {}", pattern);
        }
    }

    println!("{}", response.command());
    Ok(())
}
