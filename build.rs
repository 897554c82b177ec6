// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("replikate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Replikate Contributors")
        .about("Reconstruct a running Kubernetes pod as a local docker-compose file")
        .subcommand_required(true)
        .subcommand(
            Command::new("reproduce")
                .about("Reproduce a specific pod locally")
                .arg(
                    Arg::new("namespace")
                        .short('n')
                        .long("namespace")
                        .required(true)
                        .help("Namespace the pod lives in"),
                )
                .arg(
                    Arg::new("pod")
                        .short('p')
                        .long("pod")
                        .required(true)
                        .help("Name of the pod to reproduce"),
                )
                .arg(
                    Arg::new("output_dir")
                        .long("output-dir")
                        .default_value("/tmp/replikate")
                        .help("Base directory for generated sessions"),
                )
                .arg(
                    Arg::new("kubeconfig")
                        .long("kubeconfig")
                        .help("Kubeconfig file (defaults to kubectl's own resolution)"),
                )
                .arg(
                    Arg::new("context")
                        .long("context")
                        .help("Kubeconfig context to use"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("replikate.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
