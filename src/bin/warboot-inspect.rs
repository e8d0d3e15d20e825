use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use warboot::archive::Archive;
use warboot::config::{settings_from_process_env, Resolver};
use warboot::extract::{is_loadable, remap_entry_path};
use warboot::LaunchMode;

#[derive(Parser)]
#[command(name = "warboot-inspect")]
#[command(about = "Inspect what warboot would do with an archive", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List archive entries and where they would be extracted
    Entries { archive: PathBuf },
    /// Show the resolved webserver configuration and argv
    Config {
        archive: PathBuf,
        /// Webroot substituted for {{webroot}}
        #[arg(long, default_value = "/tmp/webroot")]
        webroot: PathBuf,
        /// Arguments as they would be passed to the launcher
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Show the launch mode for an argument vector
    Mode {
        #[arg(last = true)]
        args: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Entries { archive } => entries(&archive)?,
        Commands::Config {
            archive,
            webroot,
            args,
        } => config(&archive, &webroot, &args)?,
        Commands::Mode { args } => serde_json::to_value(LaunchMode::parse(&args)?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn entries(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let mut archive = Archive::open(path)?;
    let mut listed = Vec::new();

    archive.visit(|entry| {
        let destination = remap_entry_path(entry.name);
        let kind = if entry.is_unsafe {
            "skipped"
        } else if entry.is_dir {
            "directory"
        } else if is_loadable(&destination) {
            "loadable"
        } else {
            "file"
        };
        listed.push(json!({
            "entry": entry.name,
            "destination": destination,
            "kind": kind,
        }));
        Ok(())
    })?;

    Ok(json!({
        "archive": archive.path(),
        "entries": listed,
    }))
}

fn config(path: &Path, webroot: &Path, args: &[String]) -> Result<Value, Box<dyn std::error::Error>> {
    let settings = settings_from_process_env()?;
    let mut archive = Archive::open(path)?;
    let resolved = Resolver::new(&settings).resolve(&mut archive, webroot);

    let properties: serde_json::Map<String, Value> = resolved
        .properties()
        .iter()
        .map(|(key, value)| (key.to_string(), Value::from(value)))
        .collect();

    Ok(json!({
        "archive": archive.path(),
        "entry_point": resolved.entry_point().ok(),
        "properties": properties,
        "props": resolved.prop_keys(),
        "argv": resolved.invocation_args(args),
    }))
}
