mod logging;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use chaossearch_core::differ::{Diff, diff};
use chaossearch_core::provider::Provider;
use chaossearch_core::resource::{Resource, ResourceId, State, Value};
use chaossearch_provider::ChaosSearchProvider;
use chaossearch_provider::convert::{canonical_attributes, json_to_value, value_to_json};
use chaossearch_provider::resources::{OBJECT_GROUP, OBJECT_GROUPS, find_resource_type};

#[derive(Parser)]
#[command(name = "chaossearch")]
#[command(about = "Manage ChaosSearch object groups", long_about = None)]
struct Cli {
    /// ChaosSearch deployment URL
    #[arg(long, env = "CHAOSSEARCH_URL", global = true)]
    url: Option<String>,

    #[arg(long, env = "CHAOSSEARCH_ACCESS_KEY_ID", global = true)]
    access_key_id: Option<String>,

    #[arg(
        long,
        env = "CHAOSSEARCH_SECRET_ACCESS_KEY",
        hide_env_values = true,
        global = true
    )]
    secret_access_key: Option<String>,

    #[arg(long, env = "CHAOSSEARCH_REGION", global = true)]
    region: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show an object group
    Read {
        /// Object group (bucket) name
        name: String,
    },
    /// List object groups
    List,
    /// Create an object group from a JSON attribute file
    Create {
        name: String,
        /// Path to a JSON object of attributes
        file: PathBuf,
    },
    /// Bring an object group in line with a JSON attribute file
    Update {
        name: String,
        /// Path to a JSON object of attributes
        file: PathBuf,
    },
    /// Delete an object group
    Delete { name: String },
    /// Start indexing
    Activate { name: String },
    /// Pause indexing
    Deactivate { name: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} Failed to set up logging: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let result = run(cli).await;

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        drop(guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let provider = ChaosSearchProvider::new(&settings(&cli))
        .await
        .map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Read { name } => run_read(&provider, &name).await,
        Commands::List => run_list(&provider).await,
        Commands::Create { name, file } => run_create(&provider, &name, &file).await,
        Commands::Update { name, file } => run_update(&provider, &name, &file).await,
        Commands::Delete { name } => run_delete(&provider, &name).await,
        Commands::Activate { name } => run_set_active(&provider, &name, true).await,
        Commands::Deactivate { name } => run_set_active(&provider, &name, false).await,
    }
}

/// Provider settings given on the command line or through the environment
fn settings(cli: &Cli) -> HashMap<String, String> {
    [
        ("url", &cli.url),
        ("access_key_id", &cli.access_key_id),
        ("secret_access_key", &cli.secret_access_key),
        ("region", &cli.region),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
    .collect()
}

/// Load a resource's attributes from a JSON object file
fn load_resource(name: &str, path: &Path) -> Result<Resource, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    let serde_json::Value::Object(map) = json else {
        return Err(format!("{} must contain a JSON object", path.display()));
    };

    let mut resource = Resource::new(OBJECT_GROUP, name);
    for (key, value) in &map {
        if let Some(value) = json_to_value(value) {
            resource.attributes.insert(key.clone(), value);
        }
    }
    resource.attributes = canonical_attributes(&resource.attributes);
    Ok(resource)
}

fn print_attributes(attributes: &HashMap<String, Value>) -> Result<(), String> {
    let json: serde_json::Map<String, serde_json::Value> = attributes
        .iter()
        .map(|(k, v)| (k.clone(), value_to_json(v)))
        .collect();
    let text = serde_json::to_string_pretty(&serde_json::Value::Object(json))
        .map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

async fn read_existing(provider: &ChaosSearchProvider, name: &str) -> Result<State, String> {
    let id = ResourceId::new(OBJECT_GROUP, name);
    let state = provider.read(&id, Some(name)).await.map_err(|e| e.to_string())?;
    if !state.exists {
        return Err(format!("Object group {} not found", name));
    }
    Ok(state)
}

async fn run_read(provider: &ChaosSearchProvider, name: &str) -> Result<(), String> {
    let state = read_existing(provider, name).await?;
    print_attributes(&state.attributes)
}

async fn run_list(provider: &ChaosSearchProvider) -> Result<(), String> {
    let id = ResourceId::new(OBJECT_GROUPS, "all");
    let state = provider.read(&id, None).await.map_err(|e| e.to_string())?;

    let groups = state
        .attributes
        .get("object_groups")
        .and_then(Value::as_list)
        .unwrap_or_default();
    if groups.is_empty() {
        println!("{}", "No object groups.".yellow());
        return Ok(());
    }
    for group in groups {
        let Some(map) = group.as_map() else { continue };
        let name = map.get("name").and_then(Value::as_str).unwrap_or_default();
        match map.get("creation_date").and_then(Value::as_str) {
            Some(created) => println!("  • {} {}", name.bold(), format!("({})", created).dimmed()),
            None => println!("  • {}", name.bold()),
        }
    }
    Ok(())
}

async fn run_create(provider: &ChaosSearchProvider, name: &str, file: &Path) -> Result<(), String> {
    let resource = load_resource(name, file)?;
    println!("{}", format!("Creating object group {}...", name).cyan());
    let state = provider.create(&resource).await.map_err(|e| e.to_string())?;
    println!("  {} {}", "✓".green(), name);
    print_attributes(&state.attributes)
}

async fn run_update(provider: &ChaosSearchProvider, name: &str, file: &Path) -> Result<(), String> {
    let desired = load_resource(name, file)?;
    let current = read_existing(provider, name).await?;

    let schema = find_resource_type(OBJECT_GROUP)
        .map(|t| t.schema())
        .ok_or_else(|| format!("Unknown resource type: {}", OBJECT_GROUP))?;

    let change = diff(&desired, &current);
    match &change {
        Diff::NoChange(_) => {
            println!("{}", "No changes needed.".green());
            Ok(())
        }
        Diff::Update { changes, .. } => {
            let replace = change.replacement_attributes(&schema);
            if !replace.is_empty() {
                return Err(format!(
                    "Changing {} requires replacing object group {}; delete and create it instead",
                    replace.join(", "),
                    name
                ));
            }
            for c in changes {
                let from = c
                    .current
                    .as_ref()
                    .map(|v| value_to_json(v).to_string())
                    .unwrap_or_else(|| "(unset)".to_string());
                println!(
                    "  {} {}: {} -> {}",
                    "~".yellow().bold(),
                    c.name.bold(),
                    from.dimmed(),
                    value_to_json(&c.desired)
                );
            }
            let state = provider
                .update(&desired.id, name, &current, &desired)
                .await
                .map_err(|e| e.to_string())?;
            println!("  {} {}", "✓".green(), name);
            print_attributes(&state.attributes)
        }
        Diff::Create(_) => Err(format!("Object group {} not found", name)),
    }
}

async fn run_delete(provider: &ChaosSearchProvider, name: &str) -> Result<(), String> {
    let id = ResourceId::new(OBJECT_GROUP, name);
    provider.delete(&id, name).await.map_err(|e| e.to_string())?;
    println!("  {} {}", "✓".green(), format!("Deleted {}", name));
    Ok(())
}

async fn run_set_active(
    provider: &ChaosSearchProvider,
    name: &str,
    active: bool,
) -> Result<(), String> {
    let current = read_existing(provider, name).await?;

    let mut desired = Resource::new(OBJECT_GROUP, name);
    desired.attributes = current.attributes.clone();
    desired
        .attributes
        .insert("active".to_string(), Value::Bool(active));

    provider
        .update(&desired.id, name, &current, &desired)
        .await
        .map_err(|e| e.to_string())?;
    println!(
        "  {} {} {}",
        "✓".green(),
        name,
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}
