//! CLI for `proto2oas`.
//!
//! # Subcommands
//!
//! ```text
//! # Compile protos to a descriptor set first (comments need source info):
//! protoc --include_imports --include_source_info \
//!   --descriptor_set_out=target/descriptor.bin proto/*.proto
//!
//! # Generate the OpenAPI 3.0 document
//! proto2oas generate \
//!   --descriptor target/descriptor.bin \
//!   --config api/openapi/proto2oas.yaml \
//!   --cargo-toml Cargo.toml \
//!   --output api/openapi/openapi.json
//!
//! # Print the route every RPC resolves to
//! proto2oas routes --descriptor target/descriptor.bin --config api/openapi/proto2oas.yaml
//! ```

#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use proto2oas::schema::{NodeId, NodeKind, SchemaTree};
use proto2oas::ProjectConfig;
use tracing_subscriber::EnvFilter;

/// `OpenAPI` 3.0 document generator for protobuf RPC services.
#[derive(Parser)]
#[command(name = "proto2oas", version, about)]
enum Cli {
    /// Generate an `OpenAPI` 3.0 JSON document from a compiled descriptor set.
    Generate(GenerateArgs),

    /// Print the HTTP route resolved for every RPC method.
    ///
    /// Useful for checking route overrides before generating.
    Routes(RoutesArgs),
}

#[derive(Parser)]
struct GenerateArgs {
    /// Path to the compiled proto `FileDescriptorSet` (binary).
    #[arg(short, long)]
    descriptor: PathBuf,

    /// Path to a project config file (YAML or TOML).
    ///
    /// CLI flags override values from the config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API title. Overrides `title` from the config file.
    #[arg(long)]
    title: Option<String>,

    /// Server URL. Repeatable; replaces `servers` from the config file.
    #[arg(long = "server")]
    servers: Vec<String>,

    /// Route override as `Service.Method="verb /path"`. Repeatable; added on
    /// top of `routes` from the config file.
    #[arg(long = "route", value_parser = parse_route_arg)]
    routes: Vec<(String, String)>,

    /// Read `info.version` from this `Cargo.toml`.
    #[arg(long)]
    cargo_toml: Option<PathBuf>,

    /// Output JSON path. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct RoutesArgs {
    /// Path to the compiled proto `FileDescriptorSet` (binary).
    #[arg(short, long)]
    descriptor: PathBuf,

    /// Path to a project config file (YAML or TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli {
        Cli::Generate(args) => run_generate(&args),
        Cli::Routes(args) => run_routes(&args),
    }
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(title) = &args.title {
        config.title.clone_from(title);
    }
    if !args.servers.is_empty() {
        config.servers.clear();
        for url in &args.servers {
            config = config.server(url, None);
        }
    }
    for (method, route) in &args.routes {
        config = config.route(method, route);
    }
    if let Some(path) = &args.cargo_toml {
        config.version = read_cargo_version(path)?;
        eprintln!("Using version {} from {}", config.version, path.display());
    }

    let descriptor_bytes = fs::read(&args.descriptor)
        .with_context(|| format!("Failed to read descriptor: {}", args.descriptor.display()))?;

    let doc = proto2oas::generate_from_descriptor(&descriptor_bytes, &config)
        .context("Failed to generate OpenAPI document")?;
    eprintln!(
        "Generated {} schemas, {} paths, {} tags",
        doc.components.schemas.len(),
        doc.paths.len(),
        doc.tags.len(),
    );

    let json = doc.to_json_pretty().context("Failed to serialize document")?;
    match &args.output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!("Wrote OpenAPI document to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn run_routes(args: &RoutesArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let descriptor_bytes = fs::read(&args.descriptor)
        .with_context(|| format!("Failed to read descriptor: {}", args.descriptor.display()))?;
    let tree = proto2oas::load_descriptor_set(&descriptor_bytes, config.keep_case)
        .context("Failed to load descriptor set")?;

    let mut services = Vec::new();
    collect_services(&tree, tree.root(), &mut services);

    for id in services {
        let NodeKind::Service(service) = tree.node(id).kind() else {
            continue;
        };
        let tag = tree.qualified_name(id);
        println!("{tag}");

        for method in &service.methods {
            let route = proto2oas::resolve_route(
                &tag,
                tree.node(id).name(),
                &method.name,
                &config.routes,
                method.http.as_ref(),
                config.http_annotations,
            )
            .with_context(|| format!("Failed to resolve route for {tag}.{}", method.name))?;

            if route.path_params.is_empty() {
                println!("  {} {}", route.verb.to_uppercase(), route.template);
            } else {
                println!(
                    "  {} {} ({})",
                    route.verb.to_uppercase(),
                    route.template,
                    route.path_params.join(", ")
                );
            }
        }
    }

    Ok(())
}

/// Load the config file if one was given, otherwise start from defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<ProjectConfig> {
    match path {
        Some(path) => {
            eprintln!("Loading config: {}", path.display());
            ProjectConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Ok(ProjectConfig::default()),
    }
}

/// Service nodes in traversal order.
fn collect_services(tree: &SchemaTree, id: NodeId, out: &mut Vec<NodeId>) {
    if matches!(tree.node(id).kind(), NodeKind::Service(_)) {
        out.push(id);
    }
    for &child in tree.node(id).children() {
        collect_services(tree, child, out);
    }
}

/// Parse `Service.Method=verb /path`.
fn parse_route_arg(s: &str) -> Result<(String, String), String> {
    let (method, route) = s
        .split_once('=')
        .ok_or_else(|| format!("expected Service.Method=\"verb /path\", got '{s}'"))?;
    let method = method.trim();
    if method.is_empty() {
        return Err(format!("missing Service.Method in '{s}'"));
    }
    Ok((method.to_string(), route.trim().to_string()))
}

/// Read `version` from a Cargo.toml `[package]` or `[workspace.package]`.
fn read_cargo_version(path: &Path) -> anyhow::Result<String> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc: toml::Table =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    if let Some(v) = doc
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(toml::Value::as_str)
    {
        return Ok(v.to_string());
    }

    if let Some(v) = doc
        .get("workspace")
        .and_then(|w| w.get("package"))
        .and_then(|p| p.get("version"))
        .and_then(toml::Value::as_str)
    {
        return Ok(v.to_string());
    }

    bail!("No version found in {}", path.display());
}
