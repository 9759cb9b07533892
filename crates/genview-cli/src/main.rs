//! Command-line interface for genview.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use genview_core::config::{self, endpoints, env_vars};
use genview_core::configuration::{self, Configuration};
use genview_core::detail::{DetailPanel, LoadState};
use genview_core::extension::Component;
use genview_core::presets::Preset;
use genview_core::{AppContext, Feature};
use genview_gene_info::{GeneInfoPlugin, GeneInfoSource, ReqwestTransport};

/// genview - configure and probe a genome browser front end.
#[derive(Parser, Debug)]
#[command(name = "genview")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a configuration file.
    Validate {
        /// Path to the JSON configuration.
        path: PathBuf,
    },
    /// Summarize a configuration file.
    Inspect {
        /// Path to the JSON configuration.
        path: PathBuf,
    },
    /// Print a built-in configuration.
    Preset {
        /// Preset name (hg38 or dicty).
        name: Preset,
        /// Base URI of the data server.
        #[arg(long)]
        data_server: Option<String>,
    },
    /// Build the view state, resolving every required resource.
    Resolve {
        /// Path to the JSON configuration.
        path: PathBuf,
    },
    /// Look up gene information the way the gene panel does.
    GeneInfo {
        /// Gene name or identifier.
        gene: String,
        /// GraphQL endpoint.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Run the development SPARQL endpoint.
    SparqlStub {
        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to.
        #[arg(short, long, default_value_t = endpoints::SPARQL_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Validate { path } => validate(&path),
        Command::Inspect { path } => inspect(&path),
        Command::Preset { name, data_server } => print_preset(name, data_server),
        Command::Resolve { path } => resolve(&path).await,
        Command::GeneInfo { gene, endpoint } => gene_info(&gene, endpoint).await,
        Command::SparqlStub { host, port } => sparql_stub(&host, port).await,
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "genview=debug" } else { "genview=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // JSON output for containers, selected through GENVIEW_LOG_JSON
    if config::log_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load(path: &Path) -> Result<Configuration> {
    configuration::load_file(path)
        .with_context(|| format!("invalid configuration {}", path.display()))
}

fn validate(path: &Path) -> Result<()> {
    let config = load(path)?;
    println!(
        "OK: {} assemblies, {} tracks",
        config.assemblies.len(),
        config.tracks.len()
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let config = load(path)?;

    println!("Assemblies:");
    for asm in &config.assemblies {
        let aliases = if asm.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", asm.aliases.join(", "))
        };
        println!(
            "  {}{} - {}",
            asm.name,
            aliases,
            asm.sequence.adapter.type_name()
        );
    }

    println!("Tracks:");
    for track in &config.tracks {
        println!(
            "  {} [{}] {} - {} on {}",
            track.track_id,
            track.track_type,
            track.name,
            track.adapter.type_name(),
            track.assembly_names.join(", ")
        );
    }

    if !config.aggregate_text_search_adapters.is_empty() {
        println!("Text search:");
        for adapter in &config.aggregate_text_search_adapters {
            println!("  {}", adapter.type_name());
        }
    }

    if let Some(session) = &config.default_session {
        println!("Session {} ({}):", session.name, session.id);
        for view in &session.views {
            let focused = session.focused_view_id.as_ref() == Some(&view.id);
            println!(
                "  {} {}{} - {} open tracks",
                view.view_type,
                view.id,
                if focused { " *" } else { "" },
                view.tracks.len()
            );
        }
    }

    println!("Required resources:");
    for resource in config.required_resources() {
        println!("  {} -> {}", resource.owner, resource.location.resolved());
    }
    Ok(())
}

fn print_preset(preset: Preset, data_server: Option<String>) -> Result<()> {
    let base = data_server.unwrap_or_else(config::data_server);
    let config = preset
        .load(&base)
        .with_context(|| format!("preset {} failed validation", preset.name()))?;
    println!("{}", config.to_json_pretty()?);
    Ok(())
}

async fn resolve(path: &Path) -> Result<()> {
    let config = Arc::new(load(path)?);
    let transport = ReqwestTransport::from_env()?;
    let ctx = AppContext::builder()
        .plugin(GeneInfoPlugin::new(transport))
        .build_default()?;

    let required = config.required_resources().len();
    tracing::info!(resources = required, "resolving required resources");

    let state = ctx
        .start(config)
        .await
        .context("view state construction failed")?;
    println!(
        "Ready: {} resources resolved, plugins: {}",
        required,
        state.plugins.join(", ")
    );
    Ok(())
}

async fn gene_info(gene: &str, endpoint: Option<String>) -> Result<()> {
    let endpoint = endpoint.unwrap_or_else(config::gene_info_endpoint);
    let timeout = Duration::from_secs(config::resolve_timeout_secs());
    let transport = ReqwestTransport::new(endpoint, timeout)?;
    let panel = DetailPanel::new(Arc::new(GeneInfoSource::new(transport)));

    panel
        .mount(Feature::new(gene).with_type("gene").with_name(gene))
        .await;
    match panel.state() {
        LoadState::Failed(e) => Err(e).context(format!(
            "gene lookup failed (endpoint from {})",
            env_vars::GENE_INFO_ENDPOINT
        )),
        _ => {
            println!("{}", panel.render().to_plain_text());
            Ok(())
        }
    }
}

async fn sparql_stub(host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", host, port))?;
    genview_sparql_stub::run(addr)
        .await
        .with_context(|| format!("SPARQL stub on {} failed", addr))
}
