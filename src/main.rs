use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use script_graph::builtin_nodes::standard_catalog;
use script_graph::graph::Severity;
use script_graph::quick_add::{self, QuickAddQuery, SourceSocket};
use script_graph::{EditorConfig, NodeCatalog, PortType, ScriptDocument, ScriptEditor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inspect bot scripts and node catalogs
#[derive(Parser, Debug)]
#[command(name = "script-graph", version, about, long_about = None)]
struct Cli {
    /// Editor settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a saved script and check it for integrity problems
    Inspect {
        script: PathBuf,
        /// Node catalog JSON (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Run the quick-add filter over a catalog
    Catalog {
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long, default_value = "")]
        search: String,
        /// Type of the socket a connection is dragged from
        #[arg(long)]
        socket: Option<PortType>,
        #[arg(long, value_enum, default_value_t = SocketSide::Output)]
        direction: SocketSide,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SocketSide {
    Output,
    Input,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Inspect { script, catalog } => inspect(&script, load_catalog(catalog.as_deref())?, config),
        Command::Catalog {
            catalog,
            search,
            socket,
            direction,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let socket = socket.map(|ty| match direction {
                SocketSide::Output => SourceSocket::output(ty),
                SocketSide::Input => SourceSocket::input(ty),
            });
            list_catalog(&catalog, search, socket, config.include_deprecated);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path.map(Path::to_path_buf).or_else(EditorConfig::default_path) {
        Some(path) => EditorConfig::load(&path).with_context(|| format!("reading settings {}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<NodeCatalog> {
    match path {
        Some(path) => NodeCatalog::load(path).with_context(|| format!("reading catalog {}", path.display())),
        None => Ok(standard_catalog()),
    }
}

fn inspect(path: &Path, catalog: NodeCatalog, config: EditorConfig) -> Result<()> {
    let document = ScriptDocument::load(path).with_context(|| format!("reading script {}", path.display()))?;
    let editor = ScriptEditor::from_document(&document, Arc::new(catalog), config);
    let graph = editor.graph();
    let meta = editor.metadata();

    println!("{} ({})", meta.name, meta.id);
    if !meta.description.is_empty() {
        println!("  {}", meta.description);
    }
    println!("  status:     {}", if meta.paused { "paused" } else { "active" });
    println!("  modified:   {}", meta.modified.to_rfc3339());
    println!("  nodes:      {}", graph.nodes.len());
    println!("  edges:      {}", graph.edges.len());
    println!("  depth:      {}", graph.max_depth());
    println!("  complexity: {:.1}", editor.complexity_score());

    let diagnostics = editor.diagnostics();
    if diagnostics.is_empty() {
        println!("no problems found");
        return Ok(());
    }
    let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    for d in &diagnostics {
        let tag = match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let subject = d
            .node
            .map(|id| format!("node {}", id))
            .or_else(|| d.edge.map(|id| format!("edge {}", id)))
            .unwrap_or_default();
        println!("{}: {} {}", tag, subject, d.message);
    }
    if errors > 0 {
        anyhow::bail!("{} integrity error(s) in {}", errors, path.display());
    }
    Ok(())
}

fn list_catalog(catalog: &NodeCatalog, search: String, socket: Option<SourceSocket>, include_deprecated: bool) {
    let query = QuickAddQuery {
        search,
        socket,
        include_deprecated,
    };
    let groups = quick_add::grouped(catalog, &query);
    if groups.is_empty() {
        println!("no matching nodes");
    }
    for group in groups {
        println!("{}", group.name);
        for def in group.definitions {
            let deprecated = if def.is_deprecated() { " (deprecated)" } else { "" };
            println!("  {:<24} {}{}", def.node_type, def.label, deprecated);
        }
    }
}
