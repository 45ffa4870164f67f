//! sferd CLI entry point
//!
//! `generate` builds the ERD, `stats` and `list` inspect the loaded metadata.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use sferd_core::{load_graph, DiagramFormat, ErdConfig, LayoutDirection, SchemaGraph};
use sferd_utils::{init_logging, merge_configs, LogLevel, LoggerConfig};
use sferd_viz::{parse_formats, render_all, renderer_for, LayoutEngine};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "sferd")]
#[command(about = "Entity-relationship diagrams from Salesforce object metadata")]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the ERD source and render it to images
    Generate(GenerateArgs),

    /// Print relationship statistics for the object tree
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List loaded objects with category, field count and degree
    List {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where the metadata comes from
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Path to the Salesforce objects directory [default: force-app/main/default/objects]
    #[arg(long)]
    objects_path: Option<PathBuf>,

    /// Only load these objects (space- or comma-separated)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    objects: Vec<String>,

    /// Config file (TOML, JSON or YAML); flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory [default: output]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum number of objects in the ERD, 0 for no limit [default: 15]
    #[arg(short, long)]
    max_objects: Option<usize>,

    /// Image formats: svg, png, pdf (space- or comma-separated) [default: svg]
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    formats: Vec<String>,

    /// Base name of the output files [default: final_erd]
    #[arg(long)]
    filename: Option<String>,

    /// Diagram direction
    #[arg(long, value_enum)]
    layout: Option<LayoutDirection>,

    /// Graphviz engine: dot, neato, fdp, sfdp, circo, twopi [default: dot]
    #[arg(long)]
    engine: Option<String>,

    /// Diagram language
    #[arg(long, value_enum)]
    diagram: Option<DiagramFormat>,

    /// Draw objects without their fields
    #[arg(long)]
    hide_fields: bool,

    /// Show every field, not just relationship fields
    #[arg(long)]
    all_fields: bool,

    /// Cap on fields shown per object
    #[arg(long)]
    max_fields_per_entity: Option<usize>,

    /// Never derive a field cap from the diagram size
    #[arg(long)]
    no_auto_limit_fields: bool,

    /// Let objects without relationships fill free slots
    #[arg(long)]
    include_isolated: bool,

    /// Diagram title [default: Salesforce System ERD]
    #[arg(long)]
    title: Option<String>,

    /// Write the diagram source only
    #[arg(long)]
    no_render: bool,

    /// Also print the diagram source to stdout
    #[arg(long)]
    stdout: bool,
}

impl SourceArgs {
    /// Keys this group sets on top of the config file
    fn overlay(&self, root: &mut Map<String, Value>) {
        if let Some(path) = &self.objects_path {
            root.insert("objects_path".into(), json!(path.to_string_lossy()));
        }
        if !self.objects.is_empty() {
            root.insert("objects".into(), json!(self.objects));
        }
    }

    fn resolve(&self, extra: Map<String, Value>) -> Result<ErdConfig> {
        let mut config = match &self.config {
            Some(path) => ErdConfig::from_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => ErdConfig::default(),
        };

        let mut root = extra;
        self.overlay(&mut root);
        merge_configs(&mut config, Value::Object(root))?;
        debug!("Resolved config: {:?}", config);
        Ok(config)
    }
}

impl GenerateArgs {
    /// Flags that were actually given, shaped like [`ErdConfig`]
    fn overlay(&self) -> Map<String, Value> {
        let mut root = Map::new();
        let mut selection = Map::new();
        let mut diagram = Map::new();
        let mut render = Map::new();

        if let Some(dir) = &self.output_dir {
            root.insert("output_dir".into(), json!(dir.to_string_lossy()));
        }
        if let Some(name) = &self.filename {
            root.insert("filename".into(), json!(name));
        }

        if let Some(max) = self.max_objects {
            selection.insert("max_objects".into(), json!(max));
        }
        if self.include_isolated {
            selection.insert("include_isolated".into(), json!(true));
        }

        if let Some(format) = self.diagram {
            diagram.insert("format".into(), json!(format));
        }
        if let Some(title) = &self.title {
            diagram.insert("title".into(), json!(title));
        }
        if self.hide_fields {
            diagram.insert("show_fields".into(), json!(false));
        }
        if self.all_fields {
            diagram.insert("field_scope".into(), json!("all"));
        }
        if let Some(max) = self.max_fields_per_entity {
            diagram.insert("max_fields_per_entity".into(), json!(max));
        }
        if self.no_auto_limit_fields {
            diagram.insert("auto_limit_fields".into(), json!(false));
        }
        if let Some(direction) = self.layout {
            diagram.insert("direction".into(), json!(direction));
        }

        if !self.formats.is_empty() {
            render.insert("formats".into(), json!(self.formats));
        }
        if let Some(engine) = &self.engine {
            render.insert("engine".into(), json!(engine));
        }
        if self.no_render {
            render.insert("enabled".into(), json!(false));
        }

        for (key, section) in [("selection", selection), ("diagram", diagram), ("render", render)] {
            if !section.is_empty() {
                root.insert(key.into(), Value::Object(section));
            }
        }
        root
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = LoggerConfig::with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));
    if let Err(e) = init_logging(&logger) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let result = match cli.command {
        Commands::Generate(args) => generate(&args),
        Commands::Stats { source, json } => stats(&source, json),
        Commands::List { source } => list(&source),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load the full graph and refuse an empty one
fn load_nonempty(config: &ErdConfig) -> Result<SchemaGraph> {
    let (graph, issues) = load_graph(config)?;
    if !issues.is_empty() {
        warn!("{} metadata file(s) could not be parsed", issues.len());
    }
    if graph.is_empty() {
        bail!(
            "No objects found in {}. Please check the objects path.",
            config.objects_path.display()
        );
    }
    info!("Loaded {} objects", graph.node_count());
    Ok(graph)
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let config = args.source.resolve(args.overlay())?;

    // Reject bad render settings before any work
    let formats = parse_formats(&config.render.formats)?;
    let engine: LayoutEngine = config.render.engine.parse()?;

    let graph = load_nonempty(&config)?;
    let selected = graph.select(&config.selection);
    if selected.is_empty() {
        bail!("No objects selected for the ERD; try --include-isolated or --max-objects 0");
    }

    if config.diagram.max_fields_per_entity.is_none() {
        if let Some(limit) = config.diagram.field_limit(selected.node_count()) {
            info!(
                "Auto-limiting to {limit} fields per entity ({} objects)",
                selected.node_count()
            );
        }
    }

    let source = sferd_viz::export(&selected, &config.diagram);
    let diagram_path = write_diagram(&config, &source)?;

    if args.stdout {
        print!("{source}");
    } else {
        println!(
            "ERD with {} objects and {} relationships: {}",
            selected.node_count(),
            selected.edge_count(),
            diagram_path.display()
        );
    }

    if !config.render.enabled {
        return Ok(());
    }

    let renderer = renderer_for(config.diagram.format, engine);
    let outcomes = render_all(
        renderer.as_ref(),
        &source,
        &config.images_dir(),
        &config.filename,
        &formats,
    )?;

    if !args.stdout {
        for outcome in outcomes.iter().filter(|o| o.succeeded()) {
            println!("{} image: {}", outcome.format.extension().to_uppercase(), outcome.path.display());
        }
    }
    Ok(())
}

fn write_diagram(config: &ErdConfig, source: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", config.output_dir.display())
    })?;

    let path = config.diagram_path();
    std::fs::write(&path, source)
        .with_context(|| format!("Failed to write diagram file: {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

fn stats(source: &SourceArgs, as_json: bool) -> Result<()> {
    let config = source.resolve(Map::new())?;
    let graph = load_nonempty(&config)?;
    let stats = graph.statistics();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Objects:          {}", stats.object_count);
    for (category, count) in &stats.category_counts {
        println!("  {:<15} {count}", category.to_string());
    }
    println!("Relationships:    {}", stats.relationship_count);
    println!("  master-detail   {}", stats.master_detail_count);
    println!("  lookup          {}", stats.lookup_count);
    println!("  self reference  {}", stats.self_reference_count);
    println!("Dangling refs:    {}", stats.dangling_count);
    println!("Density:          {:.4}", stats.density);
    println!("Average degree:   {:.2}", stats.average_degree);
    println!("Components:       {}", stats.connected_components);
    println!("Isolated objects: {}", stats.isolated_objects.len());

    if !stats.most_connected.is_empty() {
        println!("Most connected:");
        for (name, degree) in &stats.most_connected {
            println!("  {name} ({degree})");
        }
    }
    Ok(())
}

fn list(source: &SourceArgs) -> Result<()> {
    let config = source.resolve(Map::new())?;
    let graph = load_nonempty(&config)?;
    let degrees = graph.degrees();

    let width = graph.nodes().map(|n| n.name.len()).max().unwrap_or(0).max(6);
    println!("{:<width$}  {:<8}  {:>6}  {:>6}", "OBJECT", "CATEGORY", "FIELDS", "DEGREE");
    for node in graph.nodes() {
        println!(
            "{:<width$}  {:<8}  {:>6}  {:>6}",
            node.name,
            node.category.to_string(),
            node.fields.len(),
            degrees.get(node.name.as_str()).copied().unwrap_or(0)
        );
    }
    Ok(())
}
