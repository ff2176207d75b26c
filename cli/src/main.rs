use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use oxigraph::model::NamedNode;
use serde::Serialize;
use shapelens::{load_quads, Context, FieldType, Shape, ShapeCompiler, ShapeSet};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the base log level (use -v / -q to adjust relative to this level)
    #[arg(
        long,
        value_enum,
        default_value_t = LogLevel::Info,
        global = true,
        help = "error | warn | info | debug | trace"
    )]
    log_level: LogLevel,

    /// Increase logging verbosity (can be used multiple times)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (can be used multiple times)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn init_logging(base: LogLevel, verbose: u8, quiet: u8) {
    let levels = [
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];

    let base_idx = levels
        .iter()
        .position(|lvl| *lvl == base.to_filter())
        .unwrap_or(2) as i8; // default to Info
    let adjusted =
        (base_idx + verbose as i8 - quiet as i8).clamp(0, (levels.len() - 1) as i8) as usize;

    env_logger::Builder::from_default_env()
        .format_target(false)
        .filter_level(levels[adjusted])
        .init();
}

#[derive(Parser, Debug)]
struct ShapesArgs {
    /// Path to the shapes file
    #[arg(short, long, value_name = "FILE")]
    shapes: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    #[command(flatten)]
    shapes: ShapesArgs,

    /// Path to the data file
    #[arg(short, long, value_name = "FILE")]
    data: PathBuf,

    /// IRI of the node to extract
    #[arg(long, value_name = "IRI")]
    focus: String,

    /// Extract as this class instead of dispatching on the node's rdf:type
    #[arg(long, value_name = "IRI")]
    class: Option<String>,

    /// Restrict the data graph to the focus node's concise bounded description
    #[arg(long)]
    cbd: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled shapes as JSON
    Shapes(ShapesArgs),
    /// Extract one node from a data graph and print it as JSON
    Extract(ExtractArgs),
}

#[derive(Serialize)]
struct FieldSummary {
    name: String,
    path: String,
    min_count: usize,
    max_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
}

#[derive(Serialize)]
struct ShapeSummary {
    id: String,
    target_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    fields: Vec<FieldSummary>,
}

impl From<&Shape> for ShapeSummary {
    fn from(shape: &Shape) -> Self {
        ShapeSummary {
            id: shape.id.clone(),
            target_class: shape.target_type.clone(),
            description: shape.description.clone(),
            fields: shape
                .fields
                .iter()
                .map(|f| {
                    let (class, datatype) = match &f.field_type {
                        FieldType::Class(c) => (Some(c.clone()), None),
                        FieldType::Datatype(d) => (None, Some(d.as_str().to_string())),
                    };
                    FieldSummary {
                        name: f.name.clone(),
                        path: f.path.to_sparql_path(),
                        min_count: f.min_count,
                        max_count: f.max_count,
                        class,
                        datatype,
                    }
                })
                .collect(),
        }
    }
}

fn compile(args: &ShapesArgs) -> Result<ShapeSet, Box<dyn std::error::Error>> {
    let quads = load_quads(&args.shapes)?;
    let set = ShapeCompiler::new().compile(&quads)?;
    info!(
        "{} shape(s) from {}",
        set.shapes().len(),
        args.shapes.display()
    );
    Ok(set)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.verbose, cli.quiet);

    match cli.command {
        Commands::Shapes(args) => {
            let set = compile(&args)?;
            let summaries: Vec<ShapeSummary> = set.shapes().iter().map(ShapeSummary::from).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Commands::Extract(args) => {
            let set = compile(&args.shapes)?;
            let data = load_quads(&args.data)?;
            let focus = NamedNode::new(args.focus.as_str())
                .map_err(|e| format!("Invalid focus IRI {}: {}", args.focus, e))?;
            let ctx = if args.cbd {
                Context::scoped(focus, &data)
            } else {
                Context::new(focus, Rc::new(data))
            };
            info!("extracting {} ({} quad(s) in scope)", ctx.focus(), ctx.quads().len());

            let extraction = match &args.class {
                Some(class) => set.extract(class, &ctx)?,
                None => set
                    .extract_typed(&ctx)?
                    .ok_or_else(|| format!("{} has no rdf:type; pass --class", args.focus))?,
            };
            println!("{}", serde_json::to_string_pretty(&extraction.to_json())?);
        }
    }
    Ok(())
}
