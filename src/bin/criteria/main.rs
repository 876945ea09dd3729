//! Command line front end for rendering criteria paths against a metamodel file.
#![forbid(unsafe_code)]

mod args;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sombra_criteria::criteria::{
    render_order_by, Attribute, BasicRenderingContext, CriteriaError, CriteriaErrorWithCode,
    InMemoryMetamodel, MetamodelProvider, Order, QueryTree, Renderable, RenderingContext,
    Selection, TypeKind,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{OrderSpec, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "criteria",
    version,
    about = "Render criteria query paths against a metamodel",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "CRITERIA_METAMODEL",
        value_name = "FILE",
        help = "TOML file describing entities and embeddables"
    )]
    metamodel: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render projections, type expressions and an ORDER BY list.
    Render(RenderCmd),
    /// List the attributes of a managed type.
    Describe {
        #[arg(long = "root", value_name = "TYPE", help = "Entity or embeddable name")]
        name: String,
    },
}

#[derive(Args, Debug)]
struct RenderCmd {
    #[arg(long, help = "Root entity")]
    root: String,

    #[arg(long, help = "Explicit root alias (generated when omitted)")]
    alias: Option<String>,

    #[arg(long = "path", value_name = "a.b.c", help = "Dotted path to project")]
    paths: Vec<String>,

    #[arg(long = "type-of", value_name = "a.b", help = "Dotted path whose type() to render")]
    type_of: Vec<String>,

    #[arg(long = "order-by", value_name = "a.b[:asc|desc]", help = "Sort term")]
    order_by: Vec<OrderSpec>,
}

#[derive(Debug, Serialize)]
struct RenderedPath {
    path: String,
    rendered: String,
}

#[derive(Debug, Serialize)]
struct RenderReport {
    root: String,
    alias: String,
    projections: Vec<RenderedPath>,
    types: Vec<RenderedPath>,
    order_by: Option<String>,
}

#[derive(Debug, Serialize)]
struct DescribeReport<'a> {
    name: &'a str,
    kind: TypeKind,
    attributes: Vec<&'a Attribute>,
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<CriteriaError>() {
            Some(criteria) => {
                eprintln!("error: {}", CriteriaErrorWithCode(criteria));
                if criteria.is_navigation_error() {
                    ExitCode::from(2)
                } else {
                    ExitCode::FAILURE
                }
            }
            None => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let Some(metamodel_path) = cli.metamodel.as_ref() else {
        return Err("--metamodel (or CRITERIA_METAMODEL) is required".into());
    };
    let model = InMemoryMetamodel::load(metamodel_path)?;

    match cli.command {
        Command::Render(cmd) => {
            let report = render(Arc::new(model), &cmd)?;
            emit(cli.format, &report, || print_render_text(&report))?;
        }
        Command::Describe { name } => {
            let ty = model
                .managed_type(&name)
                .ok_or(CriteriaError::UnknownManagedType { name: name.clone() })?;
            let report = DescribeReport {
                name: ty.name(),
                kind: ty.kind(),
                attributes: ty.attributes().collect(),
            };
            emit(cli.format, &report, || print_describe_text(&report))?;
        }
    }
    Ok(())
}

fn render(model: Arc<InMemoryMetamodel>, cmd: &RenderCmd) -> Result<RenderReport, CriteriaError> {
    let mut tree = QueryTree::new(model);
    let root = match &cmd.alias {
        Some(alias) => tree.root_with_alias(&cmd.root, alias.clone())?,
        None => tree.root(&cmd.root)?,
    };
    let mut ctx = BasicRenderingContext::new();
    // Aliased before navigation so errors name the path the way it renders.
    tree.prepare_alias(root, &mut ctx)?;

    let mut projections = Vec::with_capacity(cmd.paths.len());
    for dotted in &cmd.paths {
        projections.push((dotted.as_str(), tree.get_dotted(root, dotted)?));
    }
    let mut types = Vec::with_capacity(cmd.type_of.len());
    for dotted in &cmd.type_of {
        let path = tree.get_dotted(root, dotted)?;
        types.push((dotted.as_str(), tree.type_expression(path)?));
    }
    let mut orders = Vec::with_capacity(cmd.order_by.len());
    for spec in &cmd.order_by {
        let path = tree.get_dotted(root, &spec.path)?;
        orders.push(Order::with_direction(path, spec.ascending));
    }
    debug!(
        paths = tree.path_count(),
        expressions = tree.expression_count(),
        "criteria tree built"
    );

    let ctx: &mut dyn RenderingContext = &mut ctx;
    let mut report = RenderReport {
        root: cmd.root.clone(),
        alias: tree.path_identifier(root)?,
        projections: Vec::with_capacity(projections.len()),
        types: Vec::with_capacity(types.len()),
        order_by: None,
    };
    for (dotted, path) in projections {
        report.projections.push(RenderedPath {
            path: dotted.to_owned(),
            rendered: Selection::from(path).render_projection(&tree, ctx)?,
        });
    }
    for (dotted, expr) in types {
        report.types.push(RenderedPath {
            path: dotted.to_owned(),
            rendered: tree.render_projection(expr.into(), ctx)?,
        });
    }
    if !orders.is_empty() {
        report.order_by = Some(render_order_by(&tree, &orders, ctx)?);
    }
    Ok(report)
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: Fn(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}

fn print_render_text(report: &RenderReport) {
    println!("from {} {}", report.root, report.alias);
    for projection in &report.projections {
        println!("select {}", projection.rendered);
    }
    for ty in &report.types {
        println!("select {}", ty.rendered);
    }
    if let Some(order_by) = &report.order_by {
        println!("order by {order_by}");
    }
}

fn print_describe_text(report: &DescribeReport<'_>) {
    println!("{} ({:?})", report.name, report.kind);
    for attribute in &report.attributes {
        match attribute {
            Attribute::Singular(attr) => {
                println!("  {}: {} [{:?}]", attr.name(), attr.java_type(), attr.type_kind())
            }
            Attribute::Plural(attr) => println!(
                "  {}: {:?}<{}>",
                attr.name(),
                attr.collection_type(),
                attr.element_type()
            ),
            Attribute::Map(attr) => println!(
                "  {}: Map<{}, {}>",
                attr.name(),
                attr.key_type(),
                attr.value_type()
            ),
        }
    }
}
