//! hacid-kg CLI: resolve roles and browse the knowledge graph from a shell.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use hacid_kg::browse;
use hacid_kg::config::{CONFIG_ENV, ServiceConfig};
use hacid_kg::endpoint::{LocalEndpoint, RemoteEndpoint, SparqlEndpoint};
use hacid_kg::resolve::{LabelFilter, Resolution, Resolver};
use hacid_kg::sparql::{self, Solution};
use hacid_kg::tasks::TaskCatalog;

#[derive(Parser)]
#[command(name = "hacid-kg", version, about = "Resolve workflow roles against the HACID knowledge graph")]
struct Cli {
    /// Config file (TOML). Falls back to $HACID_KG_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SPARQL endpoint URL, overriding the config.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Query a local Turtle file instead of the remote endpoint.
    #[arg(long, global = true, conflicts_with = "endpoint")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive label prefix.
    #[arg(long)]
    startswith: Option<String>,

    /// Comma-separated, case-insensitive label substrings (all must match).
    #[arg(long)]
    contains: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> LabelFilter {
        LabelFilter::new(self.startswith.as_deref(), self.contains.as_deref())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the fillers of a role or entity type (`method` for methods).
    Resolve {
        identifier: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Print solution bindings as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the strategy and query a resolution would run, without running it.
    Explain {
        identifier: String,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List climate hazards.
    Hazards {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },

    /// List named classes.
    Classes,

    /// List labelled instances of a class.
    Instances {
        class_uri: String,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Run a raw SPARQL query and print the JSON document.
    Sparql { query: String },

    /// Print the task catalog.
    Tasks {
        /// Catalog file, overriding the config.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print the effective configuration.
    Config,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    let mut config = ServiceConfig::load_or_default(config_path.as_deref())?;
    config.apply_process_env()?;
    if let Some(url) = &cli.endpoint {
        config.endpoint.url = url.clone();
    }

    match cli.command {
        Commands::Resolve {
            identifier,
            filter,
            json,
        } => {
            let resolver = Resolver::new(&config.resolution)?;
            let endpoint = open_endpoint(&cli.data, &config)?;
            let found = resolver.resolve(endpoint.as_ref(), &identifier, &filter.to_filter())?;
            print_resolution(&found, json)?;
        }

        Commands::Explain { identifier, filter } => {
            let resolver = Resolver::new(&config.resolution)?;
            let plan = resolver.plan(&identifier, &filter.to_filter())?;
            println!("# strategy: {}", plan.strategy());
            println!(
                "# output: ?{} ?{}",
                plan.vars().id().as_str(),
                plan.vars().label().as_str()
            );
            println!("{}", plan.query());
        }

        Commands::Hazards { filter, json } => {
            let resolver = Resolver::new(&config.resolution)?;
            let endpoint = open_endpoint(&cli.data, &config)?;
            let found = resolver.hazards(endpoint.as_ref(), &filter.to_filter())?;
            print_resolution(&found, json)?;
        }

        Commands::Classes => {
            let endpoint = open_endpoint(&cli.data, &config)?;
            let rows = endpoint.select(&browse::classes_query())?.into_solutions();
            print_pairs(&rows, "class", "classLabel");
        }

        Commands::Instances { class_uri, filter } => {
            let class = sparql::parse_iri(class_uri.trim())?;
            let endpoint = open_endpoint(&cli.data, &config)?;
            let query = browse::instances_query(
                &class,
                &filter.to_filter(),
                &config.resolution.instance_languages,
                config.resolution.result_limit,
            );
            let rows = endpoint.select(&query)?.into_solutions();
            print_pairs(&rows, "classInstance", "classInstanceLabel");
        }

        Commands::Sparql { query } => {
            let endpoint = open_endpoint(&cli.data, &config)?;
            let doc = endpoint.raw(&query)?;
            println!("{}", serde_json::to_string_pretty(&doc).into_diagnostic()?);
        }

        Commands::Tasks { file } => {
            let catalog = TaskCatalog::new(file.unwrap_or(config.server.tasks_file));
            let tasks = catalog.load()?;
            for task in &tasks {
                println!("{}  <{}>", task.task_label, task.task_uri);
                for child in &task.children {
                    match &child.role_uri {
                        Some(role) => println!(
                            "  {}  [{}: {role}]",
                            child.task_label,
                            child.role_label.as_deref().unwrap_or("role")
                        ),
                        None => println!("  {}", child.task_label),
                    }
                }
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn open_endpoint(data: &Option<PathBuf>, config: &ServiceConfig) -> Result<Box<dyn SparqlEndpoint>> {
    match data {
        Some(path) => Ok(Box::new(LocalEndpoint::from_file(path)?)),
        None => Ok(Box::new(RemoteEndpoint::new(&config.endpoint))),
    }
}

fn print_resolution(found: &Resolution, json: bool) -> Result<()> {
    if json {
        let bindings = found.to_bindings();
        println!("{}", serde_json::to_string_pretty(&bindings).into_diagnostic()?);
    } else {
        for c in &found.candidates {
            println!("{}\t{}", c.label, c.id);
        }
        eprintln!("{} result(s) via {}", found.len(), found.strategy);
    }
    if found.dropped > 0 {
        eprintln!("warning: {} row(s) without identifier or label were skipped", found.dropped);
    }
    Ok(())
}

fn print_pairs(rows: &[Solution], id: &str, label: &str) {
    for row in rows {
        let id = row.get(id).map(|t| t.value()).unwrap_or("-");
        let label = row.get(label).map(|t| t.value()).unwrap_or("-");
        println!("{label}\t{id}");
    }
    eprintln!("{} result(s)", rows.len());
}
