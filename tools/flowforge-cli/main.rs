use clap::{Parser, Subcommand};
use flowforge::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect, resolve and restructure prompt flow files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow JSON file
    flow_path: String,

    /// Optional path to an engine config JSON file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Write the modified flow here instead of printing it
    #[arg(short, long, global = true)]
    out: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the nodes, edges and groups of the flow
    Inspect,
    /// Resolve one output socket of a node
    Output { node_id: String, socket: String },
    /// Bind a node's template variables through its upstream closure
    Pull {
        node_id: String,
        /// Variables to bind; defaults to the variables the node declares
        #[arg(short, long = "var")]
        vars: Vec<String>,
    },
    /// Flag the refreshable direct successors of a node
    Ping { node_id: String },
    /// Collapse nodes into a composite group node
    Group {
        #[arg(short, long, value_delimiter = ',', required = true)]
        nodes: Vec<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Expand a composite group node
    Ungroup {
        node_id: String,
        /// Seed for the position jitter, for reproducible layouts
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start = Instant::now();
    let mut graph = load_graph(&cli.flow_path, cli.config.as_deref());
    let load_duration = start.elapsed();

    match cli.command {
        Command::Inspect => inspect(&graph),
        Command::Output { node_id, socket } => {
            let output = graph
                .output(&node_id, &socket)
                .unwrap_or_else(|e| exit_with_error(&format!("Resolution failed: {}", e)));
            match output {
                Some(output) => print_values(&output.into_prompt_vars()),
                None => println!("-> Node '{}' has no output on '{}'", node_id, socket),
            }
        }
        Command::Pull { node_id, vars } => {
            let vars = if vars.is_empty() {
                graph
                    .node(&node_id)
                    .map(|n| n.data.vars.clone())
                    .unwrap_or_else(|| exit_with_error(&format!("Node '{}' not found", node_id)))
            } else {
                vars
            };
            let resolve_start = Instant::now();
            let pulled = graph
                .pull_input_data(&vars, &node_id)
                .unwrap_or_else(|e| exit_with_error(&format!("Pull failed: {}", e)));
            let resolve_duration = resolve_start.elapsed();

            for var in &vars {
                match pulled.get(var) {
                    Some(values) => {
                        println!("{} ({} values)", var, values.len());
                        print_values(values);
                    }
                    None => println!("{} (not connected)", var),
                }
            }
            println!("\nLoaded in {:?}, pulled in {:?}", load_duration, resolve_duration);
        }
        Command::Ping { node_id } => {
            let pinged = graph.notify_downstream(&node_id);
            eprintln!("Pinged {} node(s): {}", pinged.len(), pinged.join(", "));
            write_flow(&graph, cli.out.as_deref());
        }
        Command::Group {
            nodes,
            name,
            description,
        } => {
            let ids: Vec<&str> = nodes.iter().map(String::as_str).collect();
            let group_id = graph
                .create_group(&ids, &name, description.as_deref())
                .unwrap_or_else(|e| exit_with_error(&format!("Grouping failed: {}", e)));
            eprintln!("Created group '{}' (node groupnode-{})", group_id, group_id);
            write_flow(&graph, cli.out.as_deref());
        }
        Command::Ungroup { node_id, seed } => {
            let result = match seed {
                Some(seed) => graph.ungroup_with_rng(&node_id, &mut StdRng::seed_from_u64(seed)),
                None => graph.ungroup(&node_id),
            };
            let restored =
                result.unwrap_or_else(|e| exit_with_error(&format!("Ungrouping failed: {}", e)));
            eprintln!("Restored {} node(s): {}", restored.len(), restored.join(", "));
            write_flow(&graph, cli.out.as_deref());
        }
    }
}

fn load_graph(flow_path: &str, config_path: Option<&str>) -> GraphService {
    let json = fs::read_to_string(flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read flow file '{}': {}", flow_path, e))
    });
    let flow = FlowData::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flow: {}", e)));

    let config = match config_path {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EngineConfig::default(),
    };

    GraphService::builder()
        .with_config(config)
        .with_flow(flow)
        .build()
}

fn inspect(graph: &GraphService) {
    println!("--- Nodes ({}) ---", graph.nodes().len());
    for node in graph.nodes() {
        println!(
            "  {} [{}] vars: {:?}{}",
            node.id,
            node.kind,
            node.data.vars,
            if node.data.refresh { " (refresh)" } else { "" }
        );
        if let Some(composite) = node.as_composite() {
            for line in composite.summary() {
                println!("      {}", line);
            }
        }
    }

    println!("\n--- Edges ({}) ---", graph.edges().len());
    for edge in graph.edges() {
        println!(
            "  {}:{} -> {}:{}",
            edge.source, edge.source_handle, edge.target, edge.target_handle
        );
    }

    if !graph.groups().is_empty() {
        println!("\n--- Groups ({}) ---", graph.groups().len());
        for group in graph.groups() {
            println!("  {} '{}': {}", group.id, group.name, group.nodes.join(", "));
        }
    }
}

fn print_values(values: &[PromptVar]) {
    for value in values {
        match value.metavars().filter(|m| !m.is_empty()) {
            Some(metavars) => println!("  - {} {:?}", value, metavars),
            None => println!("  - {}", value),
        }
    }
}

fn write_flow(graph: &GraphService, out: Option<&str>) {
    let json = graph
        .to_flow()
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize flow: {}", e)));
    match out {
        Some(path) => fs::write(path, json).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write flow to '{}': {}", path, e))
        }),
        None => println!("{}", json),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
