use std::time::Instant;

use anyhow::{Context, Result};
use avl::Tree;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "avl", about = "Build, inspect, and time AVL trees of integers")]
struct Cli {
    /// Log tree operations (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a tree from a comma-separated list of integers and print it in order.
    Build {
        /// Keys to insert, e.g. `5,3,8,1`.
        #[arg(
            value_delimiter = ',',
            value_parser = parse_key,
            allow_hyphen_values = true,
            required = true
        )]
        values: Vec<i64>,
        /// Key to delete after building. May be repeated.
        #[arg(short, long = "delete", value_parser = parse_key, allow_hyphen_values = true)]
        deletes: Vec<i64>,
        /// Also print the tree's shape, sideways.
        #[arg(long)]
        show_tree: bool,
    },
    /// Time building a tree from random keys and traversing it.
    Perf {
        /// How many random keys to insert.
        #[arg(long, default_value_t = 1000)]
        count: usize,
        /// Keys are drawn uniformly from `1..=max_key`.
        #[arg(long, default_value_t = 10_000, value_parser = clap::value_parser!(i64).range(1..))]
        max_key: i64,
        /// Seed for reproducible key sets.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            values,
            deletes,
            show_tree,
        } => run_build(values, deletes, show_tree)?,
        Commands::Perf {
            count,
            max_key,
            seed,
        } => run_perf(count, max_key, seed)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "avl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parses one key, ignoring surrounding whitespace so `"5, 3, 8"` works as well as `"5,3,8"`.
fn parse_key(s: &str) -> Result<i64, String> {
    s.trim()
        .parse()
        .map_err(|e| format!("`{}` is not an integer: {e}", s.trim()))
}

fn run_build(values: Vec<i64>, deletes: Vec<i64>, show_tree: bool) -> Result<()> {
    let mut tree = Tree::from_unsorted(values).context("failed to build balanced tree")?;
    info!(len = tree.len(), height = tree.height(), "balanced tree built");

    for key in deletes {
        let deleted = tree
            .delete(&key)
            .with_context(|| format!("failed to delete {key}"))?;
        if deleted {
            println!("Node {key} deleted successfully.");
        } else {
            println!("Node {key} not found.");
        }
    }

    if tree.is_empty() {
        println!("Tree is empty.");
        return Ok(());
    }

    println!("In-Order Traversal: {:?}", tree.inorder());
    println!("Height: {}", tree.height());
    if show_tree {
        print!("{tree}");
    }

    Ok(())
}

fn run_perf(count: usize, max_key: i64, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let keys: Vec<i64> = (0..count).map(|_| rng.gen_range(1..=max_key)).collect();
    debug!(count, max_key, ?seed, "generated random keys");

    let start = Instant::now();
    let tree = Tree::from_unsorted(keys).context("failed to build tree from random keys")?;
    let build_time = start.elapsed();
    println!(
        "Time to build balanced BST for {count} elements: {:.6} seconds.",
        build_time.as_secs_f64()
    );

    let start = Instant::now();
    let sorted = tree.inorder();
    let traversal_time = start.elapsed();
    println!(
        "Time for in-order traversal: {:.6} seconds.",
        traversal_time.as_secs_f64()
    );
    debug!(len = sorted.len(), height = tree.height(), "traversed tree");

    Ok(())
}
