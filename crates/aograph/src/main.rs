//! aograph CLI
//!
//! Interactive navigation of an AND-OR graph.
//!
//! ## Usage
//!
//! ```bash
//! # Start empty and load a graph with `L <file>`
//! aograph
//!
//! # Preload a graph and use the short-sighted strategy by default
//! aograph --file assemblies/pencil.txt --strategy short
//!
//! # Cap path generation
//! AOGRAPH_MAX_PATHS=10000 aograph --file big.json
//! ```

use aograph::{PlannerConfig, Result, Session, Strategy};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Interactive planner for AND-OR graphs.
#[derive(Parser, Debug)]
#[command(name = "aograph", version, about)]
struct Args {
    /// Graph description to load at startup (text format, or JSON for `.json` files)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Default suggestion strategy: `long` (optimal path) or `short` (greedy)
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Print `D` snapshots as JSON
    #[arg(long)]
    json: bool,
}

fn print_commands() {
    println!();
    println!("Available commands:");
    println!("H              - display the help");
    println!("L <file>       - load a graph description from file");
    println!("N [Y|N]        - suggest the next node (Y = long-sighted, N = short-sighted)");
    println!("S <node>       - set a node as solved");
    println!("C <node> <arc> <cost> - change the cost of a hyperarc");
    println!("D              - describe nodes and paths");
    println!("R              - drop the loaded graph");
    println!("E              - exit");
}

fn print_help() {
    println!("To navigate a graph:");
    println!("1. write a graph description (e.g., my_graph.txt):");
    println!("   <graph-name> <node-count> <head-name>");
    println!("   <node-name> <cost>                       (one per node)");
    println!("   <child-count> <parent-name> <arc-cost>   (one per hyperarc,");
    println!("   <child-name>...                           followed by its children)");
    println!("2. load it (L my_graph.txt)");
    println!("3. ask for a suggestion (N) and set nodes as solved (S <node>)");
    println!("4. exit (E)");
}

fn report<T>(result: Result<T>, on_ok: impl FnOnce(T)) {
    match result {
        Ok(value) => on_ok(value),
        Err(e) if e.is_advisory() => println!("[WARNING] {}", e),
        Err(e) => println!("[ERROR] {}", e),
    }
}

/// Runs one command line. Returns `false` when the session should end.
fn run_command(session: &mut Session, line: &str, json: bool) -> bool {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return true;
    };
    let args: Vec<&str> = words.collect();

    match command.to_ascii_uppercase().as_str() {
        "H" => print_help(),
        "L" => match args.first() {
            Some(file) => report(session.load_file(file), |count| {
                println!("Loaded graph with {} paths", count)
            }),
            None => println!("[ERROR] usage: L <file>"),
        },
        "N" => {
            let strategy = match args.first().map(|a| a.to_ascii_uppercase()) {
                Some(a) if a == "Y" => Some(Strategy::LongSighted),
                Some(a) if a == "N" => Some(Strategy::ShortSighted),
                _ => None,
            };
            report(session.suggest(strategy), |s| {
                println!("Suggestion ({}): {} (path {})", s.strategy, s.name, s.path)
            });
        }
        "S" => match args.first() {
            Some(node) => report(session.solve(node), |outcome| match outcome {
                aograph::SolveOutcome::GraphComplete => {
                    println!("[REPORT] The graph is solved (head node solved).")
                }
                aograph::SolveOutcome::Solved { updates } => {
                    println!("Updated paths:");
                    for update in updates {
                        println!("Path index: {} - Benefit: {}", update.path, update.benefit);
                    }
                }
            }),
            None => println!("[ERROR] usage: S <node>"),
        },
        "C" => match args.as_slice() {
            [node, arc, cost] => match (arc.parse::<usize>(), cost.parse::<u32>()) {
                (Ok(arc), Ok(cost)) => report(session.update_arc_cost(node, arc, cost), |n| {
                    println!("Adjusted {} path positions", n)
                }),
                _ => println!("[ERROR] <arc> and <cost> must be non-negative integers"),
            },
            _ => println!("[ERROR] usage: C <node> <arc> <cost>"),
        },
        "D" => report(session.describe(), |snapshot| {
            if json {
                match serde_json::to_string_pretty(&snapshot) {
                    Ok(text) => println!("{}", text),
                    Err(e) => println!("[ERROR] {}", e),
                }
            } else {
                print!("{}", snapshot);
            }
        }),
        "R" => {
            session.reset();
            println!("Session reset");
        }
        "E" => return false,
        other => println!("[ERROR] unknown command '{}'", other),
    }
    true
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PlannerConfig::from_env();
    if let Some(strategy) = args.strategy {
        config.default_strategy = strategy;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .format_timestamp_millis()
        .init();

    println!("aograph {} - AND-OR graph navigation", aograph::VERSION);

    let mut session = Session::new(config);
    if let Some(file) = &args.file {
        report(session.load_file(file), |count| {
            println!("Loaded graph with {} paths", count)
        });
        report(session.suggest(None), |s| {
            println!("Suggestion ({}): {} (path {})", s.strategy, s.name, s.path)
        });
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print_commands();
        print!("Selected command: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        if !run_command(&mut session, &line?, args.json) {
            break;
        }
    }

    Ok(())
}
