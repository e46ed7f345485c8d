//! swath - coverage flight planning from the command line
//!
//! Usage:
//!   swath plan <mission.yaml|field.svg> [options]   Plan a coverage route
//!   swath classify <mission.yaml|field.svg>         Describe a field
//!   swath benchmark <mission.yaml|field.svg>        Time every planning mode
//!   swath modes                                     List planning modes

mod cli;

use std::env;

use swath::{DetourKind, Metric, OrderingStrategy, PlanMode, RotationKind};

use cli::{cmd_benchmark, cmd_classify, cmd_plan, init_logging, verbosity};

fn main() {
    let args: Vec<String> = env::args().collect();

    if let Some(level) = verbosity(&args) {
        init_logging(level);
    }

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "plan" => cmd_plan(&args[2..]),
        "classify" => cmd_classify(&args[2..]),
        "benchmark" => cmd_benchmark(&args[2..]),
        "modes" => {
            cmd_modes();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage(&args[0]);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_usage(&args[0]);
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn cmd_modes() {
    println!("Available modes:");
    for mode in PlanMode::all() {
        println!("  {:<15} {}", mode.name(), mode.description());
    }

    let names = |list: Vec<&str>| list.join(", ");
    println!();
    println!("Metrics:     {}", names(Metric::all().iter().map(|m| m.name()).collect()));
    println!("Rotations:   {}", names(RotationKind::all().iter().map(|r| r.name()).collect()));
    println!("Orders:      {}", names(OrderingStrategy::all().iter().map(|o| o.name()).collect()));
    println!("Detours:     {}", names(DetourKind::all().iter().map(|d| d.name()).collect()));
}

fn print_usage(prog: &str) {
    eprintln!("swath - boustrophedon coverage planning for lat/lng fields");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} plan <mission.yaml|field.svg> [options]", prog);
    eprintln!("  {} classify <mission.yaml|field.svg> [options]", prog);
    eprintln!("  {} benchmark <mission.yaml|field.svg> [-n <iterations>]", prog);
    eprintln!("  {} modes", prog);
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  -v, --verbose          Debug logging to stderr (-vv for trace)");
    eprintln!("  -h, --help             Command help");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} plan paddock.yaml -s 15 -a 30 -f svg -o route.svg", prog);
    eprintln!("  {} plan field.svg --origin 44.48,-73.213 --zoom 18", prog);
    eprintln!("  {} plan --example > mission.yaml", prog);
}
