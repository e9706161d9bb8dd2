use std::ops::Range;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use os::{loader, logger, Machine, MachineConfig};
use types::Addr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Load a list of programs into partitioned memory and run them round-robin.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Program list: one `<size> <path>` entry per line
    #[arg(default_value = "program_list.txt")]
    program_list: PathBuf,

    /// JSON machine config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Words of physical memory
    #[arg(long)]
    memory_size: Option<usize>,

    /// Cycles per time slice
    #[arg(long)]
    quantum: Option<u64>,

    /// Stop after this many cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Physical address to report after the run (repeatable)
    #[arg(long = "probe")]
    probes: Vec<Addr>,

    /// Dump physical memory START..END after the run
    #[arg(long, value_parser = parse_range)]
    dump: Option<Range<usize>>,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_range(text: &str) -> Result<Range<usize>> {
    let (start, end) = text
        .split_once("..")
        .with_context(|| format!("expected START..END, got '{text}'"))?;
    let start = start.trim().parse().context("bad range start")?;
    let end = end.trim().parse().context("bad range end")?;
    anyhow::ensure!(start <= end, "range start {start} is past end {end}");
    Ok(start..end)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    logger::init(logger::level_for(args.verbose, args.quiet))?;

    let mut config = match &args.config {
        Some(path) => MachineConfig::from_file(path)?,
        None => MachineConfig::default(),
    };
    if let Some(size) = args.memory_size {
        config.memory_size = size;
    }
    if let Some(quantum) = args.quantum {
        config.quantum = quantum;
    }
    if let Some(max) = args.max_cycles {
        config.max_cycles = max;
    }
    if !args.probes.is_empty() {
        config.probes = args.probes.clone();
    }

    let entries = loader::read_program_list(&args.program_list)?;
    if entries.is_empty() {
        anyhow::bail!("program list {:?} has no entries", args.program_list);
    }

    let mut machine = Machine::new(&config);
    for entry in &entries {
        let image = match loader::read_program(&entry.path) {
            Ok(image) => image,
            Err(e) => {
                log::error!("skipping {}: {:#}", entry.path.display(), e);
                continue;
            }
        };
        match machine.spawn(&image, entry.size) {
            Ok(pid) => log::info!("loaded {} as PID {}", entry.path.display(), pid),
            Err(e) => log::error!("skipping {}: {}", entry.path.display(), e),
        }
    }

    let report = machine.run(config.max_cycles);

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => {
            println!("{}", "Multiprogramming Simulator".bold().blue());
            println!("{}", "==========================".blue());
            print!("{report}");
            if let Some(range) = &args.dump {
                println!("{}", "Memory dump:".bold());
                print!("{}", machine.store.dump(range.start, range.end));
            }
        }
    }
    Ok(())
}
