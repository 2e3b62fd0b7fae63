use arcadia::replay::{read_commands, write_records};
use arcadia::{Engine, Outcome};
use clap::{Parser, ValueEnum};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Snapshot {
    /// Top players, best first
    Leaderboard,
    /// Listed items, cheapest first
    Auction,
    /// No CSV, summary only
    Off,
}

/// Replay a CSV command log and print a snapshot of the final state.
#[derive(Parser, Debug)]
#[command(name = "replay")]
struct Args {
    /// Command log (`op,id,value`); reads stdin when omitted
    input: Option<PathBuf>,

    /// Seed for leaderboard level sampling
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Which structure to dump as CSV on stdout
    #[arg(long, value_enum, default_value_t = Snapshot::Leaderboard)]
    snapshot: Snapshot,

    /// Limit the snapshot to the first N rows
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Validate structural invariants after the replay
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let commands = match &args.input {
        Some(path) => read_commands(BufReader::new(File::open(path)?))?,
        None => read_commands(io::stdin().lock())?,
    };

    let mut engine = Engine::with_seed(args.seed);
    let mut applied = 0usize;
    let start = Instant::now();
    for cmd in &commands {
        if engine.process_command(*cmd) == Outcome::Applied {
            applied += 1;
        }
    }
    let elapsed = start.elapsed();

    let limit = args.top.unwrap_or(usize::MAX);
    let stdout = io::stdout().lock();
    match args.snapshot {
        Snapshot::Leaderboard => write_records(stdout, engine.leaderboard.iter().take(limit))?,
        Snapshot::Auction => write_records(stdout, engine.auction.iter().take(limit))?,
        Snapshot::Off => {}
    }

    eprintln!("=== Replay Summary ===");
    eprintln!("Commands:   {}", commands.len());
    eprintln!("Applied:    {}", applied);
    eprintln!("No-ops:     {}", commands.len() - applied);
    eprintln!("Players:    {}", engine.leaderboard.len());
    eprintln!("Items:      {}", engine.auction.len());
    eprintln!("Elapsed:    {:?}", elapsed);
    eprintln!("State hash: {:016x}", engine.state_hash());

    if args.validate {
        engine.leaderboard.validate()?;
        let black_height = engine.auction.validate()?;
        eprintln!("Invariants: ok (black height {})", black_height);
    }

    Ok(())
}
