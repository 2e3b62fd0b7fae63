use arcadia::command::{AddScore, Command, DeleteItem, InsertItem};
use arcadia::Engine;
use clap::Parser;
use hdrhistogram::Histogram;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::error::Error;
use std::time::{Duration, Instant};

/// Per-operation latency percentiles for the leaderboard and auction index.
#[derive(Parser, Debug)]
#[command(name = "latency-report")]
struct Args {
    /// Measured operations per kind
    #[arg(short, long, default_value_t = 200_000)]
    iterations: u64,

    /// Seed for both the workload and the leaderboard levels
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Distinct player / item ids
    #[arg(short = 'k', long, default_value_t = 10_000)]
    keys: i64,

    /// Entries fetched per top-N query
    #[arg(long, default_value_t = 10)]
    top: usize,
}

struct Recorder {
    name: &'static str,
    histogram: Histogram<u64>,
    total: Duration,
    ops: u64,
}

impl Recorder {
    fn new(name: &'static str) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            name,
            histogram: Histogram::<u64>::new_with_bounds(1, 100_000, 3)?,
            total: Duration::ZERO,
            ops: 0,
        })
    }

    #[inline]
    fn time<T>(&mut self, op: impl FnOnce() -> T) -> T {
        // Critical measurement section
        let start = Instant::now();
        let out = std::hint::black_box(op());
        let elapsed = start.elapsed();

        // Outliers past the upper bound are dropped
        self.histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        self.total += elapsed;
        self.ops += 1;
        out
    }

    fn report(&self) {
        let h = &self.histogram;
        println!("\n=== {} (ns) ===", self.name);
        println!("Total Ops:  {}", self.ops);
        println!(
            "Throughput: {:.2} ops/sec",
            self.ops as f64 / self.total.as_secs_f64().max(f64::EPSILON)
        );
        println!("---------------------------");
        println!("Min:    {:6} ns", h.min());
        println!("P50:    {:6} ns", h.value_at_quantile(0.50));
        println!("P90:    {:6} ns", h.value_at_quantile(0.90));
        println!("P99:    {:6} ns", h.value_at_quantile(0.99));
        println!("P99.9:  {:6} ns", h.value_at_quantile(0.999));
        println!("P99.99: {:6} ns", h.value_at_quantile(0.9999));
        println!("Max:    {:6} ns", h.max());
        println!("---------------------------");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    println!("Preparing Latency Benchmark...");

    let mut engine = Engine::with_seed(args.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let keys = args.keys.max(1);

    // Warm-up: populate both structures so measurements see a full index
    for id in 0..keys {
        engine.process_command(Command::AddScore(AddScore {
            player_id: id,
            delta: rng.gen_range(0..1_000_000),
        }));
        engine.process_command(Command::InsertItem(InsertItem {
            item_id: id,
            price: rng.gen_range(1..100_000),
        }));
    }

    let mut add_score = Recorder::new("add_score")?;
    let mut top_n = Recorder::new("top_n")?;
    let mut insert_item = Recorder::new("insert_item")?;
    let mut delete_item = Recorder::new("delete_item")?;

    println!("Running {} iterations per operation...", args.iterations);

    for _ in 0..args.iterations {
        let cmd = Command::AddScore(AddScore {
            player_id: rng.gen_range(0..keys),
            delta: rng.gen_range(-1_000..10_000),
        });
        add_score.time(|| engine.process_command(cmd));

        top_n.time(|| engine.leaderboard.top_n(args.top));

        let item_id = rng.gen_range(0..keys);
        let cmd = Command::DeleteItem(DeleteItem { item_id });
        delete_item.time(|| engine.process_command(cmd));

        let cmd = Command::InsertItem(InsertItem {
            item_id,
            price: rng.gen_range(1..100_000),
        });
        insert_item.time(|| engine.process_command(cmd));
    }

    for recorder in [&add_score, &top_n, &insert_item, &delete_item] {
        recorder.report();
    }

    // Quick ASCII histogram of the slowest structure operation
    println!("\nDistribution ({}):", insert_item.name);
    for v in insert_item.histogram.iter_log(100, 2.0) {
        let count = v.count_since_last_iteration();
        if count > 0 {
            println!("<= {:6} ns: {:10} count", v.value_iterated_to(), count);
        }
    }

    println!(
        "\nFinal sizes: {} players, {} items, tree height {}",
        engine.leaderboard.len(),
        engine.auction.len(),
        engine.auction.height()
    );
    Ok(())
}
