use std::{hint::black_box, time::Instant};

use anyhow::Context;
use chaindeque::Deque;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Drives a deque through a fixed workload, for use under a profiler.
#[derive(Parser, Debug)]
#[command(name = "chaindeque")]
struct Args {
    #[arg(long, value_enum, default_value_t = Workload::Fifo)]
    workload: Workload,

    /// Elements pushed per round.
    #[arg(long, default_value_t = 4096)]
    len: usize,

    #[arg(long, default_value_t = 1000)]
    rounds: usize,

    /// Bound for the `ring` workload (defaults to half of --len).
    #[arg(long)]
    capacity: Option<usize>,

    /// Print the rendering of the deque left after the last round.
    #[arg(long)]
    render: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Workload {
    /// append then pop_left everything
    Fifo,
    /// append then pop everything
    Lifo,
    /// append into a bounded deque, evicting on overflow
    Ring,
    /// rotate a full deque back and forth
    Rotate,
    /// get/set across the whole deque
    RandomAccess,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!(workload = ?args.workload, len = args.len, rounds = args.rounds, "starting");

    let start = Instant::now();
    let dq = run(&args)?;
    let elapsed = start.elapsed();

    tracing::info!(elapsed = ?elapsed, remaining = dq.len(), "finished");
    if args.render {
        println!("{dq}");
    }
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<Deque<usize>> {
    let mut dq = match args.workload {
        Workload::Ring => {
            let capacity = args.capacity.unwrap_or(args.len / 2);
            Deque::bounded(capacity).context("invalid --capacity")?
        }
        _ => Deque::new(),
    };

    for round in 0..args.rounds {
        match args.workload {
            Workload::Fifo => {
                dq.extend(0..args.len);
                while let Ok(v) = dq.pop_left() {
                    black_box(v);
                }
            }
            Workload::Lifo => {
                dq.extend(0..args.len);
                while let Ok(v) = dq.pop() {
                    black_box(v);
                }
            }
            Workload::Ring => {
                dq.extend(black_box(0..args.len));
            }
            Workload::Rotate => {
                if round == 0 {
                    dq.extend(0..args.len);
                }
                let n = isize::try_from(round % args.len.max(1)).context("rotation too large")?;
                dq.rotate(n);
                dq.rotate(-n);
            }
            Workload::RandomAccess => {
                if round == 0 {
                    dq.extend(0..args.len);
                }
                for i in 0..dq.len() {
                    let v = *dq.get(i)?;
                    dq.set(i, v.wrapping_add(1))?;
                }
            }
        }
    }
    Ok(dq)
}
