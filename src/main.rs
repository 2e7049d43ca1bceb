use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sched_model::{
    QuantumExpiry, SchedConfig, SchedCore, Scheme, Sim,
    sim::{BernoulliWorkload, load_trace},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QuantumMode {
    Rotate,
    Ignore,
}

/// Discrete-event multi-core CPU scheduling model.
///
/// Reads a job trace (or generates a random workload), runs it through the
/// chosen scheme and prints the average waiting, turnaround and response times.
#[derive(Parser, Debug)]
#[command(name = "sched_model")]
struct Args {
    /// Job trace: one `arrival duration priority` per line
    trace: Option<PathBuf>,

    /// Number of cores
    #[arg(short, long, env = "SCHED_CORES", default_value = "1")]
    cores: usize,

    /// Scheme: fcfs, sjf, psjf, pri, ppri or rr
    #[arg(short, long, env = "SCHED_SCHEME", default_value = "fcfs", value_parser = parse_scheme)]
    scheme: Scheme,

    /// Round-robin time slice in ticks
    #[arg(short, long, env = "SCHED_QUANTUM")]
    quantum: Option<u64>,

    /// What a quantum expiry does under round-robin
    #[arg(long, value_enum, default_value = "rotate")]
    quantum_mode: QuantumMode,

    /// Ticks of random arrivals when no trace is given
    #[arg(long, default_value = "500")]
    ticks: u64,

    /// Per-tick arrival probability
    #[arg(long, default_value = "0.3")]
    p_arrival: f64,

    /// Probability that an arriving job is short
    #[arg(long, default_value = "0.3")]
    p_short: f64,

    #[arg(long, default_value = "2")]
    short_ticks: u64,

    #[arg(long, default_value = "6")]
    long_ticks: u64,

    /// Priorities are drawn from 0..levels
    #[arg(long, default_value = "4")]
    priority_levels: i32,

    #[arg(long, default_value = "0")]
    seed: u64,

    /// Print the queue after every event
    #[arg(long)]
    show_queue: bool,

    /// Print scheduling decisions as they happen
    #[arg(long)]
    events: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_scheme(s: &str) -> Result<Scheme, String> {
    s.parse().map_err(|err: sched_model::SchedError| err.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let jobs = match &args.trace {
        Some(path) => load_trace(path)
            .with_context(|| format!("failed to load trace {}", path.display()))?,
        None => BernoulliWorkload {
            ticks: args.ticks,
            p_arrival: args.p_arrival,
            p_short: args.p_short,
            short_ticks: args.short_ticks,
            long_ticks: args.long_ticks,
            priority_levels: args.priority_levels,
            seed: args.seed,
        }
        .generate(),
    };

    let config = SchedConfig {
        quantum_expiry: match args.quantum_mode {
            QuantumMode::Rotate => QuantumExpiry::Rotate,
            QuantumMode::Ignore => QuantumExpiry::Ignore,
        },
    };
    let core = SchedCore::with_config(args.cores, args.scheme, config)
        .context("failed to start scheduler")?;
    let mut sim = Sim::new(jobs, core, args.quantum);

    while let Some(step) = sim.step().context("simulation step failed")? {
        if args.events {
            println!("t={} {:?}", step.time, step.event);
            for decision in &step.decisions {
                println!("t={}   {:?}", step.time, decision);
            }
        }
        if args.show_queue {
            println!("t={} queue: {}", step.time, sim.core.queue_snapshot());
        }
    }

    let report = sim.report().context("run produced no statistics")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Scheme: {} on {} core(s)", report.scheme, report.cores);
        println!("Jobs: {}", report.stats.jobs);
        println!(
            "Average waiting time: {:.2} ticks",
            report.stats.average_waiting_time
        );
        println!(
            "Average turnaround time: {:.2} ticks",
            report.stats.average_turnaround_time
        );
        println!(
            "Average response time: {:.2} ticks",
            report.stats.average_response_time
        );
        println!("Preemptions: {}", report.preemptions);
        println!("Longest response time: {} ticks", report.max_response_time);
        println!("Makespan: {} ticks", report.makespan);
    }

    sim.core.shutdown();
    Ok(())
}
