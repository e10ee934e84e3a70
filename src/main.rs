use clap::Parser;
use curve25519_dalek::scalar::Scalar;
use rand::Rng;
use std::time::{Duration, Instant};

use mulopen::randutil::random_scalar;
use mulopen::{Session, SessionConfig};

/// Multiply-then-open benchmark: n simulated players share two operands,
/// multiply, prove, and open the product.
#[derive(Parser, Debug)]
#[command(name = "mulopen", version, about)]
struct Args {
    /// Repetitions per experiment
    #[arg(long, default_value_t = 10)]
    reps: usize,
    /// Player count; random in [5, 20) when omitted
    #[arg(long)]
    players: Option<usize>,
    /// Threshold; random in [1, n/2 - 1] when omitted
    #[arg(long)]
    threshold: Option<usize>,
    /// Number of experiments with freshly drawn parameters
    #[arg(long, default_value_t = 1)]
    experiments: usize,
}

#[derive(Default, Clone, Debug)]
struct Timings {
    total: Duration,
    setup: Duration,
    run: Duration,
}

fn add(a: &mut Duration, b: Duration) { *a += b; }

fn avg(d: Duration, n: usize) -> Duration {
    if n == 0 { d } else { Duration::from_nanos((d.as_nanos() / n as u128) as u64) }
}

fn random_parameters(args: &Args) -> (usize, usize) {
    let mut rng = rand::rng();
    let n = args.players.unwrap_or_else(|| rng.random_range(5..20));
    let k = args
        .threshold
        .unwrap_or_else(|| rng.random_range(1..=(n / 2).saturating_sub(1).max(1)));
    (n, k)
}

fn run_once(n: usize, k: usize) -> anyhow::Result<(Timings, bool)> {
    let total_start = Instant::now();
    let mut tm = Timings::default();

    let secrets_a: Vec<Scalar> = (0..n).map(|_| random_scalar()).collect();
    let secrets_b: Vec<Scalar> = (0..n).map(|_| random_scalar()).collect();
    let expected = secrets_a.iter().sum::<Scalar>() * secrets_b.iter().sum::<Scalar>();

    let t = Instant::now();
    let mut session = Session::new(&SessionConfig::new(n, k), &secrets_a, &secrets_b)?;
    tm.setup = t.elapsed();

    let t = Instant::now();
    let report = session.run()?;
    tm.run = t.elapsed();

    for failure in &report.failures {
        tracing::error!(%failure, "session failure");
    }
    let ok = report.is_success() && report.opened_value()? == expected;

    tm.total = total_start.elapsed();
    Ok((tm, ok))
}

fn run_exp(n: usize, k: usize, reps: usize) -> anyhow::Result<()> {
    let mut sum = Timings::default();
    let mut ok = true;

    for _ in 0..reps {
        let (tm, good) = run_once(n, k)?;
        ok &= good;
        add(&mut sum.total, tm.total);
        add(&mut sum.setup, tm.setup);
        add(&mut sum.run, tm.run);
    }

    println!(
        "RESULT,n={},k={},reps={},ok={},total_ms={:.3},setup_ms={:.3},run_ms={:.3}",
        n, k, reps, ok,
        avg(sum.total, reps).as_secs_f64() * 1e3,
        avg(sum.setup, reps).as_secs_f64() * 1e3,
        avg(sum.run, reps).as_secs_f64() * 1e3,
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    for _ in 0..args.experiments {
        let (n, k) = random_parameters(&args);
        run_exp(n, k, args.reps)?;
    }
    Ok(())
}
