use anyhow::{Context, Result};
use clap::Parser;
use harness::pointwise::{add, multiply, scalar_multiply, subtract};
use harness::{format_vector, generate_random_vector, init_tracing, BenchArgs, HarnessError, Profiler, Report};

const DEFAULT_RUNS: u32 = 1000;
const SCALAR: f64 = 4.0;

#[derive(Parser)]
#[command(name = "bench_add_mul_unencrypted")]
#[command(about = "Unencrypted baseline for the add/mul benchmark", long_about = None)]
struct Cli {
    #[command(flatten)]
    bench: BenchArgs,
}

// 計測してレポートに追加し、最後の呼び出しの結果を返す
fn measure<T, F>(report: &mut Report, profiler: &Profiler, name: &str, runs: u32, op: F) -> Result<T>
where
    F: FnMut() -> harness::Result<T>,
{
    report.profile(profiler, name, runs, op)?.with_context(|| format!("{name} produced no result"))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let runs = cli.bench.runs_or(DEFAULT_RUNS);
    let show = cli.bench.show;
    tracing::info!(runs, batch_size = cli.bench.batch_size, seed = cli.bench.seed, "unencrypted baseline");

    // 暗号化版と同じく x1, x2 は同じシードから作る
    let x1 = generate_random_vector(cli.bench.batch_size, cli.bench.seed);
    let x2 = generate_random_vector(cli.bench.batch_size, cli.bench.seed);

    let profiler = Profiler::new();
    let mut report = Report::new();
    let sum = measure(&mut report, &profiler, "Add UnEnc", runs, || add(&x1, &x2))?;
    let diff = measure(&mut report, &profiler, "Sub UnEnc", runs, || subtract(&x1, &x2))?;
    let scaled = measure(&mut report, &profiler, "Mult Scalar UnEnc", runs, || {
        Ok::<_, HarnessError>(scalar_multiply(&x1, SCALAR))
    })?;
    let prod = measure(&mut report, &profiler, "Mult UnEnc", runs, || multiply(&x1, &x2))?;

    println!("{}", format_vector("x1", &x1, show));
    println!("{}", format_vector("x2", &x2, show));
    println!();
    println!("Results of unencrypted computations:");
    for (label, v) in [("x1 + x2", sum), ("x1 - x2", diff), ("4 * x1", scaled), ("x1 * x2", prod)] {
        println!("{}", format_vector(label, &v, show));
    }

    print!("{}", report);
    Ok(())
}

#[test]
fn test_measure_returns_last_result() {
    let mut report = Report::new();
    let mut calls = 0;
    let v = measure(&mut report, &Profiler::new(), "Add UnEnc", 3, || {
        calls += 1;
        add(&[calls as f64], &[1.0])
    })
    .unwrap();
    assert_eq!(v, vec![4.0]);
    assert_eq!(report.len(), 1);
}

// 結果が無ければ黙って飛ばさずにエラーにする
#[test]
fn test_measure_without_runs_is_an_error() {
    let mut report = Report::new();
    let err = measure(&mut report, &Profiler::new(), "Add UnEnc", 0, || add(&[1.0], &[1.0])).unwrap_err();
    assert!(err.to_string().contains("Add UnEnc produced no result"));
}

#[test]
fn test_measure_propagates_length_mismatch() {
    let mut report = Report::new();
    let err = measure(&mut report, &Profiler::new(), "Add UnEnc", 2, || add(&[1.0], &[1.0, 2.0])).unwrap_err();
    assert!(err.downcast_ref::<HarnessError>().is_some());
    assert!(report.is_empty());
}
