use clap::Args;

// 各ベンチマークで共通のコマンドライン引数
#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Number of timed invocations per operation [default depends on the benchmark]
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub runs: Option<u32>,

    /// Seed for the input vectors
    #[arg(short, long, default_value_t = 42)]
    pub seed: u64,

    /// Length of the input vectors
    #[arg(short, long, default_value_t = 1 << 15)]
    pub batch_size: usize,

    /// Number of leading elements to print per vector (0 = all)
    #[arg(long, default_value_t = 8)]
    pub show: usize,
}

impl BenchArgs {
    pub fn runs_or(&self, default: u32) -> u32 {
        self.runs.unwrap_or(default)
    }
}

#[cfg(test)]
use clap::Parser;

#[cfg(test)]
#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    bench: BenchArgs,
}

#[test]
fn test_defaults() {
    let cli = TestCli::try_parse_from(["bench"]).unwrap();
    assert_eq!(cli.bench.runs_or(100), 100);
    assert_eq!(cli.bench.seed, 42);
    assert_eq!(cli.bench.batch_size, 32768);
    assert_eq!(cli.bench.show, 8);
}

#[test]
fn test_overrides() {
    let cli = TestCli::try_parse_from(["bench", "-n", "5", "--seed", "7", "-b", "16"]).unwrap();
    assert_eq!(cli.bench.runs_or(100), 5);
    assert_eq!(cli.bench.seed, 7);
    assert_eq!(cli.bench.batch_size, 16);
}

#[test]
fn test_zero_runs_rejected() {
    assert!(TestCli::try_parse_from(["bench", "--runs", "0"]).is_err());
}
