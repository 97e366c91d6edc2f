use std::convert::Infallible;

use anyhow::{Context, Result};
use clap::Parser;
use harness::pointwise::estimated_precision_bits;
use harness::{format_vector, generate_random_vector, init_tracing, BenchArgs, Profiler, Report};
use tfhe::shortint::prelude::*;

const DEFAULT_RUNS: u32 = 2;
const DEFAULT_CIPHERTEXTS: usize = 8;
// PARAM_MESSAGE_2_CARRY_2 のメッセージは 2 ビット
const MESSAGE_MODULUS: u64 = 4;

#[derive(Parser)]
#[command(name = "bench_boots")]
#[command(about = "Bootstrapping benchmark", long_about = None)]
struct Cli {
    #[command(flatten)]
    bench: BenchArgs,

    /// Number of leading inputs to encrypt and bootstrap (one ciphertext each)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CIPHERTEXTS)]
    ciphertexts: usize,
}

// 整数部をメッセージ空間に落とす
fn quantize(x: f64) -> u64 {
    (x.floor() as u64) % MESSAGE_MODULUS
}

fn as_f64(messages: &[u64]) -> Vec<f64> {
    messages.iter().map(|&m| m as f64).collect()
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let runs = cli.bench.runs_or(DEFAULT_RUNS);
    let show = cli.bench.show;

    let x1 = generate_random_vector(cli.bench.batch_size, cli.bench.seed);
    // 暗号文 1 つに 1 要素なので、ブートストラップするのは先頭 ciphertexts 個だけ
    let n = cli.ciphertexts.min(x1.len());
    let messages: Vec<u64> = x1[..n].iter().map(|&x| quantize(x)).collect();

    tracing::info!("note: this benchmark runs single-threaded");
    tracing::info!(ciphertexts = n, message_modulus = MESSAGE_MODULUS, "generating shortint keys");
    let (client_key, server_key) = gen_keys(PARAM_MESSAGE_2_CARRY_2_KS_PBS);
    // 恒等関数のルックアップテーブルで PBS するとノイズだけがリセットされる
    let identity = server_key.generate_lookup_table(|m| m);

    println!("{}", format_vector("Input x1", &x1, show));
    let cts: Vec<Ciphertext> = messages.iter().map(|&m| client_key.encrypt(m)).collect();

    let profiler = Profiler::new();
    let mut report = Report::new();
    let bootstrapped = report
        .profile(&profiler, "Bootstrap", runs, || {
            Ok::<_, Infallible>(cts.iter().map(|ct| server_key.apply_lookup_table(ct, &identity)).collect::<Vec<_>>())
        })?
        .context("Bootstrap produced no result")?;

    let before: Vec<u64> = cts.iter().map(|ct| client_key.decrypt(ct)).collect();
    let after: Vec<u64> = bootstrapped.iter().map(|ct| client_key.decrypt(ct)).collect();
    let (before, after) = (as_f64(&before), as_f64(&after));

    println!();
    println!("Results of homomorphic computations:");
    println!("{}", format_vector("x1 (mod 4)", &before, show));
    println!("{}", format_vector("Bootstrapped x1", &after, show));
    println!("Estimated precision in bits: {:.1}", estimated_precision_bits(&before, &after)?);

    print!("{}", report);
    Ok(())
}

#[test]
fn test_quantize() {
    assert_eq!(quantize(0.1), 0);
    assert_eq!(quantize(3.99), 3);
    assert_eq!(quantize(4.5), 0);
}

#[test]
fn test_quantized_inputs_fit_message_space() {
    for x in generate_random_vector(1000, 42) {
        assert!(quantize(x) < MESSAGE_MODULUS);
    }
}

#[test]
fn test_ciphertexts_flag_is_separate_from_show() {
    let cli = Cli::try_parse_from(["bench_boots", "--show", "0"]).unwrap();
    assert_eq!(cli.bench.show, 0);
    assert_eq!(cli.ciphertexts, DEFAULT_CIPHERTEXTS);
    let cli = Cli::try_parse_from(["bench_boots", "-c", "3"]).unwrap();
    assert_eq!(cli.ciphertexts, 3);
    assert_eq!(cli.bench.show, 8);
}

// 復号結果が一致すれば精度は無限大、1 ずれれば 0 ビット
#[test]
fn test_precision_of_decrypted_messages() {
    let before = as_f64(&[0, 1, 2, 3]);
    assert_eq!(estimated_precision_bits(&before, &as_f64(&[0, 1, 2, 3])).unwrap(), f64::INFINITY);
    assert_eq!(estimated_precision_bits(&before, &as_f64(&[0, 1, 3, 3])).unwrap(), 0.0);
}
