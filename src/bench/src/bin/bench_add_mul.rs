use anyhow::{ensure, Context, Result};
use clap::Parser;
use fhe::bfv::{
    BfvParameters, BfvParametersBuilder, Ciphertext, Encoding, EvaluationKey, EvaluationKeyBuilder, Plaintext,
    PublicKey, RelinearizationKey, SecretKey,
};
use fhe_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
use harness::pointwise::{add, estimated_precision_bits, multiply, scalar_multiply, subtract};
use harness::vecgen::RANGE_HIGH;
use harness::{format_vector, generate_random_vector, init_tracing, BenchArgs, Profiler, Report};
use rand::{thread_rng, CryptoRng, RngCore};

const DEFAULT_RUNS: u32 = 100;
// 3 * 2^18 + 1 (素数) なので n <= 2^17 まで SIMD 符号化が使える
const PLAINTEXT_MODULUS: u64 = 786433;
const MIN_DEGREE: usize = 2048;
const MAX_DEGREE: usize = 1 << 17;
const ROTATIONS: [i64; 2] = [1, -2];
const SCALAR: i64 = 4;

#[derive(Parser)]
#[command(name = "bench_add_mul")]
#[command(about = "Homomorphic add/sub/mult/relinearize/rotate benchmark", long_about = None)]
struct Cli {
    #[command(flatten)]
    bench: BenchArgs,

    /// Fixed-point scale applied to the real inputs before packing
    #[arg(long, default_value_t = 100.0)]
    scale: f64,

    /// Bit sizes of the ciphertext moduli
    #[arg(long, value_delimiter = ',', default_values_t = [62, 62, 62])]
    moduli_bits: Vec<usize>,
}

// 実数を scale 倍して整数に丸め、平文空間に載せる
#[derive(Debug, Clone, Copy)]
struct FixedPoint {
    scale: f64,
}

impl FixedPoint {
    fn new(scale: f64) -> Result<Self> {
        ensure!(scale >= 1.0, "scale must be at least 1 (got {scale})");
        // 暗号文同士の積 (スケール 2 乗) が [-t/2, t/2) に収まる必要がある
        let bound = (RANGE_HIGH * scale).powi(2);
        ensure!(
            bound < (PLAINTEXT_MODULUS / 2) as f64,
            "scale {scale} overflows the plaintext modulus {PLAINTEXT_MODULUS} after one multiplication"
        );
        Ok(FixedPoint { scale })
    }

    fn encode(&self, values: &[f64]) -> Vec<i64> {
        values.iter().map(|v| (v * self.scale).round() as i64).collect()
    }

    // depth 回スケールが掛かった値を実数に戻す 先頭 len 個だけ
    fn decode(&self, values: &[i64], depth: i32, len: usize) -> Vec<f64> {
        let s = self.scale.powi(depth);
        values.iter().take(len).map(|&v| v as f64 / s).collect()
    }
}

fn ring_degree(batch_size: usize) -> Result<usize> {
    let degree = batch_size.next_power_of_two().max(MIN_DEGREE);
    ensure!(degree <= MAX_DEGREE, "batch size {batch_size} needs ring degree {degree} > {MAX_DEGREE}");
    Ok(degree)
}

// SIMD のスロットは 2 x (n/2) の行列に並ぶので、回転は各行の中で巡回する
fn column_steps(step: i64, degree: usize) -> usize {
    step.rem_euclid((degree / 2) as i64) as usize
}

fn build_parameters(degree: usize, moduli_bits: &[usize]) -> Result<std::sync::Arc<BfvParameters>> {
    BfvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(PLAINTEXT_MODULUS)
        .set_moduli_sizes(moduli_bits)
        .build_arc()
        .context("failed to build BFV parameters")
}

fn log_moduli_chain(params: &BfvParameters) {
    let mut total_bits = 0.0;
    for (i, q) in params.moduli().iter().enumerate() {
        let bits = (*q as f64).log2();
        total_bits += bits;
        tracing::info!("q_{i}: {q},  log q_{i}: {bits:.3}");
    }
    tracing::info!("total bit length: {total_bits:.3}");
}

fn rotation_keys<R: RngCore + CryptoRng>(sk: &SecretKey, degree: usize, rng: &mut R) -> Result<EvaluationKey> {
    let mut builder = EvaluationKeyBuilder::new(sk)?;
    for step in ROTATIONS {
        builder.enable_column_rotation(column_steps(step, degree))?;
    }
    Ok(builder.build(rng)?)
}

// 計測してレポートに追加し、最後の呼び出しの結果を返す
fn measure<T, F>(report: &mut Report, profiler: &Profiler, name: &str, runs: u32, op: F) -> Result<T>
where
    F: FnMut() -> fhe::Result<T>,
{
    report.profile(profiler, name, runs, op)?.with_context(|| format!("{name} produced no result"))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let runs = cli.bench.runs_or(DEFAULT_RUNS);
    let batch_size = cli.bench.batch_size;
    let show = cli.bench.show;

    let fixed = FixedPoint::new(cli.scale)?;
    let degree = ring_degree(batch_size)?;
    let params = build_parameters(degree, &cli.moduli_bits)?;

    tracing::info!("note: this benchmark runs single-threaded");
    tracing::info!(ring_dimension = params.degree(), plaintext_modulus = PLAINTEXT_MODULUS, "BFV scheme parameters");
    log_moduli_chain(&params);

    let mut rng = thread_rng();
    let sk = SecretKey::random(&params, &mut rng);
    let pk = PublicKey::new(&sk, &mut rng);
    let rk = RelinearizationKey::new(&sk, &mut rng)?;
    let ek = rotation_keys(&sk, degree, &mut rng)?;

    let x1 = generate_random_vector(batch_size, cli.bench.seed);
    let x2 = generate_random_vector(batch_size, cli.bench.seed);
    let m1 = fixed.encode(&x1);
    let m2 = fixed.encode(&x2);

    let profiler = Profiler::new();
    let mut report = Report::new();

    let pt1 = measure(&mut report, &profiler, "MakePackedPlaintext", runs, || {
        Plaintext::try_encode(m1.as_slice(), Encoding::simd(), &params)
    })?;
    let pt2 = Plaintext::try_encode(m2.as_slice(), Encoding::simd(), &params)?;
    println!("{}", format_vector("Input x1", &x1, show));
    println!("{}", format_vector("Input x2", &x2, show));

    let c1: Ciphertext = measure(&mut report, &profiler, "Encrypt", runs, || pk.try_encrypt(&pt1, &mut rng))?;
    let c2: Ciphertext = pk.try_encrypt(&pt2, &mut rng)?;

    let c_add = measure(&mut report, &profiler, "EvalAdd", runs, || Ok(&c1 + &c2))?;
    let c_sub = measure(&mut report, &profiler, "EvalSub", runs, || Ok(&c1 - &c2))?;

    let pt_scalar = Plaintext::try_encode(vec![SCALAR; degree].as_slice(), Encoding::simd(), &params)?;
    let c_scalar = measure(&mut report, &profiler, "EvalMult (scalar)", runs, || Ok(&c1 * &pt_scalar))?;

    let c_mul = measure(&mut report, &profiler, "EvalMult (ciphertext)", runs, || {
        let mut ct = &c1 * &c2;
        rk.relinearizes(&mut ct)?;
        Ok(ct)
    })?;
    let c_mul_no_relin = measure(&mut report, &profiler, "EvalMultNoRelin", runs, || Ok(&c1 * &c2))?;
    // relinearizes はその場で書き換えるので、毎回の複製も計測に含まれる
    let c_relin = measure(&mut report, &profiler, "Relinearize", runs, || {
        let mut ct = c_mul_no_relin.clone();
        rk.relinearizes(&mut ct)?;
        Ok(ct)
    })?;

    let c_rot1 = measure(&mut report, &profiler, "EvalRotate (1)", runs, || {
        ek.rotates_columns_by(&c1, column_steps(ROTATIONS[0], degree))
    })?;
    let c_rot2 = measure(&mut report, &profiler, "EvalRotate (-2)", runs, || {
        ek.rotates_columns_by(&c1, column_steps(ROTATIONS[1], degree))
    })?;

    let pt_c1 = measure(&mut report, &profiler, "Decrypt", runs, || sk.try_decrypt(&c1))?;

    let decode_pt = |pt: &Plaintext, depth: i32| -> Result<Vec<f64>> {
        let v = Vec::<i64>::try_decode(pt, Encoding::simd())?;
        Ok(fixed.decode(&v, depth, batch_size))
    };
    let decrypt = |ct: &Ciphertext, depth: i32| -> Result<Vec<f64>> { decode_pt(&sk.try_decrypt(ct)?, depth) };

    let expected = [
        ("x1", x1.clone(), decode_pt(&pt_c1, 1)?),
        ("x1 + x2", add(&x1, &x2)?, decrypt(&c_add, 1)?),
        ("x1 - x2", subtract(&x1, &x2)?, decrypt(&c_sub, 1)?),
        ("4 * x1", scalar_multiply(&x1, SCALAR as f64), decrypt(&c_scalar, 1)?),
        ("x1 * x2", multiply(&x1, &x2)?, decrypt(&c_mul, 2)?),
        ("x1 * x2 (relinearized)", multiply(&x1, &x2)?, decrypt(&c_relin, 2)?),
    ];

    println!();
    println!("Results of homomorphic computations:");
    for (label, want, got) in &expected {
        println!("{}", format_vector(label, got, show));
        println!("Estimated precision in bits: {:.1}", estimated_precision_bits(want, got)?);
    }

    println!();
    println!("Rotations act within each half of the slots:");
    println!("{}", format_vector("x1 rotate by 1", &decrypt(&c_rot1, 1)?, show));
    println!("{}", format_vector("x1 rotate by -2", &decrypt(&c_rot2, 1)?, show));

    print!("{}", report);
    Ok(())
}

#[test]
fn test_fixed_point_round_trip() {
    let fixed = FixedPoint::new(100.0).unwrap();
    let encoded = fixed.encode(&[0.1, 2.346, 4.999]);
    assert_eq!(encoded, vec![10, 235, 500]);
    assert_eq!(fixed.decode(&encoded, 1, 2), vec![0.1, 2.35]);
    assert_eq!(fixed.decode(&[250000], 2, 1), vec![25.0]);
}

#[test]
fn test_fixed_point_rejects_overflowing_scale() {
    assert!(FixedPoint::new(1000.0).is_err());
    assert!(FixedPoint::new(0.5).is_err());
}

#[test]
fn test_ring_degree() {
    assert_eq!(ring_degree(1 << 15).unwrap(), 1 << 15);
    assert_eq!(ring_degree(100).unwrap(), MIN_DEGREE);
    assert_eq!(ring_degree(5000).unwrap(), 8192);
    assert!(ring_degree(MAX_DEGREE + 1).is_err());
}

#[test]
fn test_column_steps() {
    assert_eq!(column_steps(1, 2048), 1);
    assert_eq!(column_steps(-2, 2048), 1022);
}

// 小さいパラメータで暗号化したまま加算とスカラー倍ができること
#[test]
fn test_encrypted_add_matches_baseline() {
    let mut rng = thread_rng();
    let params = build_parameters(MIN_DEGREE, &[62, 62]).unwrap();
    let sk = SecretKey::random(&params, &mut rng);
    let pk = PublicKey::new(&sk, &mut rng);
    let fixed = FixedPoint::new(100.0).unwrap();
    let x = generate_random_vector(16, 42);
    let pt = Plaintext::try_encode(fixed.encode(&x).as_slice(), Encoding::simd(), &params).unwrap();
    let c: Ciphertext = pk.try_encrypt(&pt, &mut rng).unwrap();

    let sum = sk.try_decrypt(&(&c + &c)).unwrap();
    let got = fixed.decode(&Vec::<i64>::try_decode(&sum, Encoding::simd()).unwrap(), 1, x.len());
    let want = add(&x, &x).unwrap();
    assert!(estimated_precision_bits(&want, &got).unwrap() > 5.0);
}
