use rand::distributions::{Distribution, Uniform};
use rand_chacha::ChaChaRng;
use rand_chacha::rand_core::SeedableRng;

pub const RANGE_LOW: f64 = 0.1;
pub const RANGE_HIGH: f64 = 5.0;

// [0.1, 5.0) の一様乱数を size 個生成する
// 同じ (size, seed) からは常に同じ列が得られるので、暗号化の有無をまたいで同じ入力で比較できる
pub fn generate_random_vector(size: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let dist = Uniform::new(RANGE_LOW, RANGE_HIGH);
    (0..size).map(|_| dist.sample(&mut rng)).collect()
}

#[test]
fn test_generate_is_deterministic() {
    let a = generate_random_vector(1024, 42);
    let b = generate_random_vector(1024, 42);
    assert_eq!(a, b);
}

#[test]
fn test_generate_range() {
    for x in generate_random_vector(4096, 7) {
        assert!((RANGE_LOW..RANGE_HIGH).contains(&x));
    }
}

#[test]
fn test_generate_empty() {
    assert!(generate_random_vector(0, 42).is_empty());
}

#[test]
fn test_generate_seed_matters() {
    assert_ne!(generate_random_vector(16, 1), generate_random_vector(16, 2));
}

// 短い列は長い列の先頭と一致する
#[test]
fn test_generate_prefix() {
    let long = generate_random_vector(64, 42);
    let short = generate_random_vector(10, 42);
    assert_eq!(&long[..10], &short[..]);
}
