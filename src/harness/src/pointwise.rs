use num_traits::Float;

use crate::error::{HarnessError, Result};

fn check_len<T>(a: &[T], b: &[T]) -> Result<()> {
    if a.len() != b.len() {
        return Err(HarnessError::LengthMismatch { left: a.len(), right: b.len() });
    }
    Ok(())
}

fn zip_with<T: Float>(a: &[T], b: &[T], f: impl Fn(T, T) -> T) -> Result<Vec<T>> {
    check_len(a, b)?;
    Ok(a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
}

pub fn add<T: Float>(a: &[T], b: &[T]) -> Result<Vec<T>> {
    zip_with(a, b, |x, y| x + y)
}

pub fn subtract<T: Float>(a: &[T], b: &[T]) -> Result<Vec<T>> {
    zip_with(a, b, |x, y| x - y)
}

pub fn multiply<T: Float>(a: &[T], b: &[T]) -> Result<Vec<T>> {
    zip_with(a, b, |x, y| x * y)
}

pub fn scalar_multiply<T: Float>(a: &[T], k: T) -> Vec<T> {
    a.iter().map(|&x| x * k).collect()
}

// 復号結果の精度を -log2(最大絶対誤差) で見積もる
// 完全に一致する場合は無限大になる
pub fn estimated_precision_bits<T: Float>(expected: &[T], actual: &[T]) -> Result<f64> {
    check_len(expected, actual)?;
    let max_err = expected
        .iter()
        .zip(actual)
        .map(|(&e, &a)| (e - a).abs().to_f64().unwrap_or(f64::NAN))
        .fold(0.0, f64::max);
    Ok(-max_err.log2())
}

#[test]
fn test_add() {
    assert_eq!(add(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), Ok(vec![5.0, 7.0, 9.0]));
}

#[test]
fn test_subtract() {
    assert_eq!(subtract(&[5.0, 5.0], &[2.0, 3.0]), Ok(vec![3.0, 2.0]));
}

#[test]
fn test_multiply() {
    assert_eq!(multiply(&[2.0, 3.0], &[4.0, 5.0]), Ok(vec![8.0, 15.0]));
}

#[test]
fn test_scalar_multiply() {
    assert_eq!(scalar_multiply(&[1.0, 2.0, 3.0], 4.0), vec![4.0, 8.0, 12.0]);
    assert!(scalar_multiply::<f64>(&[], 4.0).is_empty());
}

#[test]
fn test_length_mismatch() {
    let err = HarnessError::LengthMismatch { left: 2, right: 3 };
    assert_eq!(add(&[1.0, 2.0], &[1.0, 2.0, 3.0]), Err(err.clone()));
    assert_eq!(subtract(&[1.0, 2.0], &[1.0, 2.0, 3.0]), Err(err.clone()));
    assert_eq!(multiply(&[1.0, 2.0], &[1.0, 2.0, 3.0]), Err(err));
}

#[test]
fn test_empty_operands() {
    assert_eq!(add::<f64>(&[], &[]), Ok(vec![]));
}

// NaN や Inf は IEEE-754 のまま伝播する
#[test]
fn test_ieee_propagation() {
    let r = add(&[f64::NAN, f64::INFINITY], &[1.0, 1.0]).unwrap();
    assert!(r[0].is_nan());
    assert_eq!(r[1], f64::INFINITY);
}

#[test]
fn test_precision_bits() {
    let bits = estimated_precision_bits(&[1.0, 2.0], &[1.0, 2.0 + 1.0 / 1024.0]).unwrap();
    assert_eq!(bits, 10.0);
    assert_eq!(estimated_precision_bits(&[1.0f32], &[1.0]).unwrap(), f64::INFINITY);
    assert!(estimated_precision_bits(&[1.0], &[1.0, 2.0]).is_err());
}
