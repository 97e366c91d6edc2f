use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    // 要素ごとの二項演算で長さが一致しない
    #[error("vectors must have the same size ({left} != {right})")]
    LengthMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, HarnessError>;
