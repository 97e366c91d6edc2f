use std::time::{Duration, Instant};

/// 経過時間の計測に使う単調時計。テストでは偽の時計に差し替える。
pub trait Clock {
    // 任意の基準点からの経過時間
    fn now(&self) -> Duration;
}

// 実時間の単調時計 (システム時刻の変更の影響を受けない)
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

// ミリ秒 (小数) に変換する
pub fn duration_ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1e6
}

#[test]
fn test_monotonic_clock_never_goes_back() {
    let clock = MonotonicClock::new();
    let mut prev = clock.now();
    for _ in 0..1000 {
        let t = clock.now();
        assert!(t >= prev);
        prev = t;
    }
}

#[test]
fn test_duration_ms() {
    assert_eq!(duration_ms(Duration::from_micros(1500)), 1.5);
    assert_eq!(duration_ms(Duration::ZERO), 0.0);
}
