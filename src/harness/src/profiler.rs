use crate::clock::{duration_ms, Clock, MonotonicClock};

/// 一つの操作の計測結果。
///
/// `steady_state_average` は 2 回目以降の平均で、実行回数が 1 以下なら 0 になる。
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    name: String,
    first_run_time: f64,
    steady_state_average: f64,
}

impl ProfileRecord {
    pub fn new(name: impl Into<String>, first_run_time: f64, steady_state_average: f64) -> Self {
        ProfileRecord { name: name.into(), first_run_time, steady_state_average }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn first_run_time(&self) -> f64 {
        self.first_run_time
    }

    pub fn steady_state_average(&self) -> f64 {
        self.steady_state_average
    }

    // 初回だけにかかる余分なコスト 負になることもある
    pub fn overhead(&self) -> f64 {
        self.first_run_time - self.steady_state_average
    }
}

/// 計測結果と、最後の呼び出しが返した値。
#[derive(Debug)]
pub struct Profiled<T> {
    record: ProfileRecord,
    output: Option<T>,
}

impl<T> Profiled<T> {
    pub fn record(&self) -> &ProfileRecord {
        &self.record
    }

    // num_runs が 0 のときだけ None
    pub fn output(&self) -> Option<&T> {
        self.output.as_ref()
    }

    pub fn into_parts(self) -> (ProfileRecord, Option<T>) {
        (self.record, self.output)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Profiler<C = MonotonicClock> {
    clock: C,
}

impl Profiler {
    pub fn new() -> Self {
        Profiler { clock: MonotonicClock::new() }
    }
}

impl<C: Clock> Profiler<C> {
    pub fn with_clock(clock: C) -> Self {
        Profiler { clock }
    }

    /// `op` をちょうど `num_runs` 回、逐次に呼んで計測する。
    ///
    /// `op` がエラーを返すとその時点で打ち切り、エラーをそのまま返す。
    pub fn profile<T, E, F>(&self, name: impl Into<String>, num_runs: u32, mut op: F) -> Result<Profiled<T>, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let name = name.into();
        let mut first_run_time = 0.0;
        let mut steady_sum = 0.0;
        let mut output = None;
        for i in 0..num_runs {
            let start = self.clock.now();
            let result = op()?;
            let elapsed = duration_ms(self.clock.now().saturating_sub(start));
            if i == 0 {
                first_run_time = elapsed;
            } else {
                steady_sum += elapsed;
            }
            // 前回の結果はここで捨てる (計測区間の外)
            output = Some(result);
        }
        let steady_state_average = if num_runs > 1 { steady_sum / (num_runs - 1) as f64 } else { 0.0 };
        let record = ProfileRecord::new(name, first_run_time, steady_state_average);
        tracing::debug!(
            name = record.name(),
            runs = num_runs,
            first_ms = record.first_run_time(),
            avg_ms = record.steady_state_average(),
            "profiled operation"
        );
        Ok(Profiled { record, output })
    }
}

// 実時間の時計で計測する
pub fn profile<T, E, F>(name: impl Into<String>, num_runs: u32, op: F) -> Result<Profiled<T>, E>
where
    F: FnMut() -> Result<T, E>,
{
    Profiler::new().profile(name, num_runs, op)
}

#[cfg(test)]
use std::cell::Cell;
#[cfg(test)]
use std::convert::Infallible;
#[cfg(test)]
use std::time::Duration;

// テスト用の時計 advance した分だけ進む
#[cfg(test)]
#[derive(Default)]
struct FakeClock {
    now: Cell<Duration>,
}

#[cfg(test)]
impl FakeClock {
    fn advance(&self, d: Duration) {
        self.now.set(self.now.get() + d);
    }
}

#[cfg(test)]
impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[test]
fn test_zero_runs_never_invokes() {
    let mut calls = 0;
    let p = profile("x", 0, || {
        calls += 1;
        Ok::<_, Infallible>(calls)
    })
    .unwrap();
    assert_eq!(calls, 0);
    assert_eq!(*p.record(), ProfileRecord::new("x", 0.0, 0.0));
    assert!(p.output().is_none());
}

#[test]
fn test_single_run() {
    let clock = FakeClock::default();
    let profiler = Profiler::with_clock(&clock);
    let mut calls = 0;
    let p = profiler
        .profile("x", 1, || {
            calls += 1;
            clock.advance(Duration::from_millis(7));
            Ok::<_, Infallible>(calls)
        })
        .unwrap();
    assert_eq!(calls, 1);
    assert_eq!(p.record().first_run_time(), 7.0);
    assert_eq!(p.record().steady_state_average(), 0.0);
    assert_eq!(p.into_parts().1, Some(1));
}

#[test]
fn test_first_run_and_steady_state() {
    let clock = FakeClock::default();
    let profiler = Profiler::with_clock(&clock);
    let durations = [10, 20, 30];
    let mut i = 0;
    let p = profiler
        .profile("x", 3, || {
            clock.advance(Duration::from_millis(durations[i]));
            i += 1;
            Ok::<_, Infallible>(i)
        })
        .unwrap();
    assert_eq!(p.record().name(), "x");
    assert_eq!(p.record().first_run_time(), 10.0);
    assert_eq!(p.record().steady_state_average(), 25.0);
    assert_eq!(p.record().overhead(), -15.0);
    // 最後の呼び出しの結果が返る
    assert_eq!(p.output(), Some(&3));
}

#[test]
fn test_error_aborts_pass() {
    let mut calls = 0;
    let r = profile("x", 10, || {
        calls += 1;
        if calls == 3 { Err("exhausted depth") } else { Ok(calls) }
    });
    assert_eq!(r.unwrap_err(), "exhausted depth");
    assert_eq!(calls, 3);
}

#[test]
fn test_time_between_runs_is_not_counted() {
    let clock = FakeClock::default();
    let profiler = Profiler::with_clock(&clock);
    let p = profiler
        .profile("x", 2, || {
            clock.advance(Duration::from_millis(4));
            Ok::<_, Infallible>(())
        })
        .unwrap();
    clock.advance(Duration::from_secs(1));
    assert_eq!(p.record().first_run_time(), 4.0);
    assert_eq!(p.record().steady_state_average(), 4.0);
}
