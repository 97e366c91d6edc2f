use std::fmt::{self, Write};

use crate::clock::Clock;
use crate::profiler::{ProfileRecord, Profiler};

const NAME_WIDTH: usize = 25;
const FIRST_WIDTH: usize = 15;
const AVG_WIDTH: usize = 25;
const OVERHEAD_WIDTH: usize = 20;
const RULE_WIDTH: usize = NAME_WIDTH + FIRST_WIDTH + AVG_WIDTH + OVERHEAD_WIDTH;

// 計測結果を追加した順に保持する
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    records: Vec<ProfileRecord>,
}

impl Report {
    pub fn new() -> Self {
        Report { records: Vec::new() }
    }

    pub fn push(&mut self, record: ProfileRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ProfileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 計測して結果をレポートに追加し、最後の呼び出しの値を返す。
    pub fn profile<C, T, E, F>(
        &mut self,
        profiler: &Profiler<C>,
        name: impl Into<String>,
        num_runs: u32,
        op: F,
    ) -> Result<Option<T>, E>
    where
        C: Clock,
        F: FnMut() -> Result<T, E>,
    {
        let (record, output) = profiler.profile(name, num_runs, op)?.into_parts();
        self.push(record);
        Ok(output)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    fn write_table<W: Write>(&self, w: &mut W) -> fmt::Result {
        writeln!(w)?;
        writeln!(w, "============ Performance Profiling Results ============")?;
        writeln!(
            w,
            "{:<NAME_WIDTH$}{:>FIRST_WIDTH$}{:>AVG_WIDTH$}{:>OVERHEAD_WIDTH$}",
            "Operation", "First Run (ms)", "Avg (excl. first) (ms)", "Overhead (ms)"
        )?;
        writeln!(w, "{}", "-".repeat(RULE_WIDTH))?;
        for r in &self.records {
            writeln!(
                w,
                "{:<NAME_WIDTH$}{:>FIRST_WIDTH$.3}{:>AVG_WIDTH$.3}{:>OVERHEAD_WIDTH$.3}",
                r.name(),
                r.first_run_time(),
                r.steady_state_average(),
                r.overhead()
            )?;
        }
        writeln!(w, "{}", "-".repeat(RULE_WIDTH))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_table(f)
    }
}

#[cfg(test)]
fn sample_report() -> Report {
    let mut report = Report::new();
    report.push(ProfileRecord::new("EvalAdd", 1.5, 0.25));
    report.push(ProfileRecord::new("EvalRotate (1)", 2.0, 2.5));
    report
}

#[test]
fn test_render_empty() {
    let rule = "-".repeat(85);
    let expected = format!(
        "\n============ Performance Profiling Results ============\n\
         Operation                 First Run (ms)   Avg (excl. first) (ms)       Overhead (ms)\n\
         {rule}\n{rule}\n"
    );
    assert_eq!(Report::new().render(), expected);
}

#[test]
fn test_render_rows() {
    let out = sample_report().render();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(
        lines[4],
        "EvalAdd                            1.500                    0.250               1.250"
    );
    // 負の値はそのまま表示する
    assert_eq!(
        lines[5],
        "EvalRotate (1)                     2.000                    2.500              -0.500"
    );
    for line in &lines[2..] {
        assert_eq!(line.len(), 85);
    }
}

#[test]
fn test_render_is_idempotent() {
    let report = sample_report();
    assert_eq!(report.render(), report.render());
    assert_eq!(report.to_string(), report.render());
}

#[test]
fn test_insertion_order() {
    let report = sample_report();
    let names: Vec<&str> = report.records().iter().map(|r| r.name()).collect();
    assert_eq!(names, ["EvalAdd", "EvalRotate (1)"]);
}

#[test]
fn test_report_profile_appends() {
    let mut report = Report::new();
    let profiler = Profiler::new();
    let out = report
        .profile(&profiler, "a", 2, || Ok::<_, std::convert::Infallible>(1))
        .unwrap();
    assert_eq!(out, Some(1));
    let err = report.profile(&profiler, "b", 2, || Err::<(), _>("boom"));
    assert_eq!(err, Err("boom"));
    // 失敗した計測は追加されない
    assert_eq!(report.len(), 1);
    assert_eq!(report.records()[0].name(), "a");
}
