use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

// RUST_LOG が未設定か読めなければ info
fn filter_from(directives: Option<String>) -> EnvFilter {
    directives
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

// 標準出力はレポート用なのでログは標準エラーへ
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
use tracing_subscriber::filter::LevelFilter;

#[test]
fn test_filter_defaults_to_info() {
    assert_eq!(filter_from(None).max_level_hint(), Some(LevelFilter::INFO));
    assert_eq!(filter_from(Some(String::new())).max_level_hint(), Some(LevelFilter::INFO));
}

// RUST_LOG の指定がそのまま効く (profiler の debug イベントも出せる)
#[test]
fn test_filter_follows_directives() {
    assert_eq!(filter_from(Some("debug".into())).max_level_hint(), Some(LevelFilter::DEBUG));
    assert_eq!(filter_from(Some("warn".into())).max_level_hint(), Some(LevelFilter::WARN));
}

#[test]
fn test_filter_ignores_invalid_directives() {
    assert_eq!(filter_from(Some("harness=loud".into())).max_level_hint(), Some(LevelFilter::INFO));
}
