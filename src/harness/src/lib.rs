pub mod args;
pub mod clock;
pub mod display;
pub mod error;
pub mod logging;
pub mod pointwise;
pub mod profiler;
pub mod report;
pub mod vecgen;

pub use args::BenchArgs;
pub use clock::{Clock, MonotonicClock};
pub use display::format_vector;
pub use error::{HarnessError, Result};
pub use logging::init_tracing;
pub use profiler::{profile, ProfileRecord, Profiled, Profiler};
pub use report::Report;
pub use vecgen::generate_random_vector;
