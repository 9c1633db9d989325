#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod filter;
pub mod metrics;
pub mod processor;
pub mod rate_limit;
pub mod record;
pub mod runner;
pub mod sink;
pub mod summary;

pub use analysis::{run_analysis, AnalysisConfig, AnalysisError, AnalysisOutcome, AnalysisReport};
pub use config::{load_settings, parse_settings, ConfigError, Settings};
pub use discovery::{list_repositories, DiscoveryError, RepositoryDescriptor};
pub use filter::{evaluate, FilterDecision};
pub use metrics::{aggregate, ClassMetricRow, MetricFamily, MetricsSummary};
pub use processor::{ProcessError, RepositoryProcessor};
pub use rate_limit::{
    check_search_rate_limit, ensure_search_rate_limit, wait_if_needed, RateLimitInfo,
};
pub use record::RepositorySummary;
pub use runner::{process_repositories, resolve_token, Runner, RunnerConfig, RunnerError};
pub use sink::{read_summaries, write_dataset, ResultsSink, SinkError};
pub use summary::{ProcessingResult, RunSummary};
