pub mod adapters;
pub mod aggregator;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod services;
pub mod source;

pub use aggregator::{AgentAggregator, AggregatorSettings, MatchPager};
pub use config::AppConfig;
pub use coordination::{GracefulShutdown, ShutdownListener};
pub use domain::{AgentStats, AggregationResult, PlayerIdentity, PlayerReport, RankSnapshot};
pub use error::{Result, StatsError};
pub use services::{ReportPipeline, PipelineRun};
