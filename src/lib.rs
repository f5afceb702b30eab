pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::SalesPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::analytics::{analyze, AnalyticsConfig, AnalyticsEngine};
pub use crate::core::engine::ReportEngine;
pub use crate::core::loader::{load_table, Delimiter, Encoding, LoaderOptions, TableLoader};
pub use crate::core::profile::quick_stats;
pub use crate::core::validator::{validate, ValidationConfig, Validator};
pub use domain::model::{RawRecord, RawTable, SalesRow};
pub use domain::report::{AnalyticsResult, QuickStats, ReportMode, SalesReport, ValidationReport};
pub use utils::error::{AnalyticsError, Result};
