use crate::core::analytics::AnalyticsEngine;
use crate::core::loader::TableLoader;
use crate::core::profile::quick_stats;
use crate::core::validator::Validator;
use crate::core::{ConfigProvider, Pipeline, RawTable, Storage};
use crate::domain::report::{
    AnalyzeResponse, QuickStatsResponse, ReportMode, SalesReport, ValidateResponse,
};
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::check_file_extension;
use std::path::Path;

/// Reads one uploaded file through `Storage`, builds the requested report and writes it back as JSON.
pub struct SalesPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    input: String,
    mode: ReportMode,
}

impl<S: Storage, C: ConfigProvider> SalesPipeline<S, C> {
    pub fn new(storage: S, config: C, input: impl Into<String>, mode: ReportMode) -> Self {
        Self {
            storage,
            config,
            input: input.into(),
            mode,
        }
    }

    fn filename(&self) -> String {
        Path::new(&self.input)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.input)
            .to_string()
    }

    fn output_name(&self, mode: ReportMode) -> String {
        let stem = Path::new(&self.input)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("report");
        format!("{}_{}.json", stem, mode.as_str())
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SalesPipeline<S, C> {
    async fn extract(&self) -> Result<RawTable> {
        let filename = self.filename();
        check_file_extension(&filename, self.config.allowed_extensions())?;

        tracing::debug!("Reading input file: {}", self.input);
        let bytes = self.storage.read_file(&self.input).await?;

        let limit = self.config.max_file_size();
        if bytes.len() > limit {
            return Err(AnalyticsError::FileTooLarge {
                size: bytes.len(),
                limit,
            });
        }

        TableLoader::new(self.config.loader_options()?).load(&bytes)
    }

    async fn transform(&self, table: RawTable) -> Result<SalesReport> {
        let filename = self.filename();

        let report = match self.mode {
            ReportMode::QuickStats => SalesReport::QuickStats(QuickStatsResponse {
                filename,
                stats: quick_stats(&table, self.config.sample_size()),
                timestamp: timestamp(),
            }),
            ReportMode::Validate => {
                let validation = Validator::new(self.config.validation_config()).validate(&table);
                tracing::info!(
                    "Validation for {}: valid={}, {} errors, {} warnings",
                    filename,
                    validation.valid,
                    validation.errors.len(),
                    validation.warnings.len()
                );
                SalesReport::Validation(ValidateResponse {
                    filename,
                    validation,
                    timestamp: timestamp(),
                })
            }
            ReportMode::Analyze => {
                let validation = Validator::new(self.config.validation_config()).validate(&table);
                if !validation.valid {
                    tracing::warn!(
                        "{} failed validation ({}); analytics cover usable rows only",
                        filename,
                        validation.errors.join("; ")
                    );
                }
                let analytics = AnalyticsEngine::new(self.config.analytics_config()).analyze(&table);
                tracing::info!(
                    "Analytics for {}: {} orders, revenue {:.2}",
                    filename,
                    analytics.total_orders,
                    analytics.total_revenue
                );
                SalesReport::Analysis(AnalyzeResponse {
                    filename,
                    validation,
                    analytics,
                    timestamp: timestamp(),
                })
            }
        };

        Ok(report)
    }

    async fn load(&self, report: SalesReport) -> Result<String> {
        let name = self.output_name(report.mode());
        let body = if self.config.pretty_output() {
            serde_json::to_vec_pretty(&report)?
        } else {
            serde_json::to_vec(&report)?
        };

        tracing::debug!("Writing {} ({} bytes) to storage", name, body.len());
        self.storage.write_file(&name, &body).await?;

        Ok(format!("{}/{}", self.config.output_path(), name))
    }
}
