use crate::core::analytics::AnalyticsConfig;
use crate::core::loader::LoaderOptions;
use crate::core::validator::ValidationConfig;
use crate::domain::model::RawTable;
use crate::domain::report::SalesReport;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn loader_options(&self) -> Result<LoaderOptions>;
    fn validation_config(&self) -> ValidationConfig;
    fn analytics_config(&self) -> AnalyticsConfig;
    fn sample_size(&self) -> usize;
    fn max_file_size(&self) -> usize;
    fn allowed_extensions(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn pretty_output(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawTable>;
    async fn transform(&self, table: RawTable) -> Result<SalesReport>;
    async fn load(&self, report: SalesReport) -> Result<String>;
}
