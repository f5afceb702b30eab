use crate::core::Pipeline;
use crate::utils::error::Result;

/// Drives a pipeline through extract, transform and load.
pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting report run");

        let table = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} rows x {} columns",
            table.row_count(),
            table.column_count()
        );

        let report = self.pipeline.transform(table).await?;
        tracing::debug!("Built {} report for {}", report.mode().as_str(), report.filename());

        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Report saved to: {}", output_path);

        Ok(output_path)
    }
}
