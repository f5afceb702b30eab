use clap::Parser;
use sales_analytics::utils::error::ErrorSeverity;
use sales_analytics::utils::{logger, validation::Validate};
use sales_analytics::{AnalyticsError, CliConfig, LocalStorage, ReportEngine, SalesPipeline};

fn exit_with(e: &AnalyticsError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(logger::LogFormat::from_flag(cli.json_logs), cli.verbose);

    tracing::info!("🚀 Starting sales-analytics ({})", cli.command.mode().as_str());
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    // 輸入路徑轉為絕對路徑，讀寫共用同一個以輸出目錄為根的 storage
    let input = std::env::current_dir()?.join(cli.command.file());
    let input = input.to_string_lossy().into_owned();

    let storage = LocalStorage::new(settings.output.output_path.clone());
    let pipeline = SalesPipeline::new(storage, settings, input, cli.command.mode());
    let engine = ReportEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Report completed successfully!");
            println!("✅ Report completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}
