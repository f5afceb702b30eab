pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use crate::domain::report::ReportMode;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sales-analytics")]
#[command(about = "Validate and analyze tabular sales datasets")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, global = true)]
    pub output_path: Option<String>,

    #[arg(long, global = true, help = "Field delimiter: auto, tab or a single character")]
    pub delimiter: Option<String>,

    #[arg(long, global = true)]
    pub encoding: Option<String>,

    #[arg(long, global = true)]
    pub top_n: Option<usize>,

    #[arg(long, global = true)]
    pub min_rows: Option<usize>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check structure and data quality
    Validate { file: String },
    /// Validate, then compute sales metrics
    Analyze { file: String },
    /// Shape, column types and a sample of rows
    QuickStats { file: String },
}

#[cfg(feature = "cli")]
impl Command {
    pub fn mode(&self) -> ReportMode {
        match self {
            Self::Validate { .. } => ReportMode::Validate,
            Self::Analyze { .. } => ReportMode::Analyze,
            Self::QuickStats { .. } => ReportMode::QuickStats,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            Self::Validate { file } | Self::Analyze { file } | Self::QuickStats { file } => file,
        }
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入 TOML（若有指定），再套用命令列覆蓋設定
    pub fn load_settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(output_path) = &self.output_path {
            settings.output.output_path = output_path.clone();
        }
        if let Some(delimiter) = &self.delimiter {
            settings.loader.delimiter = delimiter.clone();
        }
        if let Some(encoding) = &self.encoding {
            settings.loader.encoding = encoding.clone();
        }
        if let Some(top_n) = self.top_n {
            settings.analytics.top_n = top_n;
        }
        if let Some(min_rows) = self.min_rows {
            settings.validation.min_rows = min_rows;
        }

        Ok(settings)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand_and_overrides() {
        let cli = CliConfig::parse_from([
            "sales-analytics",
            "analyze",
            "sales.csv",
            "--top-n",
            "3",
            "--delimiter",
            ";",
        ]);
        assert_eq!(cli.command.mode(), ReportMode::Analyze);
        assert_eq!(cli.command.file(), "sales.csv");

        let settings = cli.load_settings().unwrap();
        assert_eq!(settings.analytics.top_n, 3);
        assert_eq!(settings.loader.delimiter, ";");
        assert_eq!(settings.output.output_path, "./output");
    }

    #[test]
    fn test_quick_stats_subcommand_name() {
        let cli = CliConfig::parse_from(["sales-analytics", "quick-stats", "data.csv"]);
        assert_eq!(cli.command.mode(), ReportMode::QuickStats);
    }
}
