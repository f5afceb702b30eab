use crate::core::analytics::AnalyticsConfig;
use crate::core::loader::{Delimiter, Encoding, LoaderOptions};
use crate::core::profile::DEFAULT_SAMPLE_SIZE;
use crate::core::validator::ValidationConfig;
use crate::core::ConfigProvider;
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub input: InputConfig,
    pub loader: LoaderConfig,
    pub validation: ValidationConfig,
    pub analytics: AnalyticsConfig,
    pub quick_stats: QuickStatsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec!["csv".to_string(), "tsv".to_string(), "txt".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// `"auto"`, `"tab"` or a single character.
    pub delimiter: String,
    pub encoding: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: "auto".to_string(),
            encoding: "utf-8".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickStatsConfig {
    pub sample_size: usize,
}

impl Default for QuickStatsConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            pretty: true,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalyticsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AnalyticsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AnalyticsError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_positive_number("input.max_file_size", self.input.max_file_size, 1)?;
        validation::validate_extensions_list(
            "input.allowed_extensions",
            &self.input.allowed_extensions,
        )?;
        validation::validate_positive_number("analytics.top_n", self.analytics.top_n, 1)?;
        validation::validate_range(
            "analytics.high_value_quantile",
            self.analytics.high_value_quantile,
            0.0,
            1.0,
        )?;
        validation::validate_range(
            "analytics.medium_value_quantile",
            self.analytics.medium_value_quantile,
            0.0,
            1.0,
        )?;
        if self.analytics.medium_value_quantile > self.analytics.high_value_quantile {
            return Err(AnalyticsError::ConfigValidationError {
                field: "analytics.medium_value_quantile".to_string(),
                message: "must not exceed analytics.high_value_quantile".to_string(),
            });
        }

        self.loader_options()?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn loader_options(&self) -> Result<LoaderOptions> {
        Ok(LoaderOptions {
            delimiter: self.loader.delimiter.parse::<Delimiter>()?,
            encoding: self.loader.encoding.parse::<Encoding>()?,
        })
    }

    fn validation_config(&self) -> ValidationConfig {
        self.validation.clone()
    }

    fn analytics_config(&self) -> AnalyticsConfig {
        self.analytics.clone()
    }

    fn sample_size(&self) -> usize {
        self.quick_stats.sample_size
    }

    fn max_file_size(&self) -> usize {
        self.input.max_file_size
    }

    fn allowed_extensions(&self) -> &[String] {
        &self.input.allowed_extensions
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn pretty_output(&self) -> bool {
        self.output.pretty
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.analytics.top_n, 5);
        assert_eq!(config.validation.min_rows, 10);
        assert_eq!(config.max_file_size(), DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.loader_options().unwrap(), LoaderOptions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[input]
max_file_size = 2048
allowed_extensions = ["csv"]

[loader]
delimiter = ";"
encoding = "latin-1"

[validation]
min_rows = 3

[analytics]
top_n = 10
high_value_quantile = 0.9
medium_value_quantile = 0.6

[quick_stats]
sample_size = 2

[output]
output_path = "./reports"
pretty = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.max_file_size(), 2048);
        assert_eq!(
            config.loader_options().unwrap(),
            LoaderOptions {
                delimiter: Delimiter::Byte(b';'),
                encoding: Encoding::Latin1,
            }
        );
        assert_eq!(config.validation_config().min_rows, 3);
        assert_eq!(config.analytics_config().top_n, 10);
        assert_eq!(config.sample_size(), 2);
        assert_eq!(config.output_path(), "./reports");
        assert!(!config.pretty_output());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str("[analytics]\ntop_n = 3\n").unwrap();
        assert_eq!(config.analytics.top_n, 3);
        assert_eq!(config.analytics.high_value_quantile, 0.8);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SALES_TEST_OUTPUT_DIR", "/tmp/sales-reports");

        let toml_content = r#"
[output]
output_path = "${SALES_TEST_OUTPUT_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output.output_path, "/tmp/sales-reports");

        std::env::remove_var("SALES_TEST_OUTPUT_DIR");
    }

    #[test]
    fn test_config_validation() {
        let inverted = TomlConfig::from_toml_str(
            "[analytics]\nhigh_value_quantile = 0.4\nmedium_value_quantile = 0.6\n",
        )
        .unwrap();
        assert!(inverted.validate().is_err());

        let zero_top_n = TomlConfig::from_toml_str("[analytics]\ntop_n = 0\n").unwrap();
        assert!(zero_top_n.validate().is_err());

        let bad_encoding = TomlConfig::from_toml_str("[loader]\nencoding = \"utf-16\"\n").unwrap();
        assert!(bad_encoding.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[analytics\n").unwrap_err();
        assert!(matches!(err, AnalyticsError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[quick_stats]\nsample_size = 7\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.sample_size(), 7);
    }
}
