use crate::domain::model::RawRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationStats {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub missing_value_counts: BTreeMap<String, usize>,
    pub numeric_column_ranges: BTreeMap<String, NumericRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub(crate) fn including(range: Option<Self>, value: f64) -> Self {
        match range {
            Some(r) => Self {
                min: r.min.min(value),
                max: r.max.max(value),
            },
            None => Self {
                min: value,
                max: value,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsResult {
    pub total_revenue: f64,
    pub total_quantity: f64,
    pub total_orders: usize,
    /// Raw rows seen before exclusion.
    pub rows_considered: usize,
    pub average_order_value: f64,
    pub top_products_by_revenue: Vec<ProductTotal>,
    pub top_products_by_quantity: Vec<ProductTotal>,
    pub customer_segments: CustomerSegments,
    pub time_analysis: TimeAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotal {
    pub product: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerSegments {
    pub high_value: Segment,
    pub medium_value: Segment,
    pub low_value: Segment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segment {
    pub customer_count: usize,
    pub total_revenue: f64,
    pub customers: Vec<CustomerRevenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRevenue {
    pub customer: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeAnalysis {
    pub daily_revenue: Vec<PeriodRevenue>,
    pub monthly_revenue: Vec<PeriodRevenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRevenue {
    pub period: String,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Date,
    Text,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub column: String,
    pub data_type: ColumnType,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickStats {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub data_types: Vec<ColumnProfile>,
    pub sample_data: Vec<RawRecord>,
    pub file_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Validate,
    Analyze,
    QuickStats,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Analyze => "analyze",
            Self::QuickStats => "quick_stats",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    pub filename: String,
    pub validation: ValidationReport,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub filename: String,
    pub validation: ValidationReport,
    pub analytics: AnalyticsResult,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickStatsResponse {
    pub filename: String,
    pub stats: QuickStats,
    pub timestamp: String,
}

/// Whatever the requested mode produced, ready to be written out.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SalesReport {
    Validation(ValidateResponse),
    Analysis(AnalyzeResponse),
    QuickStats(QuickStatsResponse),
}

impl SalesReport {
    pub fn mode(&self) -> ReportMode {
        match self {
            Self::Validation(_) => ReportMode::Validate,
            Self::Analysis(_) => ReportMode::Analyze,
            Self::QuickStats(_) => ReportMode::QuickStats,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            Self::Validation(r) => &r.filename,
            Self::Analysis(r) => &r.filename,
            Self::QuickStats(r) => &r.filename,
        }
    }
}
