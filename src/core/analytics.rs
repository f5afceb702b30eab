use crate::core::coerce::coerce_row;
use crate::domain::model::{RawTable, SalesRow};
use crate::domain::report::{
    AnalyticsResult, CustomerRevenue, CustomerSegments, PeriodRevenue, ProductTotal, Segment,
    TimeAnalysis,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Length of each ranked product list.
    pub top_n: usize,
    /// Customers at or above this quantile of per-customer revenue are `high_value`.
    pub high_value_quantile: f64,
    /// Customers at or above this quantile (and below high) are `medium_value`.
    pub medium_value_quantile: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            high_value_quantile: 0.8,
            medium_value_quantile: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Computes aggregates over every row that coerces into a `SalesRow`.
    ///
    /// Rows that fail coercion are dropped without a trace here; the validator
    /// is the component that explains them.
    pub fn analyze(&self, table: &RawTable) -> AnalyticsResult {
        let mut rows: Vec<SalesRow> = table
            .rows()
            .iter()
            .filter_map(|record| coerce_row(record).ok())
            .collect();

        tracing::debug!(
            "Analytics: {} of {} rows usable",
            rows.len(),
            table.row_count()
        );

        // 固定排序後再加總，浮點結果與輸入順序無關
        rows.sort_by(canonical_order);

        let total_orders = rows.len();
        let total_revenue: f64 = rows.iter().map(|r| r.revenue).sum();
        let total_quantity: f64 = rows.iter().map(|r| r.quantity).sum();
        let average_order_value = if total_orders > 0 {
            total_revenue / total_orders as f64
        } else {
            0.0
        };

        let mut by_product: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
        let mut by_customer: BTreeMap<&str, f64> = BTreeMap::new();
        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();

        for row in &rows {
            let product = by_product.entry(row.product.as_str()).or_default();
            product.0 += row.revenue;
            product.1 += row.quantity;
            *by_customer.entry(row.customer.as_str()).or_default() += row.revenue;
            *by_day.entry(row.date).or_default() += row.revenue;
            *by_month
                .entry((row.date.year(), row.date.month()))
                .or_default() += row.revenue;
        }

        let top_products_by_revenue = top_n(
            by_product.iter().map(|(p, (revenue, _))| (*p, *revenue)),
            self.config.top_n,
        );
        let top_products_by_quantity = top_n(
            by_product.iter().map(|(p, (_, quantity))| (*p, *quantity)),
            self.config.top_n,
        );

        let time_analysis = TimeAnalysis {
            daily_revenue: by_day
                .into_iter()
                .map(|(day, total_revenue)| PeriodRevenue {
                    period: day.format("%Y-%m-%d").to_string(),
                    total_revenue,
                })
                .collect(),
            monthly_revenue: by_month
                .into_iter()
                .map(|((year, month), total_revenue)| PeriodRevenue {
                    period: format!("{:04}-{:02}", year, month),
                    total_revenue,
                })
                .collect(),
        };

        AnalyticsResult {
            total_revenue,
            total_quantity,
            total_orders,
            rows_considered: table.row_count(),
            average_order_value,
            top_products_by_revenue,
            top_products_by_quantity,
            customer_segments: self.segment_customers(&by_customer),
            time_analysis,
        }
    }

    fn segment_customers(&self, by_customer: &BTreeMap<&str, f64>) -> CustomerSegments {
        if by_customer.is_empty() {
            return CustomerSegments::default();
        }

        let mut distribution: Vec<f64> = by_customer.values().copied().collect();
        distribution.sort_by(f64::total_cmp);
        let high = quantile(&distribution, self.config.high_value_quantile);
        let medium = quantile(&distribution, self.config.medium_value_quantile);

        let mut ranked: Vec<CustomerRevenue> = by_customer
            .iter()
            .map(|(customer, revenue)| CustomerRevenue {
                customer: customer.to_string(),
                revenue: *revenue,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.revenue
                .total_cmp(&a.revenue)
                .then_with(|| a.customer.cmp(&b.customer))
        });

        let mut segments = CustomerSegments::default();
        for entry in ranked {
            let segment = if entry.revenue >= high {
                &mut segments.high_value
            } else if entry.revenue >= medium {
                &mut segments.medium_value
            } else {
                &mut segments.low_value
            };
            segment.push(entry);
        }
        segments
    }
}

pub fn analyze(table: &RawTable) -> AnalyticsResult {
    AnalyticsEngine::default().analyze(table)
}

impl Segment {
    fn push(&mut self, entry: CustomerRevenue) {
        self.customer_count += 1;
        self.total_revenue += entry.revenue;
        self.customers.push(entry);
    }
}

fn canonical_order(a: &SalesRow, b: &SalesRow) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.product.cmp(&b.product))
        .then_with(|| a.customer.cmp(&b.customer))
        .then_with(|| a.quantity.total_cmp(&b.quantity))
        .then_with(|| a.price.total_cmp(&b.price))
}

/// Highest `n` totals, ties broken by product name ascending.
fn top_n<'a>(totals: impl Iterator<Item = (&'a str, f64)>, n: usize) -> Vec<ProductTotal> {
    let mut ranked: Vec<ProductTotal> = totals
        .map(|(product, value)| ProductTotal {
            product: product.to_string(),
            value,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.product.cmp(&b.product))
    });
    ranked.truncate(n);
    ranked
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
