use crate::core::coerce::{checked_revenue, is_blank, parse_date, parse_non_negative, parse_number};
use crate::domain::model::{RawTable, RowShape, NUMERIC_COLUMNS, REQUIRED_COLUMNS};
use crate::domain::report::{DateRange, NumericRange, ValidationReport, ValidationStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Below this many data rows the report carries a warning.
    pub min_rows: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { min_rows: 10 }
    }
}

/// Inspects a `RawTable` and reports defects without touching it.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, table: &RawTable) -> ValidationReport {
        let schema = table.schema();
        let row_count = table.row_count();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for column in REQUIRED_COLUMNS {
            if !table.has_column(column) {
                errors.push(format!("Missing required column: '{}'", column));
            }
        }

        if row_count == 0 {
            errors.push("Dataset is empty: no data rows found".to_string());
        } else if row_count < self.config.min_rows {
            warnings.push(format!(
                "Dataset has only {} rows; at least {} are recommended for reliable analytics",
                row_count, self.config.min_rows
            ));
        }

        for (index, row) in table.rows().iter().enumerate() {
            match row.shape() {
                RowShape::Complete => {}
                RowShape::Short { found } => warnings.push(format!(
                    "Row {}: expected {} fields but found {}; absent cells treated as missing",
                    index + 1,
                    schema.len(),
                    found
                )),
                RowShape::Long { found } => warnings.push(format!(
                    "Row {}: expected {} fields but found {}; extra fields ignored: '{}'",
                    index + 1,
                    schema.len(),
                    found,
                    row.overflow().join("', '")
                )),
            }
        }

        let mut missing_value_counts = BTreeMap::new();
        let mut numeric_column_ranges = BTreeMap::new();
        let mut date_range: Option<DateRange> = None;

        for (column_index, column) in schema.columns().iter().enumerate() {
            let role = schema.role_of(column_index);
            let mut missing = 0;
            let mut range: Option<NumericRange> = None;

            for (row_index, row) in table.rows().iter().enumerate() {
                let raw = row.value_at(column_index).unwrap_or("");
                let row_number = row_index + 1;

                if is_blank(raw) {
                    missing += 1;
                    if role.is_some() {
                        warnings.push(format!(
                            "Row {}: missing value in required column '{}'",
                            row_number, column
                        ));
                    }
                    continue;
                }

                match role {
                    Some(logical) if NUMERIC_COLUMNS.contains(&logical) => match parse_number(raw) {
                        Ok(value) => {
                            if value < 0.0 {
                                warnings.push(format!(
                                    "Row {}: negative value {} in column '{}'",
                                    row_number,
                                    raw.trim(),
                                    column
                                ));
                            }
                            range = Some(NumericRange::including(range, value));
                        }
                        Err(_) => warnings.push(format!(
                            "Row {}: non-numeric value '{}' in column '{}'",
                            row_number, raw, column
                        )),
                    },
                    Some("date") => match parse_date(raw) {
                        Ok(date) => {
                            date_range = Some(match date_range {
                                Some(r) => DateRange {
                                    min: r.min.min(date),
                                    max: r.max.max(date),
                                },
                                None => DateRange {
                                    min: date,
                                    max: date,
                                },
                            });
                        }
                        Err(_) => warnings.push(format!(
                            "Row {}: unparseable date '{}' in column '{}'",
                            row_number, raw, column
                        )),
                    },
                    _ => {}
                }
            }

            missing_value_counts.insert(column.clone(), missing);
            if let Some(range) = range {
                numeric_column_ranges.insert(column.clone(), range);
            }
        }

        // 兩個因子各自合法，乘積卻超出 f64 範圍
        for (index, row) in table.rows().iter().enumerate() {
            let (Some(quantity), Some(price)) = (row.get("quantity"), row.get("price")) else {
                continue;
            };
            if let (Ok(q), Ok(p)) = (parse_non_negative(quantity), parse_non_negative(price)) {
                if checked_revenue(q, p).is_err() {
                    warnings.push(format!(
                        "Row {}: revenue of quantity {} and price {} overflows; row excluded from analytics",
                        index + 1,
                        quantity.trim(),
                        price.trim()
                    ));
                }
            }
        }

        tracing::debug!(
            "Validation finished: {} errors, {} warnings over {} rows",
            errors.len(),
            warnings.len(),
            row_count
        );

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
            stats: ValidationStats {
                row_count,
                column_count: table.column_count(),
                columns: table.columns().to_vec(),
                missing_value_counts,
                numeric_column_ranges,
                date_range,
            },
        }
    }
}

pub fn validate(table: &RawTable) -> ValidationReport {
    Validator::default().validate(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::TableLoader;
    use chrono::NaiveDate;

    fn table(csv: &str) -> RawTable {
        TableLoader::default().load(csv.as_bytes()).unwrap()
    }

    fn lenient() -> Validator {
        Validator::new(ValidationConfig { min_rows: 1 })
    }

    #[test]
    fn test_clean_dataset_is_valid() {
        let report = lenient().validate(&table(
            "date,product,quantity,price,customer\n\
             2024-01-01,Widget A,5,10.50,Cust A\n\
             2024-01-02,Widget B,3,15.00,Cust B\n",
        ));
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.stats.row_count, 2);
        assert_eq!(report.stats.column_count, 5);
        assert_eq!(
            report.stats.numeric_column_ranges["price"],
            NumericRange { min: 10.5, max: 15.0 }
        );
        assert_eq!(
            report.stats.date_range,
            Some(DateRange {
                min: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                max: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            })
        );
    }

    #[test]
    fn test_each_missing_column_reported_once() {
        let report = lenient().validate(&table("date,quantity,customer\n2024-01-01,1,C\n"));
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Missing required column: 'product'".to_string(),
                "Missing required column: 'price'".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let report = validate(&table("date,product,quantity,price,customer\n"));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Dataset is empty: no data rows found".to_string()]);
        assert!(report.warnings.is_empty());
        assert!(report.stats.numeric_column_ranges.is_empty());
        assert_eq!(report.stats.date_range, None);
    }

    #[test]
    fn test_small_dataset_warns() {
        let report = validate(&table(
            "date,product,quantity,price,customer\n2024-01-01,W,1,1,C\n",
        ));
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Dataset has only 1 rows"));
    }

    #[test]
    fn test_non_numeric_quantity_is_warning() {
        let report = lenient().validate(&table(
            "date,product,quantity,price,customer\n\
             2024-01-01,W,5,1,C\n\
             2024-01-02,W,abc,1,C\n",
        ));
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec!["Row 2: non-numeric value 'abc' in column 'quantity'".to_string()]
        );
        assert_eq!(
            report.stats.numeric_column_ranges["quantity"],
            NumericRange { min: 5.0, max: 5.0 }
        );
    }

    #[test]
    fn test_negative_values_are_warnings_and_ranged() {
        let report = lenient().validate(&table(
            "date,product,quantity,price,customer\n2024-01-01,W,-2,-1.5,C\n",
        ));
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec![
                "Row 1: negative value -2 in column 'quantity'".to_string(),
                "Row 1: negative value -1.5 in column 'price'".to_string(),
            ]
        );
        assert_eq!(
            report.stats.numeric_column_ranges["quantity"],
            NumericRange { min: -2.0, max: -2.0 }
        );
    }

    #[test]
    fn test_warnings_follow_column_then_row_order() {
        let report = lenient().validate(&table(
            "customer,price,date,product,quantity\n\
             ,x,bad,W,1\n\
             C,y,2024-01-01,,1\n",
        ));
        assert_eq!(
            report.warnings,
            vec![
                "Row 1: missing value in required column 'customer'".to_string(),
                "Row 1: non-numeric value 'x' in column 'price'".to_string(),
                "Row 2: non-numeric value 'y' in column 'price'".to_string(),
                "Row 1: unparseable date 'bad' in column 'date'".to_string(),
                "Row 2: missing value in required column 'product'".to_string(),
            ]
        );
        assert!(!report.stats.numeric_column_ranges.contains_key("price"));
        assert_eq!(report.stats.missing_value_counts["customer"], 1);
        assert_eq!(report.stats.missing_value_counts["quantity"], 0);
    }

    #[test]
    fn test_missing_counts_cover_all_columns() {
        let report = lenient().validate(&table(
            "date,product,quantity,price,customer,note\n\
             2024-01-01,W,1,1,C,\n\
             2024-01-01,W,1,1,C\n",
        ));
        assert_eq!(report.stats.missing_value_counts["note"], 2);
        // 非必要欄位只計數，不產生警告
        assert_eq!(
            report.warnings,
            vec!["Row 2: expected 6 fields but found 5; absent cells treated as missing".to_string()]
        );
    }

    #[test]
    fn test_case_insensitive_required_columns() {
        let report = lenient().validate(&table(
            "Date,Product,Quantity,Price,Customer\n2024-01-01,W,abc,1,C\n",
        ));
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec!["Row 1: non-numeric value 'abc' in column 'Quantity'".to_string()]
        );
    }

    #[test]
    fn test_revenue_overflow_is_warned_after_column_checks() {
        let report = lenient().validate(&table(
            "date,product,quantity,price,customer\n\
             2024-01-01,W,1e308,10,C\n\
             bad,V,1,2,D\n",
        ));
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec![
                "Row 2: unparseable date 'bad' in column 'date'".to_string(),
                "Row 1: revenue of quantity 1e308 and price 10 overflows; row excluded from analytics".to_string(),
            ]
        );
    }

    #[test]
    fn test_long_row_warning_lists_extra_fields() {
        let report = lenient().validate(&table(
            "date,product,quantity,price,customer\n2024-01-01,W,1,1,C,x,y\n",
        ));
        assert_eq!(
            report.warnings,
            vec!["Row 1: expected 5 fields but found 7; extra fields ignored: 'x', 'y'".to_string()]
        );
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let csv = "date,product,quantity,price,customer\nx,,-1,abc,\n2024-13-01,W,1,,C\n";
        assert_eq!(lenient().validate(&table(csv)), lenient().validate(&table(csv)));
    }
}
