use crate::domain::model::{RawRecord, SalesRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%b %d %Y",
];

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Why a single cell could not be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellIssue {
    Missing,
    NotNumeric,
    Negative,
    UnparseableDate,
    /// Both factors are finite but their product is not.
    Overflow,
}

impl fmt::Display for CellIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Missing => "missing value",
            Self::NotNumeric => "non-numeric value",
            Self::Negative => "negative value",
            Self::UnparseableDate => "unparseable date",
            Self::Overflow => "revenue overflow",
        };
        f.write_str(text)
    }
}

/// First column that kept a record from becoming a `SalesRow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRejection {
    pub column: &'static str,
    pub issue: CellIssue,
}

pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Parses a finite decimal number. Negative values are accepted here.
pub fn parse_number(raw: &str) -> Result<f64, CellIssue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CellIssue::Missing);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CellIssue::NotNumeric),
    }
}

pub fn parse_non_negative(raw: &str) -> Result<f64, CellIssue> {
    let value = parse_number(raw)?;
    if value < 0.0 {
        return Err(CellIssue::Negative);
    }
    // -0.0 正規化
    Ok(value.abs())
}

/// Revenue of a row, rejecting products that leave the finite range.
pub fn checked_revenue(quantity: f64, price: f64) -> Result<f64, CellIssue> {
    let revenue = quantity * price;
    if revenue.is_finite() {
        Ok(revenue)
    } else {
        Err(CellIssue::Overflow)
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, CellIssue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CellIssue::Missing);
    }

    if let Some(date) = parse_compact_date(trimmed) {
        return Ok(date);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|datetime| datetime.date_naive())
        .map_err(|_| CellIssue::UnparseableDate)
}

// YYYYMMDD
fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn parse_text(raw: &str) -> Result<&str, CellIssue> {
    if is_blank(raw) {
        Err(CellIssue::Missing)
    } else {
        Ok(raw)
    }
}

/// Builds a `SalesRow` from a raw record, or names the column that prevented it.
pub fn coerce_row(record: &RawRecord) -> Result<SalesRow, RowRejection> {
    let field = |column: &'static str| record.get(column).unwrap_or("");

    let date = parse_date(field("date")).map_err(reject("date"))?;
    let product = parse_text(field("product")).map_err(reject("product"))?;
    let quantity = parse_non_negative(field("quantity")).map_err(reject("quantity"))?;
    let price = parse_non_negative(field("price")).map_err(reject("price"))?;
    checked_revenue(quantity, price).map_err(reject("price"))?;
    let customer = parse_text(field("customer")).map_err(reject("customer"))?;

    Ok(SalesRow::new(
        date,
        product.to_string(),
        quantity,
        price,
        customer.to_string(),
    ))
}

fn reject(column: &'static str) -> impl Fn(CellIssue) -> RowRejection {
    move |issue| RowRejection { column, issue }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RawTable;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 10.50 "), Ok(10.5));
        assert_eq!(parse_number("-3"), Ok(-3.0));
        assert_eq!(parse_number("1e2"), Ok(100.0));
        assert_eq!(parse_number(""), Err(CellIssue::Missing));
        assert_eq!(parse_number("   "), Err(CellIssue::Missing));
        assert_eq!(parse_number("abc"), Err(CellIssue::NotNumeric));
        assert_eq!(parse_number("NaN"), Err(CellIssue::NotNumeric));
        assert_eq!(parse_number("inf"), Err(CellIssue::NotNumeric));
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative("0"), Ok(0.0));
        assert_eq!(parse_non_negative("-0.01"), Err(CellIssue::Negative));
        assert!(parse_non_negative("-0").unwrap().is_sign_positive());
    }

    #[test]
    fn test_checked_revenue() {
        assert_eq!(checked_revenue(4.0, 2.5), Ok(10.0));
        assert_eq!(checked_revenue(f64::MAX, 0.0), Ok(0.0));
        assert_eq!(checked_revenue(1e308, 10.0), Err(CellIssue::Overflow));
        assert_eq!(checked_revenue(f64::MAX, f64::MAX), Err(CellIssue::Overflow));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-05"), Ok(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024/01/05"), Ok(ymd(2024, 1, 5)));
        assert_eq!(parse_date("01/05/2024"), Ok(ymd(2024, 1, 5)));
        assert_eq!(parse_date("25/12/2024"), Ok(ymd(2024, 12, 25)));
        assert_eq!(parse_date("05.01.2024"), Ok(ymd(2024, 1, 5)));
        assert_eq!(parse_date("20240105"), Ok(ymd(2024, 1, 5)));
        assert_eq!(parse_date("05-Jan-2024"), Ok(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05 13:45:00"), Ok(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T13:45:00"), Ok(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T13:45:00+02:00"), Ok(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_date_failures() {
        assert_eq!(parse_date(""), Err(CellIssue::Missing));
        assert_eq!(parse_date("yesterday"), Err(CellIssue::UnparseableDate));
        assert_eq!(parse_date("2024-02-30"), Err(CellIssue::UnparseableDate));
        assert_eq!(parse_date("20241340"), Err(CellIssue::UnparseableDate));
    }

    fn single_row(values: &[&str]) -> RawTable {
        RawTable::new(
            ["date", "product", "quantity", "price", "customer"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![values.iter().map(|s| s.to_string()).collect()],
        )
    }

    #[test]
    fn test_coerce_row_success() {
        let table = single_row(&["2024-01-01", "Widget A", "5", "10.50", "Cust A"]);
        let row = coerce_row(&table.rows()[0]).unwrap();
        assert_eq!(row.date, ymd(2024, 1, 1));
        assert_eq!(row.product, "Widget A");
        assert_eq!(row.revenue, 52.5);
    }

    #[test]
    fn test_coerce_row_rejections() {
        let cases = [
            (["2024-01-01", "W", "abc", "1", "C"], "quantity", CellIssue::NotNumeric),
            (["2024-01-01", "W", "1", "-2", "C"], "price", CellIssue::Negative),
            (["2024-01-01", " ", "1", "2", "C"], "product", CellIssue::Missing),
            (["2024-01-01", "W", "1", "2", ""], "customer", CellIssue::Missing),
            (["not a date", "W", "1", "2", "C"], "date", CellIssue::UnparseableDate),
            (["2024-01-01", "W", "1e308", "10", "C"], "price", CellIssue::Overflow),
        ];
        for (values, column, issue) in cases {
            let table = single_row(&values);
            assert_eq!(
                coerce_row(&table.rows()[0]),
                Err(RowRejection { column, issue })
            );
        }
    }

    #[test]
    fn test_coerce_row_without_column() {
        let table = RawTable::new(
            vec!["date".to_string(), "product".to_string()],
            vec![vec!["2024-01-01".to_string(), "W".to_string()]],
        );
        assert_eq!(
            coerce_row(&table.rows()[0]),
            Err(RowRejection {
                column: "quantity",
                issue: CellIssue::Missing
            })
        );
    }
}
