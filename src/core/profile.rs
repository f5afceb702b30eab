//! Cheap read path over a `RawTable`: shape, inferred column types and a sample.

use crate::core::coerce::{is_blank, parse_date, parse_number};
use crate::domain::model::RawTable;
use crate::domain::report::{ColumnProfile, ColumnType, QuickStats};

pub const DEFAULT_SAMPLE_SIZE: usize = 5;

pub fn quick_stats(table: &RawTable, sample_size: usize) -> QuickStats {
    let data_types = table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| ColumnProfile {
            column: column.clone(),
            data_type: infer_column_type(
                table
                    .rows()
                    .iter()
                    .map(|row| row.value_at(index).unwrap_or("")),
            ),
        })
        .collect();

    QuickStats {
        rows: table.row_count(),
        columns: table.column_count(),
        column_names: table.columns().to_vec(),
        data_types,
        sample_data: table.rows().iter().take(sample_size).cloned().collect(),
        file_size: table.source_bytes(),
    }
}

/// Narrowest type every non-blank value fits.
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut integer = true;
    let mut float = true;
    let mut date = true;
    let mut seen = false;

    for raw in values.filter(|v| !is_blank(v)) {
        seen = true;
        if integer && raw.trim().parse::<i64>().is_err() {
            integer = false;
        }
        if float && parse_number(raw).is_err() {
            float = false;
        }
        if date && parse_date(raw).is_err() {
            date = false;
        }
        if !integer && !float && !date {
            return ColumnType::Text;
        }
    }

    match (seen, integer, float, date) {
        (false, ..) => ColumnType::Empty,
        (true, true, _, _) => ColumnType::Integer,
        (true, false, true, _) => ColumnType::Float,
        (true, false, false, true) => ColumnType::Date,
        _ => ColumnType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::TableLoader;

    #[test]
    fn test_infer_column_type() {
        assert_eq!(infer_column_type(["1", "2", ""].into_iter()), ColumnType::Integer);
        assert_eq!(infer_column_type(["1", "2.5"].into_iter()), ColumnType::Float);
        assert_eq!(
            infer_column_type(["2024-01-01", "01/02/2024"].into_iter()),
            ColumnType::Date
        );
        assert_eq!(infer_column_type(["1", "abc"].into_iter()), ColumnType::Text);
        assert_eq!(infer_column_type(["", "  "].into_iter()), ColumnType::Empty);
    }

    #[test]
    fn test_quick_stats_projection() {
        let mut csv = String::from("date,product,quantity,price,customer,note\n");
        for i in 0..8 {
            csv.push_str(&format!("2024-01-0{},W{},{},1.5,C,\n", i + 1, i, i));
        }
        let table = TableLoader::default().load(csv.as_bytes()).unwrap();
        let stats = quick_stats(&table, DEFAULT_SAMPLE_SIZE);

        assert_eq!(stats.rows, 8);
        assert_eq!(stats.columns, 6);
        assert_eq!(stats.column_names[5], "note");
        assert_eq!(stats.sample_data.len(), 5);
        assert_eq!(stats.file_size, csv.len());

        let types: Vec<ColumnType> = stats.data_types.iter().map(|p| p.data_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Date,
                ColumnType::Text,
                ColumnType::Integer,
                ColumnType::Float,
                ColumnType::Text,
                ColumnType::Empty,
            ]
        );

        let sample = serde_json::to_value(&stats.sample_data[0]).unwrap();
        assert_eq!(sample["product"], "W0");
    }
}
