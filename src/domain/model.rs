use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

/// Logical columns every sales dataset must declare, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "product", "quantity", "price", "customer"];

pub const NUMERIC_COLUMNS: [&str; 2] = ["quantity", "price"];

/// Declared header of a table plus a case-insensitive logical-name index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Self {
        let mut lookup = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            // 同名（忽略大小寫）時以第一個欄位為準
            lookup.entry(normalize_name(column)).or_insert(index);
        }
        Self { columns, lookup }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of the header matching `logical`, ignoring case and surrounding whitespace.
    pub fn position(&self, logical: &str) -> Option<usize> {
        self.lookup.get(&normalize_name(logical)).copied()
    }

    /// Which required column, if any, the header at `index` stands for.
    pub fn role_of(&self, index: usize) -> Option<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .find(|logical| self.position(logical) == Some(index))
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Field-count defect recorded by the loader for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    Complete,
    /// Fewer fields than the header; the missing cells are blank.
    Short { found: usize },
    /// More fields than the header; the extras live in `RawRecord::overflow`.
    Long { found: usize },
}

/// One input row. Holds exactly one value per declared column.
#[derive(Debug, Clone)]
pub struct RawRecord {
    schema: Arc<Schema>,
    values: Vec<String>,
    overflow: Vec<String>,
    shape: RowShape,
}

impl RawRecord {
    pub fn new(schema: Arc<Schema>, mut fields: Vec<String>) -> Self {
        let expected = schema.len();
        let found = fields.len();
        let (shape, overflow) = if found < expected {
            fields.resize(expected, String::new());
            (RowShape::Short { found }, Vec::new())
        } else if found > expected {
            let overflow = fields.split_off(expected);
            (RowShape::Long { found }, overflow)
        } else {
            (RowShape::Complete, Vec::new())
        };

        Self {
            schema,
            values: fields,
            overflow,
            shape,
        }
    }

    /// Raw value of a logical column, `None` when the table does not declare it.
    pub fn get(&self, logical: &str) -> Option<&str> {
        self.schema
            .position(logical)
            .and_then(|index| self.value_at(index))
    }

    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn shape(&self) -> RowShape {
        self.shape
    }

    pub fn overflow(&self) -> &[String] {
        &self.overflow
    }
}

impl Serialize for RawRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Untyped table as decoded from the upload.
#[derive(Debug, Clone)]
pub struct RawTable {
    schema: Arc<Schema>,
    rows: Vec<RawRecord>,
    source_bytes: usize,
}

impl RawTable {
    /// Builds a table from already-split fields; mainly for callers that bypass the loader.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let schema = Arc::new(Schema::new(columns));
        let rows = rows
            .into_iter()
            .map(|fields| RawRecord::new(Arc::clone(&schema), fields))
            .collect();
        Self {
            schema,
            rows,
            source_bytes: 0,
        }
    }

    pub(crate) fn from_parts(schema: Arc<Schema>, rows: Vec<RawRecord>, source_bytes: usize) -> Self {
        Self {
            schema,
            rows,
            source_bytes,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, logical: &str) -> bool {
        self.schema.position(logical).is_some()
    }

    /// Size of the byte buffer the table was decoded from.
    pub fn source_bytes(&self) -> usize {
        self.source_bytes
    }
}

/// A decoded, analytics-ready sale. Revenue is always derived.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub date: NaiveDate,
    pub product: String,
    pub quantity: f64,
    pub price: f64,
    pub customer: String,
    pub revenue: f64,
}

impl SalesRow {
    pub fn new(date: NaiveDate, product: String, quantity: f64, price: f64, customer: String) -> Self {
        Self {
            date,
            product,
            quantity,
            price,
            customer,
            revenue: quantity * price,
        }
    }
}
