use crate::domain::model::{RawRecord, RawTable, RowShape, Schema};
use crate::utils::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Delimiter {
    #[default]
    Auto,
    Byte(u8),
}

impl FromStr for Delimiter {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" | "" => Ok(Self::Auto),
            "tab" | "\\t" | "\t" => Ok(Self::Byte(b'\t')),
            "\"" | "\n" | "\r" => Err(AnalyticsError::InvalidConfigValueError {
                field: "loader.delimiter".to_string(),
                value: s.escape_default().to_string(),
                reason: "Quote and line-break characters cannot be used as delimiters".to_string(),
            }),
            other if other.len() == 1 && other.is_ascii() => Ok(Self::Byte(other.as_bytes()[0])),
            other => Err(AnalyticsError::InvalidConfigValueError {
                field: "loader.delimiter".to_string(),
                value: other.to_string(),
                reason: "Delimiter must be 'auto', 'tab' or a single ASCII character".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl FromStr for Encoding {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            other => Err(AnalyticsError::InvalidConfigValueError {
                field: "loader.encoding".to_string(),
                value: other.to_string(),
                reason: "Supported encodings: utf-8, latin-1".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoaderOptions {
    pub delimiter: Delimiter,
    pub encoding: Encoding,
}

/// Turns uploaded bytes into a `RawTable`, keeping every value verbatim.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    options: LoaderOptions,
}

impl TableLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn load(&self, bytes: &[u8]) -> Result<RawTable> {
        let text = decode(bytes, self.options.encoding)?;
        let delimiter = match self.options.delimiter {
            Delimiter::Byte(b) => b,
            Delimiter::Auto => sniff_delimiter(&text),
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let header = reader
            .headers()
            .map_err(|e| AnalyticsError::malformed(format!("unreadable header row: {}", e)))?;
        let columns = header_columns(header)?;
        let schema = Arc::new(Schema::new(columns));

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| {
                AnalyticsError::malformed(format!("unreadable data row: {}", e))
            })?;
            let fields = record.iter().map(str::to_string).collect();
            rows.push(RawRecord::new(Arc::clone(&schema), fields));
        }

        let ragged = rows
            .iter()
            .filter(|row| row.shape() != RowShape::Complete)
            .count();
        if ragged > 0 {
            tracing::warn!(
                "{} of {} rows do not match the header's {} fields",
                ragged,
                rows.len(),
                schema.len()
            );
        }
        tracing::debug!(
            "Loaded table: {} rows x {} columns (delimiter {:?})",
            rows.len(),
            schema.len(),
            delimiter as char
        );

        Ok(RawTable::from_parts(schema, rows, bytes.len()))
    }
}

pub fn load_table(bytes: &[u8], options: LoaderOptions) -> Result<RawTable> {
    TableLoader::new(options).load(bytes)
}

fn decode(bytes: &[u8], encoding: Encoding) -> Result<Cow<'_, str>> {
    match encoding {
        Encoding::Utf8 => {
            let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            std::str::from_utf8(body).map(Cow::Borrowed).map_err(|e| {
                AnalyticsError::malformed(format!(
                    "input is not valid UTF-8 (byte offset {})",
                    e.valid_up_to()
                ))
            })
        }
        Encoding::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&b| b as char).collect())),
    }
}

/// Picks the candidate that occurs most often outside quotes on the header line.
fn sniff_delimiter(text: &str) -> u8 {
    // csv 讀取器會跳過開頭的空行，這裡要看同一行
    let header_start: usize = text
        .split_inclusive('\n')
        .take_while(|line| line.trim().is_empty())
        .map(str::len)
        .sum();

    let mut counts = [0usize; SNIFF_CANDIDATES.len()];
    let mut in_quotes = false;
    for b in text[header_start..].bytes() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\n' | b'\r' if !in_quotes => break,
            _ if !in_quotes => {
                if let Some(i) = SNIFF_CANDIDATES.iter().position(|&c| c == b) {
                    counts[i] += 1;
                }
            }
            _ => {}
        }
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    SNIFF_CANDIDATES[best]
}

fn header_columns(header: &csv::StringRecord) -> Result<Vec<String>> {
    if header.is_empty() || (header.len() == 1 && header[0].trim().is_empty()) {
        return Err(AnalyticsError::malformed("missing header row"));
    }

    let mut seen = HashSet::with_capacity(header.len());
    let mut columns = Vec::with_capacity(header.len());
    for (index, name) in header.iter().enumerate() {
        let column = if name.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name.to_string()
        };
        if !seen.insert(column.clone()) {
            return Err(AnalyticsError::malformed(format!(
                "duplicate column name '{}' in header",
                column
            )));
        }
        columns.push(column);
    }
    Ok(columns)
}
