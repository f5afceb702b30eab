pub mod analytics;
pub mod coerce;
pub mod engine;
pub mod loader;
pub mod profile;
pub mod validator;

pub use crate::domain::model::{RawRecord, RawTable, SalesRow};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
