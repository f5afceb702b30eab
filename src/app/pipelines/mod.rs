pub mod sales_pipeline;

pub use sales_pipeline::SalesPipeline;
