// Domain layer: data model, report shapes and ports (interfaces).

pub mod model;
pub mod ports;
pub mod report;
