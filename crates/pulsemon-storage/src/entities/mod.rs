pub mod metric_sample;
pub mod target;
