pub mod use_interval;
pub mod use_records;
