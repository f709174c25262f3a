pub mod api;
pub mod date_utils;
pub mod storage;
