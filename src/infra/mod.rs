pub mod api;
pub mod cache;
pub mod chart;
pub mod config;
pub mod db;
pub mod logger;
pub mod storage;
