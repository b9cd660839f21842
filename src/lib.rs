pub mod api_support;
pub mod app_state;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod http_client;
pub mod listing;
pub mod metric;
pub mod outlier;
pub mod planner;
pub mod providers;
pub mod published_at;
pub mod quiz;
pub mod sheet_cells;
pub mod summary;
pub mod telemetry;
pub mod view;
