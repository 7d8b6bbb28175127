pub mod bar_store;
pub mod config_port;
pub mod report_port;
