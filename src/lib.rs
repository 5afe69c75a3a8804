pub mod analyzer;
pub mod cache;
pub mod candle_store;
pub mod filter;
pub mod indicator;
pub mod model;
pub mod screener;

/// 엔진 설정
pub mod config;
/// 설정 로더
pub mod config_loader;
