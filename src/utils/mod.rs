//! 工具模块
//!
//! 包含配置加载和日志初始化

pub mod config;
pub mod logger;

// 重新导出常用功能
pub use config::{AppConfig, ConfigManager};
pub use logger::init_logger;
