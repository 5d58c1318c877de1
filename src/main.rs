//! Sleep Scheduler - 定时睡眠/休眠小工具
//!
//! 输入秒数并选择睡眠或休眠，倒计时结束后让电脑进入对应状态

use log::{info, warn};

mod app;
mod core;
mod ui;
mod utils;

use crate::utils::logger::LogLevelConverter;
use crate::utils::{init_logger, ConfigManager};

/// 应用程序入口点
///
/// 加载配置、初始化日志系统并启动GUI
fn main() -> anyhow::Result<()> {
    let config_manager = ConfigManager::load();
    let config = config_manager.config().clone();

    let logger = init_logger(&config.log_level, config.file_logging)?;
    info!("Sleep Scheduler 启动中...");
    info!("配置文件: {:?}", config_manager.config_path());
    info!("日志级别: {}", LogLevelConverter::to_string(logger.get_log_level()));
    if let Some(path) = logger.get_log_file_path() {
        info!("日志文件: {:?}", path);
    }

    match logger.cleanup_old_logs(config.log_retention_days) {
        Ok(0) => {}
        Ok(count) => info!("清理了 {} 个旧日志文件", count),
        Err(e) => warn!("清理旧日志失败: {}", e),
    }

    app::App::new(config).run()
}
