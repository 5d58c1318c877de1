//! 应用程序主模块
//!
//! 负责组装各个组件并启动界面

use anyhow::Result;
use log::{info, warn};

use crate::core::{DeferredActionRunner, SettingsStore, SystemPowerBackend};
use crate::ui::{run_with_params, UIFlags};
use crate::utils::AppConfig;

/// 应用程序主结构体
///
/// 持有界面启动前需要的所有组件
pub struct App {
    /// 应用配置
    config: AppConfig,
    /// 上次调度的设置
    settings_store: SettingsStore,
    /// 延迟执行器
    runner: DeferredActionRunner<SystemPowerBackend>,
}

impl App {
    /// 创建新的应用实例
    ///
    /// # 参数
    ///
    /// * `config` - 已加载的应用配置
    pub fn new(config: AppConfig) -> Self {
        info!("初始化应用组件...");

        if !SystemPowerBackend::is_supported() {
            warn!("当前平台不支持睡眠和休眠，调度到期后只会给出提示");
        }

        let settings_store = SettingsStore::new(config.settings_path());
        info!("设置文件: {:?}", settings_store.path());

        Self {
            config,
            settings_store,
            runner: DeferredActionRunner::new(SystemPowerBackend::new()),
        }
    }

    /// 运行应用程序
    ///
    /// 启动GUI界面并进入事件循环，窗口关闭后返回
    pub fn run(self) -> Result<()> {
        info!("启动用户界面...");

        run_with_params(UIFlags {
            config: self.config,
            settings_store: self.settings_store,
            runner: self.runner,
        })?;

        info!("用户界面已退出");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_app_uses_configured_settings_path() {
        let config = AppConfig {
            settings_file: Some(PathBuf::from("custom_settings.json")),
            ..AppConfig::default()
        };

        let app = App::new(config);
        assert_eq!(app.settings_store.path(), PathBuf::from("custom_settings.json").as_path());
    }
}
