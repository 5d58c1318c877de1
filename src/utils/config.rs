//! 配置管理模块
//!
//! 负责应用程序配置的加载、校验和设置文件路径的解析

use std::fs;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::settings::SettingsStore;

/// 配置目录下的应用文件夹名
pub const APP_DIR_NAME: &str = "SleepScheduler";

/// 应用程序配置
///
/// 缺失的字段使用默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 日志级别
    pub log_level: String,
    /// 是否写入日志文件
    pub file_logging: bool,
    /// 日志文件保留天数
    pub log_retention_days: u32,
    /// 圆环直径
    pub ring_diameter: f32,
    /// 自定义设置文件路径，未设置时放在可执行文件旁
    pub settings_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: false,
            log_retention_days: 7,
            ring_diameter: 200.0,
            settings_file: None,
        }
    }
}

impl AppConfig {
    /// 解析设置文件路径
    pub fn settings_path(&self) -> PathBuf {
        self.settings_file
            .clone()
            .unwrap_or_else(SettingsStore::default_path)
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置文件路径
    config_path: PathBuf,
    /// 当前配置
    config: AppConfig,
}

impl ConfigManager {
    /// 从默认位置加载配置
    ///
    /// 配置目录不可用时使用默认配置
    pub fn load() -> Self {
        let config_path = config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"));
        Self::load_from(config_path)
    }

    /// 从指定路径加载配置
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn load_from<P: AsRef<Path>>(config_path: P) -> Self {
        let config_path = config_path.as_ref().to_path_buf();
        let config = Self::read_config(&config_path);
        let manager = Self { config_path, config };

        if !manager.validate_config() {
            warn!("配置校验失败，使用默认配置");
            return Self {
                config: AppConfig::default(),
                ..manager
            };
        }

        manager
    }

    fn read_config(path: &Path) -> AppConfig {
        if !path.exists() {
            info!("配置文件不存在，使用默认配置: {:?}", path);
            return AppConfig::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                Ok(config) => {
                    info!("配置已加载: {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("配置文件格式错误，使用默认配置: {}", e);
                    AppConfig::default()
                }
            },
            Err(e) => {
                warn!("读取配置文件失败，使用默认配置: {}", e);
                AppConfig::default()
            }
        }
    }

    /// 校验当前配置
    pub fn validate_config(&self) -> bool {
        let (valid, errors) = ConfigValidator::validate(&self.config);
        for error in &errors {
            warn!("配置错误: {}", error);
        }
        valid
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// 配置校验器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 校验配置
    ///
    /// # 返回值
    ///
    /// 校验结果和错误信息
    pub fn validate(config: &AppConfig) -> (bool, Vec<String>) {
        let mut errors = Vec::new();

        let valid_log_levels = ["error", "warn", "info", "debug", "trace", "off"];
        if !valid_log_levels.contains(&config.log_level.to_lowercase().as_str()) {
            errors.push(format!("无效的日志级别: {}", config.log_level));
        }

        if !(60.0..=1000.0).contains(&config.ring_diameter) {
            errors.push("圆环直径应在60-1000之间".to_string());
        }

        if config.log_retention_days == 0 || config.log_retention_days > 365 {
            errors.push("日志保留天数应在1-365之间".to_string());
        }

        (errors.is_empty(), errors)
    }
}
