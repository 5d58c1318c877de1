//! 设置持久化模块
//!
//! 保存最近一次使用的倒计时时长和电源操作，启动时读取并预填到界面

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::types::PowerAction;

/// 默认设置文件名
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// 持久化的设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistedSettings {
    /// 最近一次的时长（秒），没有时不预填
    pub last_duration: Option<u64>,
    /// 最近一次的电源操作
    pub last_action: PowerAction,
}

/// 写入磁盘的文件格式
#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    last_duration: u64,
    last_action: PowerAction,
}

/// 设置存储
///
/// 所有I/O错误都在内部记录日志，不会向调用方报告
#[derive(Debug, Clone)]
pub struct SettingsStore {
    /// 设置文件路径
    path: PathBuf,
}

impl SettingsStore {
    /// 使用指定路径创建设置存储
    ///
    /// # 参数
    ///
    /// * `path` - 设置文件路径
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 默认设置文件路径：可执行文件所在目录，失败时使用当前目录
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SETTINGS_FILE_NAME)
    }

    /// 获取设置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存设置
    ///
    /// # 参数
    ///
    /// * `duration_seconds` - 时长（秒）
    /// * `action` - 电源操作
    pub fn save(&self, duration_seconds: u64, action: PowerAction) {
        match self.try_save(duration_seconds, action) {
            Ok(()) => info!("设置已保存到: {:?}", self.path),
            Err(e) => error!("无法保存设置: {:#}", e),
        }
    }

    /// 读取设置
    ///
    /// 文件不存在、不可读或格式错误时返回默认值
    pub fn load(&self) -> PersistedSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("无法读取设置，使用默认值: {:#}", e);
                PersistedSettings::default()
            }
        }
    }

    fn try_save(&self, duration_seconds: u64, action: PowerAction) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let json_data = serde_json::to_string(&SettingsFile {
            last_duration: duration_seconds,
            last_action: action,
        })
        .context("序列化设置失败")?;

        // 先写临时文件再替换，避免写到一半留下损坏的文件
        let mut file = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("无法在 {:?} 创建临时文件", dir))?;
        file.write_all(json_data.as_bytes()).context("写入设置失败")?;
        file.flush().context("刷新设置文件失败")?;
        file.persist(&self.path)
            .map_err(|e| anyhow!("替换设置文件失败: {}", e.error))?;

        Ok(())
    }

    fn try_load(&self) -> Result<PersistedSettings> {
        if !self.path.exists() {
            info!("设置文件不存在: {:?}", self.path);
            return Ok(PersistedSettings::default());
        }

        let json_data = fs::read_to_string(&self.path)
            .with_context(|| format!("读取设置文件 {:?} 失败", self.path))?;

        if json_data.trim().is_empty() {
            info!("设置文件为空");
            return Ok(PersistedSettings::default());
        }

        let value: Value = serde_json::from_str(&json_data).map_err(|e| {
            if let Err(backup_err) = self.backup_corrupted_file() {
                warn!("备份损坏的设置文件失败: {:#}", backup_err);
            }
            anyhow!("设置文件格式错误: {}", e)
        })?;

        let settings = Self::settings_from_value(&value);
        info!("设置已加载: {:?}", settings);
        Ok(settings)
    }

    /// 逐字段校验，不合法的字段回落到默认值
    fn settings_from_value(value: &Value) -> PersistedSettings {
        let last_duration = value
            .get("last_duration")
            .and_then(Value::as_u64)
            .filter(|seconds| *seconds > 0);

        let last_action = value
            .get("last_action")
            .and_then(Value::as_str)
            .and_then(PowerAction::from_name)
            .unwrap_or_default();

        PersistedSettings {
            last_duration,
            last_action,
        }
    }

    /// 备份损坏的文件
    fn backup_corrupted_file(&self) -> Result<()> {
        let backup_path = self.path.with_extension("corrupted.bak");
        fs::copy(&self.path, &backup_path).context("备份文件失败")?;
        info!("损坏文件已备份到: {:?}", backup_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME))
    }

    #[test]
    fn test_save_and_load_settings() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.save(90, PowerAction::Hibernate);

        let loaded = store.load();
        assert_eq!(loaded.last_duration, Some(90));
        assert_eq!(loaded.last_action, PowerAction::Hibernate);
    }

    #[test]
    fn test_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.save(30, PowerAction::Sleep);

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["last_duration"], 30);
        assert_eq!(raw["last_action"], "Sleep");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let loaded = store.load();
        assert_eq!(loaded, PersistedSettings::default());
        assert_eq!(loaded.last_duration, None);
        assert_eq!(loaded.last_action, PowerAction::Sleep);
    }

    #[test]
    fn test_corrupted_file_gives_defaults_and_backup() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.load(), PersistedSettings::default());
        assert!(store.path().with_extension("corrupted.bak").exists());
    }

    #[test]
    fn test_invalid_fields_fall_back_individually() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        fs::write(store.path(), r#"{"last_duration": -4, "last_action": "Hibernate"}"#).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.last_duration, None);
        assert_eq!(loaded.last_action, PowerAction::Hibernate);

        fs::write(store.path(), r#"{"last_duration": 45, "last_action": "Shutdown"}"#).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.last_duration, Some(45));
        assert_eq!(loaded.last_action, PowerAction::Sleep);

        fs::write(store.path(), r#"{"last_duration": "45"}"#).unwrap();
        assert_eq!(store.load(), PersistedSettings::default());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::write(store.path(), "  \n").unwrap();

        assert_eq!(store.load(), PersistedSettings::default());
    }

    #[test]
    fn test_save_into_missing_directory_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path().join("missing").join(SETTINGS_FILE_NAME));

        store.save(10, PowerAction::Sleep);

        assert!(!store.path().exists());
        assert_eq!(store.load(), PersistedSettings::default());
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.save(10, PowerAction::Hibernate);
        store.save(600, PowerAction::Sleep);

        let loaded = store.load();
        assert_eq!(loaded.last_duration, Some(600));
        assert_eq!(loaded.last_action, PowerAction::Sleep);
    }
}
