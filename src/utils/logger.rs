//! 日志管理模块
//!
//! 负责应用程序日志系统的初始化和管理

use chrono::{DateTime, Local};
use dirs::data_local_dir;
use env_logger::{Builder, Target};
use log::{info, warn, LevelFilter};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::utils::config::APP_DIR_NAME;

static INIT: Once = Once::new();

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "sleep_scheduler_";

/// 日志管理器
///
/// 负责日志系统的配置和管理
#[derive(Debug)]
pub struct LoggerManager {
    /// 日志文件路径
    log_file_path: Option<PathBuf>,
    /// 当前日志级别
    log_level: LevelFilter,
    /// 是否启用控制台日志
    console_logging_enabled: bool,
}

impl LoggerManager {
    /// 创建新的日志管理器
    ///
    /// # 参数
    ///
    /// * `log_level` - 日志级别
    /// * `enable_file_logging` - 是否启用文件日志
    /// * `enable_console_logging` - 是否启用控制台日志
    pub fn new(
        log_level: LevelFilter,
        enable_file_logging: bool,
        enable_console_logging: bool,
    ) -> io::Result<Self> {
        let log_file_path = if enable_file_logging {
            Some(Self::create_log_file_path()?)
        } else {
            None
        };

        Ok(Self {
            log_file_path,
            log_level,
            console_logging_enabled: enable_console_logging,
        })
    }

    /// 获取日志文件路径，按天生成文件名
    fn create_log_file_path() -> io::Result<PathBuf> {
        let data_dir = data_local_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "无法获取本地数据目录"))?;

        let log_dir = data_dir.join(APP_DIR_NAME).join("logs");
        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir.join(Self::log_file_name(Local::now())))
    }

    fn log_file_name(now: DateTime<Local>) -> String {
        format!("{}{}.log", LOG_FILE_PREFIX, now.format("%Y%m%d"))
    }

    /// 初始化日志系统
    ///
    /// 重复调用时只有第一次生效
    pub fn init(&self) -> io::Result<()> {
        let mut result = Ok(());
        INIT.call_once(|| {
            result = self.init_internal();
        });
        result
    }

    fn init_internal(&self) -> io::Result<()> {
        let mut builder = Builder::new();
        builder.filter_level(self.log_level);
        // RUST_LOG 可以覆盖配置中的级别
        builder.parse_env("RUST_LOG");

        builder.format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            writeln!(
                buf,
                "[{}] [{}] [{}:{}] {}",
                timestamp,
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });

        let file = match &self.log_file_path {
            Some(path) => Some(fs::OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };

        match (self.console_logging_enabled, file) {
            (true, Some(file)) => {
                builder.target(Target::Pipe(Box::new(TeeWriter { file })));
            }
            (true, None) => {
                builder.target(Target::Stdout);
            }
            (false, Some(file)) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            (false, None) => {
                builder.filter_level(LevelFilter::Off);
            }
        }

        builder
            .try_init()
            .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))?;

        match &self.log_file_path {
            Some(path) => info!("日志系统初始化完成 - 日志文件: {:?}", path),
            None => info!("日志系统初始化完成 - 仅控制台"),
        }
        Ok(())
    }

    /// 获取当前日志级别
    pub fn get_log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// 获取日志文件路径
    pub fn get_log_file_path(&self) -> Option<&Path> {
        self.log_file_path.as_deref()
    }

    /// 清理旧日志文件
    ///
    /// # 参数
    ///
    /// * `days_to_keep` - 保留的天数
    ///
    /// # 返回值
    ///
    /// 成功返回清理的文件数量
    pub fn cleanup_old_logs(&self, days_to_keep: u32) -> io::Result<usize> {
        match self.log_file_path.as_deref().and_then(Path::parent) {
            Some(log_dir) => cleanup_logs_in(log_dir, days_to_keep),
            None => Ok(0),
        }
    }
}

/// 同时写入标准输出和日志文件
struct TeeWriter {
    file: fs::File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

/// 删除目录中超过保留天数的日志文件
fn cleanup_logs_in(log_dir: &Path, days_to_keep: u32) -> io::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff_time = Local::now() - chrono::Duration::days(days_to_keep as i64);
    let mut cleaned_count = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let is_log = path.is_file()
            && path.extension().map_or(false, |ext| ext == "log")
            && path
                .file_name()
                .map_or(false, |name| name.to_string_lossy().starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let modified: DateTime<Local> = fs::metadata(&path)?.modified()?.into();
        if modified < cutoff_time {
            match fs::remove_file(&path) {
                Ok(_) => {
                    info!("删除旧日志文件: {:?}", path);
                    cleaned_count += 1;
                }
                Err(e) => warn!("删除日志文件失败 {:?}: {}", path, e),
            }
        }
    }

    Ok(cleaned_count)
}

/// 日志级别转换工具
pub struct LogLevelConverter;

impl LogLevelConverter {
    /// 从字符串转换为日志级别，未知字符串返回Info
    pub fn from_string(level_str: &str) -> LevelFilter {
        match level_str.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }

    /// 从日志级别转换为字符串
    pub fn to_string(level: LevelFilter) -> &'static str {
        match level {
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
            LevelFilter::Off => "off",
        }
    }
}

/// 简化的日志初始化函数
///
/// # 参数
///
/// * `log_level_str` - 日志级别字符串
/// * `enable_file_logging` - 是否启用文件日志
pub fn init_logger(log_level_str: &str, enable_file_logging: bool) -> io::Result<LoggerManager> {
    let log_level = LogLevelConverter::from_string(log_level_str);
    let logger_manager = LoggerManager::new(log_level, enable_file_logging, true)?;
    logger_manager.init()?;
    Ok(logger_manager)
}
