//! 核心数据类型定义
//!
//! 定义应用程序中使用的所有核心数据结构和枚举

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// 电源操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerAction {
    /// 挂起到内存
    #[default]
    Sleep,
    /// 挂起到磁盘
    Hibernate,
}

impl PowerAction {
    /// 所有可选的电源操作
    pub const ALL: [PowerAction; 2] = [PowerAction::Sleep, PowerAction::Hibernate];

    /// 持久化时使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Sleep => "Sleep",
            PowerAction::Hibernate => "Hibernate",
        }
    }

    /// 从持久化名称解析，未知名称返回None
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 调度相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// 时长不是正整数
    #[error("invalid duration: {0:?} is not a positive number of seconds")]
    InvalidDuration(String),
}

/// 调度请求
///
/// 用户提交时创建，校验通过后不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRequest {
    duration_seconds: u64,
    action: PowerAction,
}

impl ScheduleRequest {
    /// 创建调度请求
    ///
    /// # 参数
    ///
    /// * `duration_seconds` - 倒计时秒数，必须大于0
    /// * `action` - 到期时执行的电源操作
    pub fn new(duration_seconds: i64, action: PowerAction) -> Result<Self, ScheduleError> {
        if duration_seconds <= 0 {
            return Err(ScheduleError::InvalidDuration(duration_seconds.to_string()));
        }

        Ok(Self {
            duration_seconds: duration_seconds as u64,
            action,
        })
    }

    /// 从用户输入的原始文本创建调度请求
    pub fn parse(input: &str, action: PowerAction) -> Result<Self, ScheduleError> {
        let trimmed = input.trim();
        let seconds = trimmed
            .parse::<i64>()
            .map_err(|_| ScheduleError::InvalidDuration(trimmed.to_string()))?;
        Self::new(seconds, action)
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn action(&self) -> PowerAction {
        self.action
    }
}

/// 倒计时状态
///
/// 仅由倒计时引擎持有和修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownState {
    pub total_seconds: i64,
    pub remaining_seconds: i64,
    pub cancelled: bool,
}

/// 倒计时更新消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownUpdate {
    /// 倒计时进度更新
    Progress { total: i64, remaining: i64 },
    /// 倒计时到期，显示停在0
    Expired { total: i64 },
    /// 倒计时取消，显示归零
    Cancelled,
}

impl CountdownUpdate {
    /// 圆环显示所需的 (总时长, 剩余时长)
    pub fn display(&self) -> (i64, i64) {
        match *self {
            CountdownUpdate::Progress { total, remaining } => (total, remaining),
            CountdownUpdate::Expired { total } => (total, 0),
            CountdownUpdate::Cancelled => (0, 0),
        }
    }

    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CountdownUpdate::Progress { .. })
    }
}

/// 单次调度的标识
pub type ScheduleId = Uuid;

/// 取消标志
///
/// 在UI上下文与后台执行器之间共享，每次调度新建一个实例
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记为已取消
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 延迟执行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// 等待结束时已被取消，未执行任何操作
    Skipped,
    /// 电源操作已下发
    Executed,
    /// 当前平台不支持该操作
    Unsupported,
    /// 电源操作调用失败（仅记录日志）
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schedule_request() {
        let request = ScheduleRequest::parse(" 90 ", PowerAction::Hibernate).unwrap();
        assert_eq!(request.duration_seconds(), 90);
        assert_eq!(request.action(), PowerAction::Hibernate);
    }

    #[test]
    fn test_parse_rejects_non_positive_and_garbage() {
        for input in ["0", "-5", "", "abc", "1.5", "10s"] {
            assert!(
                matches!(
                    ScheduleRequest::parse(input, PowerAction::Sleep),
                    Err(ScheduleError::InvalidDuration(_))
                ),
                "input {:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_power_action_names() {
        assert_eq!(PowerAction::from_name("Sleep"), Some(PowerAction::Sleep));
        assert_eq!(PowerAction::from_name("Hibernate"), Some(PowerAction::Hibernate));
        assert_eq!(PowerAction::from_name("hibernate"), None);
        assert_eq!(PowerAction::default(), PowerAction::Sleep);
    }

    #[test]
    fn test_cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let worker_view = flag.clone();
        assert!(!worker_view.is_cancelled());
        flag.cancel();
        assert!(worker_view.is_cancelled());
    }

    #[test]
    fn test_update_display_values() {
        assert_eq!(CountdownUpdate::Progress { total: 10, remaining: 4 }.display(), (10, 4));
        assert_eq!(CountdownUpdate::Expired { total: 10 }.display(), (10, 0));
        assert_eq!(CountdownUpdate::Cancelled.display(), (0, 0));
        assert!(!CountdownUpdate::Progress { total: 1, remaining: 1 }.is_terminal());
        assert!(CountdownUpdate::Cancelled.is_terminal());
    }
}
