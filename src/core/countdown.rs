//! 倒计时引擎模块
//!
//! 持有总时长与剩余时长，由UI上下文的周期性tick驱动，提供取消功能

use std::time::Duration;

use log::{debug, info};
use uuid::Uuid;

use crate::core::types::{CancelFlag, CountdownState, CountdownUpdate, ScheduleError, ScheduleId};

/// 每个tick代表的时长，倒计时显示和后台等待共用
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// 计算 `ticks` 个tick对应的等待时长
pub fn ticks_to_duration(ticks: u64) -> Duration {
    Duration::from_secs(ticks.saturating_mul(TICK_INTERVAL.as_secs()))
}

/// 倒计时引擎
///
/// 所有方法只在UI上下文中调用；唯一跨线程共享的是取消标志
#[derive(Debug, Default)]
pub struct CountdownEngine {
    /// 当前倒计时状态
    state: CountdownState,
    /// 是否正在计时
    ticking: bool,
    /// 当前调度的标识
    schedule_id: Option<ScheduleId>,
    /// 与后台执行器共享的取消标志
    cancel_flag: CancelFlag,
}

impl CountdownEngine {
    /// 创建新的倒计时引擎
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始倒计时
    ///
    /// # 参数
    ///
    /// * `duration_seconds` - 倒计时秒数
    ///
    /// # 返回值
    ///
    /// 成功返回首个进度更新；时长不合法时不修改任何状态
    pub fn start(&mut self, duration_seconds: i64) -> Result<CountdownUpdate, ScheduleError> {
        if duration_seconds <= 0 {
            return Err(ScheduleError::InvalidDuration(duration_seconds.to_string()));
        }

        let schedule_id = Uuid::new_v4();
        self.state = CountdownState {
            total_seconds: duration_seconds,
            remaining_seconds: duration_seconds,
            cancelled: false,
        };
        self.ticking = true;
        self.schedule_id = Some(schedule_id);
        self.cancel_flag = CancelFlag::new();

        info!("开始倒计时 {}: {}秒", schedule_id, duration_seconds);

        Ok(CountdownUpdate::Progress {
            total: duration_seconds,
            remaining: duration_seconds,
        })
    }

    /// 推进一个tick
    ///
    /// 未在计时时返回None；剩余时间降到0以下时返回唯一一次的到期事件
    pub fn tick(&mut self) -> Option<CountdownUpdate> {
        if !self.ticking {
            return None;
        }

        self.state.remaining_seconds -= 1;

        if self.state.remaining_seconds >= 0 {
            debug!("倒计时剩余 {}秒", self.state.remaining_seconds);
            return Some(CountdownUpdate::Progress {
                total: self.state.total_seconds,
                remaining: self.state.remaining_seconds,
            });
        }

        self.ticking = false;
        info!("倒计时结束");
        Some(CountdownUpdate::Expired {
            total: self.state.total_seconds,
        })
    }

    /// 取消当前倒计时
    ///
    /// 对空闲或已结束的引擎调用时为空操作
    pub fn cancel(&mut self) -> Option<CountdownUpdate> {
        if !self.ticking {
            debug!("没有进行中的倒计时，忽略取消请求");
            return None;
        }

        self.cancel_flag.cancel();
        self.ticking = false;
        self.state = CountdownState {
            total_seconds: 0,
            remaining_seconds: 0,
            cancelled: true,
        };

        if let Some(id) = self.schedule_id {
            info!("倒计时 {} 已取消", id);
        }
        Some(CountdownUpdate::Cancelled)
    }

    /// 将引擎恢复为空闲状态
    pub fn reset(&mut self) {
        self.state = CountdownState::default();
        self.ticking = false;
        self.schedule_id = None;
    }

    /// 是否正在计时
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// 获取当前状态快照
    #[cfg(test)]
    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// 当前调度的标识
    pub fn schedule_id(&self) -> Option<ScheduleId> {
        self.schedule_id
    }

    /// 获取当前调度的取消标志，交给后台执行器
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel_flag.clone()
    }
}
