//! 用户界面模块
//!
//! 包含调度窗口、圆环倒计时和玻璃主题

pub mod manager;
pub mod ring;
pub mod theme;

// 重新导出主要组件
pub use manager::{run_with_params, UIFlags};
