//! 核心业务逻辑模块
//!
//! 包含倒计时、延迟执行、电源操作和设置持久化

pub mod countdown;
pub mod power;
pub mod runner;
pub mod settings;
pub mod types;

// 重新导出常用类型
pub use countdown::CountdownEngine;
pub use power::SystemPowerBackend;
pub use runner::DeferredActionRunner;
pub use settings::SettingsStore;
