//! 电源操作模块
//!
//! 负责执行系统的挂起到内存（睡眠）和挂起到磁盘（休眠）操作

use std::future::Future;

use log::{error, info};
use thiserror::Error;

use crate::core::types::PowerAction;

/// 电源操作错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerError {
    /// 当前平台没有实现该操作
    #[error("{0} is not supported on this platform")]
    UnsupportedPlatform(PowerAction),
    /// 系统命令执行失败
    #[error("power command failed: {0}")]
    CommandFailed(String),
    /// 无法获取所需的系统权限
    #[error("missing privilege: {0}")]
    PrivilegeDenied(String),
    /// 系统API调用失败
    #[error("power API call failed: {0}")]
    ApiCallFailed(String),
}

/// 平台电源操作接口
pub trait PowerBackend: Send + Sync + 'static {
    /// 执行电源操作
    fn execute(&self, action: PowerAction) -> impl Future<Output = Result<(), PowerError>> + Send;
}

/// 调用操作系统的电源操作
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPowerBackend;

impl SystemPowerBackend {
    pub fn new() -> Self {
        Self
    }

    /// 当前平台是否实现了电源操作
    pub fn is_supported() -> bool {
        cfg!(any(windows, target_os = "linux"))
    }
}

impl PowerBackend for SystemPowerBackend {
    async fn execute(&self, action: PowerAction) -> Result<(), PowerError> {
        info!("执行电源操作: {}", action);
        let result = platform::execute(action).await;
        match &result {
            Ok(()) => info!("电源操作 {} 已下发", action),
            Err(PowerError::UnsupportedPlatform(_)) => {}
            Err(e) => error!("电源操作 {} 失败: {}", action, e),
        }
        result
    }
}

#[cfg(windows)]
mod platform {
    use log::info;
    use winapi::shared::minwindef::FALSE;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::powrprof::SetSuspendState;
    use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcessToken};
    use winapi::um::securitybaseapi::AdjustTokenPrivileges;
    use winapi::um::winbase::LookupPrivilegeValueW;
    use winapi::um::winnt::{
        HANDLE, LUID, LUID_AND_ATTRIBUTES, SE_PRIVILEGE_ENABLED, TOKEN_ADJUST_PRIVILEGES,
        TOKEN_PRIVILEGES, TOKEN_QUERY,
    };

    use super::PowerError;
    use crate::core::types::PowerAction;

    pub async fn execute(action: PowerAction) -> Result<(), PowerError> {
        // SetSuspendState 会阻塞到系统恢复
        tokio::task::spawn_blocking(move || suspend(action))
            .await
            .map_err(|e| PowerError::ApiCallFailed(e.to_string()))?
    }

    fn suspend(action: PowerAction) -> Result<(), PowerError> {
        enable_shutdown_privilege()?;

        let (hibernate, force) = match action {
            PowerAction::Sleep => (0, 1),
            PowerAction::Hibernate => (1, 0),
        };
        info!("调用SetSuspendState(hibernate={}, force={})", hibernate, force);

        let result = unsafe { SetSuspendState(hibernate, force, 0) };
        if result != 0 {
            Ok(())
        } else {
            Err(PowerError::ApiCallFailed(format!("SetSuspendState failed for {}", action)))
        }
    }

    /// 启用SeShutdownPrivilege
    fn enable_shutdown_privilege() -> Result<(), PowerError> {
        unsafe {
            let mut token_handle: HANDLE = std::ptr::null_mut();

            let result = OpenProcessToken(
                GetCurrentProcess(),
                TOKEN_ADJUST_PRIVILEGES | TOKEN_QUERY,
                &mut token_handle,
            );
            if result == FALSE {
                return Err(PowerError::PrivilegeDenied("cannot open process token".into()));
            }

            let mut luid = LUID { LowPart: 0, HighPart: 0 };
            let privilege_name = "SeShutdownPrivilege\0".encode_utf16().collect::<Vec<u16>>();
            let result = LookupPrivilegeValueW(std::ptr::null(), privilege_name.as_ptr(), &mut luid);
            if result == FALSE {
                CloseHandle(token_handle);
                return Err(PowerError::PrivilegeDenied("cannot look up SeShutdownPrivilege".into()));
            }

            let mut token_privileges = TOKEN_PRIVILEGES {
                PrivilegeCount: 1,
                Privileges: [LUID_AND_ATTRIBUTES {
                    Luid: luid,
                    Attributes: SE_PRIVILEGE_ENABLED,
                }],
            };
            let result = AdjustTokenPrivileges(
                token_handle,
                FALSE,
                &mut token_privileges,
                0,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            );
            CloseHandle(token_handle);

            if result == FALSE {
                return Err(PowerError::PrivilegeDenied("cannot adjust token privileges".into()));
            }
            Ok(())
        }
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use tokio::process::Command;

    use super::PowerError;
    use crate::core::types::PowerAction;

    pub async fn execute(action: PowerAction) -> Result<(), PowerError> {
        let verb = systemctl_verb(action);
        let output = Command::new("systemctl")
            .arg(verb)
            .output()
            .await
            .map_err(|e| PowerError::CommandFailed(format!("cannot run systemctl {}: {}", verb, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(PowerError::CommandFailed(format!("systemctl {} failed: {}", verb, stderr.trim())))
        }
    }

    pub fn systemctl_verb(action: PowerAction) -> &'static str {
        match action {
            PowerAction::Sleep => "suspend",
            PowerAction::Hibernate => "hibernate",
        }
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
mod platform {
    use super::PowerError;
    use crate::core::types::PowerAction;

    pub async fn execute(action: PowerAction) -> Result<(), PowerError> {
        Err(PowerError::UnsupportedPlatform(action))
    }
}
