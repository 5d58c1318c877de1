//! 延迟执行模块
//!
//! 在UI之外等待调度时长，到期后检查取消标志并执行电源操作

use std::sync::Arc;

use log::{info, warn};

use crate::core::countdown::ticks_to_duration;
use crate::core::power::{PowerBackend, PowerError};
use crate::core::types::{ActionOutcome, CancelFlag, ScheduleId, ScheduleRequest};

/// 延迟动作执行器
///
/// 每个调度对应一次 `run` 调用，等待期间不可中断，
/// 取消只在等待结束后的检查中生效
#[derive(Debug)]
pub struct DeferredActionRunner<B> {
    /// 电源操作后端
    backend: Arc<B>,
}

impl<B> Clone for DeferredActionRunner<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: PowerBackend> DeferredActionRunner<B> {
    /// 创建新的执行器
    ///
    /// # 参数
    ///
    /// * `backend` - 电源操作后端
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// 等待调度时长后执行电源操作
    ///
    /// # 参数
    ///
    /// * `schedule_id` - 调度标识，仅用于日志
    /// * `request` - 已校验的调度请求
    /// * `cancel_flag` - 与倒计时引擎共享的取消标志
    pub fn run(
        &self,
        schedule_id: ScheduleId,
        request: ScheduleRequest,
        cancel_flag: CancelFlag,
    ) -> impl std::future::Future<Output = ActionOutcome> + Send + 'static {
        let backend = Arc::clone(&self.backend);

        async move {
            let delay = ticks_to_duration(request.duration_seconds());
            info!("调度 {}: {}秒后执行 {}", schedule_id, delay.as_secs(), request.action());

            tokio::time::sleep(delay).await;

            if cancel_flag.is_cancelled() {
                info!("调度 {} 已取消，跳过电源操作", schedule_id);
                return ActionOutcome::Skipped;
            }

            match backend.execute(request.action()).await {
                Ok(()) => ActionOutcome::Executed,
                Err(PowerError::UnsupportedPlatform(action)) => {
                    warn!("当前平台不支持 {}", action);
                    ActionOutcome::Unsupported
                }
                Err(e) => ActionOutcome::Failed(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::countdown::{CountdownEngine, TICK_INTERVAL};
    use crate::core::types::{CountdownUpdate, PowerAction};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};
    use uuid::Uuid;

    /// 记录调用而不真正执行的后端
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<PowerAction>>,
        result: Option<PowerError>,
    }

    impl RecordingBackend {
        fn failing(error: PowerError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                result: Some(error),
            }
        }
    }

    impl PowerBackend for RecordingBackend {
        async fn execute(&self, action: PowerAction) -> Result<(), PowerError> {
            self.calls.lock().unwrap().push(action);
            match &self.result {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn request(seconds: i64, action: PowerAction) -> ScheduleRequest {
        ScheduleRequest::new(seconds, action).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_action_after_delay() {
        let runner = DeferredActionRunner::new(RecordingBackend::default());
        let started = tokio::time::Instant::now();

        let outcome = runner
            .run(Uuid::new_v4(), request(10, PowerAction::Sleep), CancelFlag::new())
            .await;

        assert_eq!(outcome, ActionOutcome::Executed);
        assert!(started.elapsed() >= Duration::from_secs(10));
        assert_eq!(*runner.backend.calls.lock().unwrap(), vec![PowerAction::Sleep]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stays_pending_until_deadline() {
        let runner = DeferredActionRunner::new(RecordingBackend::default());
        let mut task = task::spawn(runner.run(
            Uuid::new_v4(),
            request(10, PowerAction::Sleep),
            CancelFlag::new(),
        ));

        assert_pending!(task.poll());
        tokio::time::advance(Duration::from_secs(9)).await;
        assert_pending!(task.poll());
        assert!(runner.backend.calls.lock().unwrap().is_empty());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(assert_ready!(task.poll()), ActionOutcome::Executed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ends_on_the_same_tick_clock_as_countdown() {
        let runner = DeferredActionRunner::new(RecordingBackend::default());
        let mut engine = CountdownEngine::new();
        engine.start(5).unwrap();

        let mut worker = task::spawn(runner.run(
            engine.schedule_id().unwrap(),
            request(5, PowerAction::Sleep),
            engine.cancel_flag(),
        ));
        assert_pending!(worker.poll());

        let mut ticks = 0;
        loop {
            tokio::time::advance(TICK_INTERVAL).await;
            ticks += 1;
            match engine.tick() {
                Some(CountdownUpdate::Progress { remaining, .. }) if remaining > 0 => {
                    // 倒计时未结束时后台仍在等待，取消依然有效
                    assert_pending!(worker.poll());
                    assert!(runner.backend.calls.lock().unwrap().is_empty());
                }
                Some(CountdownUpdate::Progress { .. }) => {}
                Some(CountdownUpdate::Expired { .. }) => break,
                other => panic!("unexpected update: {:?}", other),
            }
        }

        assert_eq!(ticks, 6);
        assert_eq!(assert_ready!(worker.poll()), ActionOutcome::Executed);
        assert_eq!(*runner.backend.calls.lock().unwrap(), vec![PowerAction::Sleep]);
        assert!(engine.cancel().is_none());
    }

    #[test]
    fn test_ticks_to_duration() {
        assert_eq!(ticks_to_duration(0), Duration::ZERO);
        assert_eq!(ticks_to_duration(90), TICK_INTERVAL * 90);
        assert_eq!(ticks_to_duration(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait_suppresses_action() {
        let runner = DeferredActionRunner::new(RecordingBackend::default());
        let mut engine = CountdownEngine::new();
        engine.start(5).unwrap();

        let handle = tokio::spawn(runner.run(
            engine.schedule_id().unwrap(),
            request(5, PowerAction::Hibernate),
            engine.cancel_flag(),
        ));

        tokio::time::sleep(Duration::from_secs(2)).await;
        engine.tick();
        engine.tick();
        assert_eq!(engine.state().remaining_seconds, 3);
        engine.cancel();

        // 等待不可中断，执行器仍然等满剩余时间
        let started = tokio::time::Instant::now();
        let outcome = handle.await.unwrap();
        assert_eq!(outcome, ActionOutcome::Skipped);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(runner.backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_platform_is_reported() {
        let runner = DeferredActionRunner::new(RecordingBackend::failing(
            PowerError::UnsupportedPlatform(PowerAction::Hibernate),
        ));

        let outcome = runner
            .run(Uuid::new_v4(), request(1, PowerAction::Hibernate), CancelFlag::new())
            .await;

        assert_eq!(outcome, ActionOutcome::Unsupported);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_failure_is_not_retried() {
        let runner = DeferredActionRunner::new(RecordingBackend::failing(
            PowerError::CommandFailed("denied".into()),
        ));

        let outcome = runner
            .run(Uuid::new_v4(), request(1, PowerAction::Sleep), CancelFlag::new())
            .await;

        assert!(matches!(outcome, ActionOutcome::Failed(reason) if reason.contains("denied")));
        assert_eq!(runner.backend.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_worker_stays_cancelled_after_reschedule() {
        let runner = DeferredActionRunner::new(RecordingBackend::default());
        let mut engine = CountdownEngine::new();

        engine.start(5).unwrap();
        let stale = tokio::spawn(runner.run(
            engine.schedule_id().unwrap(),
            request(5, PowerAction::Sleep),
            engine.cancel_flag(),
        ));
        engine.cancel();

        engine.start(20).unwrap();
        let fresh = tokio::spawn(runner.run(
            engine.schedule_id().unwrap(),
            request(20, PowerAction::Hibernate),
            engine.cancel_flag(),
        ));

        assert_eq!(stale.await.unwrap(), ActionOutcome::Skipped);
        assert_eq!(fresh.await.unwrap(), ActionOutcome::Executed);
        assert_eq!(*runner.backend.calls.lock().unwrap(), vec![PowerAction::Hibernate]);
    }
}
