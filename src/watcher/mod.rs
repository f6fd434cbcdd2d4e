//! 会话观察器
//!
//! 无推送通道时客户端消费会话状态的标准姿势：固定间隔轮询 status
//! 接口，两次轮询之间用本地倒计时驱动界面。本地倒计时只是展示用，
//! 永远不作为提交门槛的依据——权威判定始终在服务端的 submit 路径。
//!
//! 轮询失败只代表“未知”，不代表“已关闭”：保留上一次成功取回的
//! 状态，等下一次轮询再同步。倒计时归零后客户端乐观地视为关闭，
//! 即使下一次轮询还没确认。

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{AttendanceError, Result};
use crate::models::ApiResponse;
use crate::models::attendance::responses::SessionStatusResponse;

/// 轮询间隔下限与上限（秒）
const MIN_POLL_SECS: u64 = 3;
const MAX_POLL_SECS: u64 = 5;

/// 会话状态来源
///
/// 生产环境走 HTTP，测试里用内存 mock 按脚本喂状态。
#[async_trait]
pub trait SessionStatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<SessionStatusResponse>;
}

/// 经由后端 status 接口取状态的 HTTP 来源
pub struct HttpStatusSource {
    client: reqwest::Client,
    status_url: String,
    access_token: String,
}

impl HttpStatusSource {
    pub fn new(base_url: &str, classroom_id: i64, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            status_url: format!(
                "{}/api/v1/classrooms/{}/attendance/session/status",
                base_url.trim_end_matches('/'),
                classroom_id
            ),
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl SessionStatusSource for HttpStatusSource {
    async fn fetch_status(&self) -> Result<SessionStatusResponse> {
        let envelope: ApiResponse<SessionStatusResponse> = self
            .client
            .get(&self.status_url)
            .bearer_auth(&self.access_token)
            .send()
            .await?
            .json()
            .await?;

        match envelope.data {
            Some(status) if envelope.code == 0 => Ok(status),
            _ => Err(AttendanceError::transport(format!(
                "status endpoint returned code {}: {}",
                envelope.code, envelope.message
            ))),
        }
    }
}

/// 观察器眼中的会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    /// 还没有成功拉到过状态
    Unknown,
    Open,
    Closed,
}

/// 最近一次同步得到的会话快照
#[derive(Debug, Clone)]
pub struct WatchedState {
    pub phase: WatchPhase,
    /// 本地倒计时（秒），展示用
    pub time_remaining: i64,
    pub session_id: Option<i64>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
}

impl WatchedState {
    fn unknown() -> Self {
        Self {
            phase: WatchPhase::Unknown,
            time_remaining: 0,
            session_id: None,
            deadline: None,
        }
    }
}

/// 会话观察器
pub struct SessionWatcher {
    source: Arc<dyn SessionStatusSource>,
    state: WatchedState,
    poll_interval: Duration,
}

impl SessionWatcher {
    pub fn new(source: Arc<dyn SessionStatusSource>, poll_secs: u64) -> Self {
        Self {
            source,
            state: WatchedState::unknown(),
            poll_interval: Duration::from_secs(poll_secs.clamp(MIN_POLL_SECS, MAX_POLL_SECS)),
        }
    }

    pub fn state(&self) -> &WatchedState {
        &self.state
    }

    /// 客户端此刻是否还允许发起提交
    ///
    /// 倒计时归零即拒绝，不等下一次轮询确认；Unknown 阶段同样拒绝。
    /// 这只是乐观的客户端闸门，服务端 submit 仍会权威复核。
    pub fn submission_allowed(&self) -> bool {
        self.state.phase == WatchPhase::Open && self.state.time_remaining > 0
    }

    /// 拉一次状态并与服务端对齐
    ///
    /// 失败时保留上一次成功的快照，不把失败当成“已关闭”。
    pub async fn poll_once(&mut self) -> Result<()> {
        match self.source.fetch_status().await {
            Ok(status) => {
                self.state = if status.is_open {
                    WatchedState {
                        phase: WatchPhase::Open,
                        time_remaining: status.time_remaining,
                        session_id: status.session_id,
                        deadline: status.deadline,
                    }
                } else {
                    WatchedState {
                        phase: WatchPhase::Closed,
                        time_remaining: 0,
                        session_id: None,
                        deadline: None,
                    }
                };
                Ok(())
            }
            Err(e) => {
                warn!("Status poll failed, keeping last known state: {}", e);
                Err(e)
            }
        }
    }

    /// 每秒一次的本地倒计时
    ///
    /// 只在两次轮询之间递减缓存值，下一次成功轮询会覆盖它。
    pub fn countdown_tick(&mut self) {
        if self.state.phase == WatchPhase::Open && self.state.time_remaining > 0 {
            self.state.time_remaining -= 1;
            if self.state.time_remaining == 0 {
                // 乐观关闭：不等服务端确认就先停止允许提交
                debug!("Local countdown reached zero, treating session as closed");
            }
        }
    }

    /// 轮询 + 倒计时主循环，收到停止信号后返回
    pub async fn run(&mut self, mut stop: tokio::sync::watch::Receiver<bool>) {
        let mut poll_timer = tokio::time::interval(self.poll_interval);
        let mut tick_timer = tokio::time::interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                _ = poll_timer.tick() => {
                    // 失败的轮询已经记过日志，循环继续即可
                    let _ = self.poll_once().await;
                }
                _ = tick_timer.tick() => {
                    self.countdown_tick();
                }
                _ = stop.changed() => {
                    if *stop.borrow() {
                        debug!("Session watcher stopping");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    /// 按脚本喂状态的 mock 来源
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<SessionStatusResponse>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<SessionStatusResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    #[async_trait]
    impl SessionStatusSource for ScriptedSource {
        async fn fetch_status(&self) -> Result<SessionStatusResponse> {
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(AttendanceError::transport("script exhausted")))
        }
    }

    fn open_status(time_remaining: i64) -> SessionStatusResponse {
        SessionStatusResponse {
            is_open: true,
            time_remaining,
            session_id: Some(7),
            deadline: Some(chrono::Utc::now() + chrono::Duration::seconds(time_remaining)),
        }
    }

    #[tokio::test]
    async fn test_poll_syncs_open_state() {
        let source = ScriptedSource::new(vec![Ok(open_status(120))]);
        let mut watcher = SessionWatcher::new(source, 3);

        assert_eq!(watcher.state().phase, WatchPhase::Unknown);
        assert!(!watcher.submission_allowed());

        watcher.poll_once().await.unwrap();
        assert_eq!(watcher.state().phase, WatchPhase::Open);
        assert_eq!(watcher.state().time_remaining, 120);
        assert_eq!(watcher.state().session_id, Some(7));
        assert!(watcher.submission_allowed());
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_last_known_state() {
        let source = ScriptedSource::new(vec![
            Ok(open_status(60)),
            Err(AttendanceError::transport("connection reset")),
        ]);
        let mut watcher = SessionWatcher::new(source, 3);

        watcher.poll_once().await.unwrap();
        assert!(watcher.submission_allowed());

        // 单次失败是“未知”，不是“已关闭”
        assert!(watcher.poll_once().await.is_err());
        assert_eq!(watcher.state().phase, WatchPhase::Open);
        assert_eq!(watcher.state().time_remaining, 60);
        assert!(watcher.submission_allowed());
    }

    #[tokio::test]
    async fn test_countdown_is_advisory_and_resyncs() {
        let source = ScriptedSource::new(vec![Ok(open_status(10)), Ok(open_status(8))]);
        let mut watcher = SessionWatcher::new(source, 3);

        watcher.poll_once().await.unwrap();
        watcher.countdown_tick();
        watcher.countdown_tick();
        watcher.countdown_tick();
        assert_eq!(watcher.state().time_remaining, 7);

        // 成功轮询以服务端值为准，本地递减被覆盖
        watcher.poll_once().await.unwrap();
        assert_eq!(watcher.state().time_remaining, 8);
    }

    #[tokio::test]
    async fn test_countdown_zero_closes_optimistically() {
        let source = ScriptedSource::new(vec![Ok(open_status(2))]);
        let mut watcher = SessionWatcher::new(source, 3);

        watcher.poll_once().await.unwrap();
        watcher.countdown_tick();
        assert!(watcher.submission_allowed());

        // 归零后立即禁止提交，不等下一次轮询确认
        watcher.countdown_tick();
        assert!(!watcher.submission_allowed());
        // 再 tick 也不会变成负数
        watcher.countdown_tick();
        assert_eq!(watcher.state().time_remaining, 0);
    }

    #[tokio::test]
    async fn test_closed_status_clears_state() {
        let source = ScriptedSource::new(vec![
            Ok(open_status(30)),
            Ok(SessionStatusResponse::closed()),
        ]);
        let mut watcher = SessionWatcher::new(source, 3);

        watcher.poll_once().await.unwrap();
        assert!(watcher.submission_allowed());

        watcher.poll_once().await.unwrap();
        assert_eq!(watcher.state().phase, WatchPhase::Closed);
        assert_eq!(watcher.state().session_id, None);
        assert!(!watcher.submission_allowed());
    }

    #[test]
    fn test_poll_interval_is_clamped() {
        let source = ScriptedSource::new(vec![]);
        let watcher = SessionWatcher::new(source.clone(), 1);
        assert_eq!(watcher.poll_interval, Duration::from_secs(3));

        let watcher = SessionWatcher::new(source, 60);
        assert_eq!(watcher.poll_interval, Duration::from_secs(5));
    }
}
