use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 签到会话状态
//
// 只有 Open / Closed 两个持久化状态；“空闲”即该班级当前没有 Open 会话，
// 不单独落库。窗口是否仍然开放一律以 `is_open_at` 现算，不信任缓存布尔值。
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub enum SessionStatus {
    Open,   // 开放中
    Closed, // 已关闭
}

impl SessionStatus {
    pub const OPEN: &'static str = "open";
    pub const CLOSED: &'static str = "closed";
}

impl<'de> Deserialize<'de> for SessionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            SessionStatus::OPEN => Ok(SessionStatus::Open),
            SessionStatus::CLOSED => Ok(SessionStatus::Closed),
            _ => Err(serde::de::Error::custom(format!(
                "无效的会话状态: '{s}'. 支持的状态: open, closed"
            ))),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Open => write!(f, "{}", SessionStatus::OPEN),
            SessionStatus::Closed => write!(f, "{}", SessionStatus::CLOSED),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(SessionStatus::Open),
            "closed" => Ok(SessionStatus::Closed),
            _ => Err(format!("Invalid session status: {s}")),
        }
    }
}

// 签到会话
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub struct AttendanceSession {
    pub id: i64,
    pub classroom_id: i64,
    /// 会话所属日期（YYYY-MM-DD，按 UTC）
    pub session_date: String,
    pub status: SessionStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AttendanceSession {
    /// 窗口是否在 `now` 时刻开放
    ///
    /// `now == deadline` 即视为关闭；到点后即使还没有人调用
    /// stop，任何读写路径也必须观察到 Closed。
    pub fn is_open_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.status == SessionStatus::Open && now < self.deadline
    }

    /// `now` 时刻的剩余秒数，向下取整，最小为 0
    pub fn time_remaining_at(&self, now: chrono::DateTime<chrono::Utc>) -> i64 {
        if !self.is_open_at(now) {
            return 0;
        }
        (self.deadline - now).num_seconds().max(0)
    }
}

// 签到记录（账本条目）
//
// ledger_key 是去重桶：按配置取会话日期或会话 ID，
// (classroom_id, ledger_key, student_id) 上有唯一索引。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub classroom_id: i64,
    pub session_id: i64,
    pub ledger_key: String,
    pub student_id: i64,
    pub student_name: String,
    pub photo_token: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn session_at(started: chrono::DateTime<Utc>, duration_secs: i64) -> AttendanceSession {
        AttendanceSession {
            id: 1,
            classroom_id: 1,
            session_date: started.format("%Y-%m-%d").to_string(),
            status: SessionStatus::Open,
            started_at: started,
            deadline: started + Duration::seconds(duration_secs),
            closed_at: None,
        }
    }

    #[test]
    fn test_open_before_deadline() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let session = session_at(t0, 300);

        assert!(session.is_open_at(t0 + Duration::seconds(10)));
        assert!(session.is_open_at(t0 + Duration::seconds(299)));
    }

    #[test]
    fn test_closed_at_and_after_deadline() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let session = session_at(t0, 300);

        // 恰好到点即关闭，不依赖任何定时器
        assert!(!session.is_open_at(t0 + Duration::seconds(300)));
        assert!(!session.is_open_at(t0 + Duration::seconds(301)));
    }

    #[test]
    fn test_closed_status_overrides_clock() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let mut session = session_at(t0, 300);
        session.status = SessionStatus::Closed;
        session.closed_at = Some(t0 + Duration::seconds(120));

        // 提前手动关闭后，即使还没到 deadline 也必须是关闭状态
        assert!(!session.is_open_at(t0 + Duration::seconds(150)));
        assert_eq!(session.time_remaining_at(t0 + Duration::seconds(150)), 0);
    }

    #[test]
    fn test_time_remaining_counts_down() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let session = session_at(t0, 300);

        assert_eq!(session.time_remaining_at(t0), 300);
        assert_eq!(session.time_remaining_at(t0 + Duration::seconds(1)), 299);
        assert_eq!(session.time_remaining_at(t0 + Duration::seconds(299)), 1);
        assert_eq!(session.time_remaining_at(t0 + Duration::seconds(300)), 0);
        assert_eq!(session.time_remaining_at(t0 + Duration::seconds(400)), 0);
    }

    #[test]
    fn test_session_status_parse_roundtrip() {
        assert_eq!("open".parse::<SessionStatus>(), Ok(SessionStatus::Open));
        assert_eq!("closed".parse::<SessionStatus>(), Ok(SessionStatus::Closed));
        assert!("idle".parse::<SessionStatus>().is_err());
        assert_eq!(SessionStatus::Open.to_string(), "open");
        assert_eq!(SessionStatus::Closed.to_string(), "closed");
    }
}
