//! # 時刻の取得
//!
//! Todo の `created_at`（永続化形式では `createAt`）は作成時に一度だけ打刻する。
//! 打刻する時刻をユースケースへ注入できるよう、ここで抽象化する。

use chrono::{DateTime, Utc};

/// 作成日時の打刻に使う時刻源
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// OS の時計を読む
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 常に同じ時刻を返す
///
/// テストでレスポンスの `created_at` を固定値と比較するために使う。
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_fixed_clockは指定した時刻で打刻し続ける() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        let clock: &dyn Clock = &FixedClock::new(at);

        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }

    #[test]
    fn test_system_clockは呼び出し前後の時刻の間を返す() {
        let before = Utc::now();

        let stamped = SystemClock.now();

        assert!(before <= stamped && stamped <= Utc::now());
    }
}
