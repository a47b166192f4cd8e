use chrono::Utc;
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// True when `exp_unix_ts` is strictly after `now_unix_ts`.
pub fn is_in_future(exp_unix_ts: i64, now_unix_ts: i64) -> bool {
    exp_unix_ts > now_unix_ts
}
