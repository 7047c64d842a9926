pub fn now() -> i64 {
    let now = chrono::Local::now();
    now.timestamp()
}

/// 毫秒时间戳，实体 create_at/update_at 统一用毫秒
pub fn now_millis() -> i64 {
    let now = chrono::Local::now();
    now.timestamp_millis()
}
