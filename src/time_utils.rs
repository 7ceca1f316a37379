use chrono::{DateTime, TimeZone, Utc};

/// Retourne le timestamp courant en UTC
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as fractional seconds since epoch (the unit messages carry).
pub fn now_secs() -> f64 {
    let dt = now();
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1_000_000.0
}

/// Lower bound of a trailing window ending at `now`.
pub fn window_start(now: f64, window_secs: f64) -> f64 {
    now - window_secs
}

/// Render an epoch-seconds timestamp for humans; `None` if out of range.
pub fn format_secs(secs: f64) -> Option<String> {
    if !secs.is_finite() {
        return None;
    }
    Utc.timestamp_opt(secs.floor() as i64, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}
