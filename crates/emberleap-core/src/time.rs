/// Seconds since the Unix epoch.
pub fn unix_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Returns a simple ISO 8601 timestamp (Unix epoch seconds with Z suffix).
pub fn timestamp_now() -> String {
    format!("{}Z", unix_secs())
}
