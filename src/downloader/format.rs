//! Human-readable sizes with binary (1024-based) prefixes

const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Format a byte count, e.g. `245.3 MiB`. Values past ZiB stay in YiB.
pub fn human_size(bytes: f64) -> String {
    let mut num = bytes;
    for unit in UNITS {
        if num.abs() < 1024.0 {
            return format!("{:.1} {}B", num, unit);
        }
        num /= 1024.0;
    }
    format!("{:.1} YiB", num)
}

/// Format an optional size, `?` when unknown
pub fn human_size_opt(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => human_size(b as f64),
        None => "?".to_string(),
    }
}

/// Format a transfer rate, `--/s` when unknown or zero
pub fn human_speed(bytes_per_sec: Option<f64>) -> String {
    match bytes_per_sec {
        Some(speed) if speed > 0.0 && speed.is_finite() => format!("{}/s", human_size(speed)),
        _ => "--/s".to_string(),
    }
}
