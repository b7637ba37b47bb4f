//! Human-readable units: byte sizes, uptime, one-decimal rounding.

const SIZES: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Formats a byte count with binary prefixes, e.g. `1536 -> "1.5 KB"`.
/// At most `decimals` fraction digits are kept; trailing zeros are dropped.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".into();
    }
    let mut idx = 0usize;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && idx < SIZES.len() - 1 {
        scaled /= 1024.0;
        idx += 1;
    }
    let mut text = format!("{scaled:.decimals$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    format!("{text} {}", SIZES[idx])
}

/// Formats uptime seconds as `"D days, H hours, M minutes"`.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    format!("{days} days, {hours} hours, {minutes} minutes")
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_contract() {
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(1024, 2), "1 KB");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(1000, 2), "1000 Bytes");
        assert_eq!(format_bytes(16 * 1024 * 1024 * 1024, 2), "16 GB");
        assert_eq!(format_bytes(1_234_567, 2), "1.18 MB");
    }

    #[test]
    fn uptime_contract() {
        assert_eq!(format_uptime(90_061), "1 days, 1 hours, 1 minutes");
        assert_eq!(format_uptime(59), "0 days, 0 hours, 0 minutes");
        assert_eq!(format_uptime(3 * 86_400 + 7_200), "3 days, 2 hours, 0 minutes");
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(round1(0.05), 0.1);
    }
}
