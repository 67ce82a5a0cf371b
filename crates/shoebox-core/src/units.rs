/// Binary size suffixes, each step a factor of 1024.
const BYTE_SUFFIXES: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human readable size with two decimals, e.g. `1.50KB` or `3.00MB`.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut suffix = BYTE_SUFFIXES[0];

    for candidate in BYTE_SUFFIXES {
        suffix = candidate;
        if value < 1024.0 {
            break;
        }
        if candidate != BYTE_SUFFIXES[BYTE_SUFFIXES.len() - 1] {
            value /= 1024.0;
        }
    }

    let formatted = format!("{:.2}", value);
    let (integer, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    format!("{}.{}{}", group_thousands(integer), fraction, suffix)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
