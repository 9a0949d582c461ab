// Rounding and display helpers for monetary amounts

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format with thousands separators, e.g. `1234567.8` with 0 decimals -> `1,234,568`
pub fn with_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((w, f)) => (w.to_string(), Some(f.to_string())),
        None => (formatted, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && value.abs() >= 0.5 * 10f64.powi(-(decimals as i32)) {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Human file size: "512 B", "1.5 KB", "2.3 MB"
pub fn file_size_label(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345_6, 2), 12.35);
        assert_eq!(round_to(99.95, 1), 100.0);
        assert_eq!(round_to(-1.005_1, 2), -1.01);
    }

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(1_234_567.8, 0), "1,234,568");
        assert_eq!(with_thousands(999.0, 0), "999");
        assert_eq!(with_thousands(1000.5, 2), "1,000.50");
        assert_eq!(with_thousands(-2500.0, 0), "-2,500");
    }

    #[test]
    fn test_file_size_label() {
        assert_eq!(file_size_label(512), "512 B");
        assert_eq!(file_size_label(1536), "1.5 KB");
        assert_eq!(file_size_label(5 * 1024 * 1024), "5.0 MB");
    }
}
