//! Severity bucketing and display formatting for the overview stat cards.

/// Fixed-threshold severity tier behind a stat card's coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Default,
    Low,
    Medium,
    High,
}

pub fn packet_count_severity(count: u64) -> Severity {
    if count > 100_000 {
        Severity::High
    } else if count > 10_000 {
        Severity::Medium
    } else if count > 0 {
        Severity::Low
    } else {
        Severity::Default
    }
}

pub fn packet_size_severity(avg_bytes: f64) -> Severity {
    if avg_bytes > 1500.0 {
        Severity::High
    } else if avg_bytes > 500.0 {
        Severity::Medium
    } else {
        Severity::Default
    }
}

pub fn capture_duration_severity(seconds: f64) -> Severity {
    if seconds < 60.0 {
        Severity::Low
    } else if seconds < 300.0 {
        Severity::Medium
    } else {
        Severity::High
    }
}

pub fn packet_rate_severity(packets_per_second: f64) -> Severity {
    if packets_per_second > 1000.0 {
        Severity::High
    } else if packets_per_second > 100.0 {
        Severity::Medium
    } else {
        Severity::Default
    }
}

/// Formats a capture duration with a qualitative label.
pub fn format_capture_duration(seconds: f64) -> (String, &'static str) {
    if seconds < 60.0 {
        (format!("{seconds:.2}s"), "Very short capture")
    } else if seconds < 300.0 {
        (format!("{:.2}m", seconds / 60.0), "Short capture")
    } else if seconds < 3600.0 {
        (format!("{:.2}m", seconds / 60.0), "Medium capture")
    } else {
        (format!("{:.2}h", seconds / 3600.0), "Long capture")
    }
}

/// Well-known service name for a port, or "" when unknown.
pub fn service_name(port: u32) -> &'static str {
    match port {
        20 => "FTP Data",
        21 => "FTP Control",
        22 => "SSH",
        23 => "Telnet",
        25 => "SMTP",
        53 => "DNS",
        80 => "HTTP",
        110 => "POP3",
        143 => "IMAP",
        443 => "HTTPS",
        465 => "SMTPS",
        587 => "SMTP",
        993 => "IMAPS",
        995 => "POP3S",
        1883 => "MQTT",
        3306 => "MySQL",
        3389 => "RDP",
        5353 => "mDNS",
        8080 => "HTTP Alt",
        8443 => "HTTPS Alt",
        8883 => "MQTT/SSL",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_count_buckets() {
        assert_eq!(packet_count_severity(0), Severity::Default);
        assert_eq!(packet_count_severity(9_312), Severity::Low);
        assert_eq!(packet_count_severity(10_001), Severity::Medium);
        assert_eq!(packet_count_severity(100_001), Severity::High);
    }

    #[test]
    fn packet_size_buckets() {
        assert_eq!(packet_size_severity(134.99), Severity::Default);
        assert_eq!(packet_size_severity(501.0), Severity::Medium);
        assert_eq!(packet_size_severity(1501.0), Severity::High);
    }

    #[test]
    fn duration_formatting_scales_units() {
        assert_eq!(
            format_capture_duration(146.62),
            ("2.44m".to_string(), "Short capture")
        );
        assert_eq!(format_capture_duration(10.0).1, "Very short capture");
        assert_eq!(format_capture_duration(7200.0).0, "2.00h");
    }

    #[test]
    fn service_names_cover_common_ports() {
        assert_eq!(service_name(8883), "MQTT/SSL");
        assert_eq!(service_name(443), "HTTPS");
        assert_eq!(service_name(12345), "");
    }
}
