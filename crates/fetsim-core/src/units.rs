//! SPICE number syntax: scale suffixes on input, SI prefixes on output.

/// Scale suffixes, longest first so `MEG` wins over `M`.
const SCALE_SUFFIXES: &[(&str, f64)] = &[
    ("MEG", 1e6),
    ("MIL", 25.4e-6),
    ("T", 1e12),
    ("G", 1e9),
    ("K", 1e3),
    ("M", 1e-3),
    ("U", 1e-6),
    ("N", 1e-9),
    ("P", 1e-12),
    ("F", 1e-15),
];

/// Parse a SPICE-style number such as `1e-14`, `4.7k`, `10pF` or `2MEGohm`.
///
/// As in SPICE, letters following a recognised scale suffix (a unit name)
/// are ignored; a bare unit with no scale (`5V`) is accepted too.
pub fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim().to_ascii_uppercase();
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }

    // Longest numeric prefix; the exponent marker only counts when a digit
    // or sign follows, otherwise `E` would swallow nothing useful.
    let bytes = s.as_bytes();
    let mut end = 0;
    while end < bytes.len() {
        let c = bytes[end];
        let exponent = c == b'E'
            && bytes
                .get(end + 1)
                .is_some_and(|n| n.is_ascii_digit() || *n == b'-' || *n == b'+');
        if c.is_ascii_digit() || c == b'.' || exponent || (end == 0 && (c == b'-' || c == b'+')) {
            end += 1;
        } else if (c == b'-' || c == b'+') && bytes[end - 1] == b'E' {
            end += 1;
        } else {
            break;
        }
    }
    if end == 0 {
        return None;
    }

    let (num, rest) = s.split_at(end);
    let value: f64 = num.parse().ok()?;
    if !rest.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let scale = SCALE_SUFFIXES
        .iter()
        .find(|(suffix, _)| rest.starts_with(suffix))
        .map_or(1.0, |(_, scale)| *scale);
    Some(value * scale)
}

/// Format a value with an SI prefix, e.g. `4.0000m`.
pub fn format_value(value: f64) -> String {
    const PREFIXES: &[(f64, &str)] = &[
        (1e12, "T"),
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
        (1.0, ""),
        (1e-3, "m"),
        (1e-6, "u"),
        (1e-9, "n"),
        (1e-12, "p"),
        (1e-15, "f"),
    ];

    let magnitude = value.abs();
    match PREFIXES.iter().find(|(scale, _)| magnitude >= *scale) {
        Some((scale, prefix)) => format!("{:.4}{}", value / scale, prefix),
        None if magnitude == 0.0 => format!("{:.4}", 0.0),
        None => format!("{value:.4e}"),
    }
}
