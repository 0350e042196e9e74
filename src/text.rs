//! Display helpers for untrusted remote text.

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count as a human-readable size with two decimals.
/// Anything at or above the GB unit stays in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut exp = 0;
    while value >= 1024.0 && exp < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        exp += 1;
    }

    format!("{:.2} {}", value, SIZE_UNITS[exp])
}

/// Scrubs untrusted API text before it reaches the terminal.
///
/// Control bytes (including ESC, so remote names cannot smuggle terminal
/// escape sequences) and markup-significant punctuation are removed.
pub fn sanitize_display(unsafe_text: &str) -> String {
    unsafe_text
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '<' | '>' | '&' | '"' | '\''))
        .collect()
}
