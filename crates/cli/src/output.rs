//! Terminal output utilities
//!
//! Status lines go to stderr so that command results on stdout stay pipeable.

use console::measure_text_width;
use infraplan_core::Error;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        eprintln!("{} {}", "ℹ".blue(), message);
    }

    /// Print a coded error with its context and suggestion
    pub fn report(error: &Error) {
        eprintln!("{} {} {}", "✗".red(), format!("[{}]", error.code).dimmed(), error.message);
        if let Some(context) = &error.context {
            eprintln!("  {}", context.dimmed());
        }
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  {} {}", "hint:".cyan(), suggestion);
        }
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(measure_text_width(message)));
    }
}

/// Render `label: value` rows with the values aligned, one row per line
pub fn key_value_table(rows: &[(&str, String)]) -> String {
    let width = rows
        .iter()
        .map(|(label, _)| measure_text_width(label))
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(label, value)| {
            let pad = width - measure_text_width(label);
            format!("{label}:{} {value}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Colored block followed by the hex code, e.g. for legend entries
pub fn swatch(hex: &str) -> String {
    match parse_hex(hex) {
        Some((r, g, b)) => format!("{} {hex}", "■■".truecolor(r, g, b)),
        None => hex.to_string(),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Format a duration for display
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{mins}m {remaining_secs:.0}s")
    }
}

/// Format a distance in meters: meters below 1 km, kilometers above
pub fn format_distance(meters: f64) -> String {
    if !meters.is_finite() {
        "n/a".to_string()
    } else if meters < 1000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Format an area in square kilometers
pub fn format_area(km2: f64) -> String {
    format!("{km2:.1} km²")
}

/// Format a coordinate pair as `lat, lng` with 5 decimals (about 1 m)
pub fn format_coords(lat: f64, lng: f64) -> String {
    format!("{lat:.5}, {lng:.5}")
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration(Duration::from_secs_f32(5.5)), "5.5s");
    }

    #[test]
    fn test_format_duration_mins() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(850.4), "850 m");
        assert_eq!(format_distance(1250.0), "1.25 km");
        assert_eq!(format_distance(f64::INFINITY), "n/a");
    }

    #[test]
    fn test_format_area_and_coords() {
        assert_eq!(format_area(305.66), "305.7 km²");
        assert_eq!(format_coords(42.85, 74.6), "42.85000, 74.60000");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1, "cell", "cells"), "1 cell");
        assert_eq!(format_count(5, "cell", "cells"), "5 cells");
    }

    #[test]
    fn test_key_value_table_aligns_cyrillic() {
        let table = key_value_table(&[
            ("Школа", "2 km".to_string()),
            ("Детский сад", "1.5 km".to_string()),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Школа:       2 km");
        assert_eq!(lines[1], "Детский сад: 1.5 km");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#4CAF50"), Some((0x4C, 0xAF, 0x50)));
        assert_eq!(parse_hex("4CAF50"), None);
        assert_eq!(parse_hex("#FFF"), None);
        assert_eq!(parse_hex("#ZZZZZZ"), None);
        assert_eq!(swatch("red"), "red");
    }
}
