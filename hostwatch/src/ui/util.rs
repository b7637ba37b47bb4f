//! Small UI helpers: truncation and timeline colors.

use ratatui::style::Color;

pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}

/// `#rrggbb` to a terminal color; anything else renders gray.
pub fn hex_color(s: &str) -> Color {
    let parse = |s: &str| -> Option<Color> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let v = u32::from_str_radix(hex, 16).ok()?;
        Some(Color::Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
    };
    parse(s).unwrap_or(Color::Gray)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_in_the_middle() {
        assert_eq!(truncate_middle("short", 10), "short");
        assert_eq!(truncate_middle("abcdefghijkl", 9), "abc...jkl");
        assert_eq!(truncate_middle("abcdef", 3), "...");
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(hex_color("#4285F4"), Color::Rgb(0x42, 0x85, 0xF4));
        assert_eq!(hex_color("4285F4"), Color::Gray);
        assert_eq!(hex_color("#zzz"), Color::Gray);
    }
}
