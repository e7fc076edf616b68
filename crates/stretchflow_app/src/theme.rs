// SPDX-License-Identifier: MIT OR Apache-2.0
//! Terminal theme.
//!
//! Resolves the system dark/light preference used when nothing has been
//! saved, and maps the dark-mode flag and countdown urgency to ANSI colours.

use stretchflow_routine::TimeBand;

/// Environment variable forcing the system preference (`dark` or `light`)
pub const THEME_ENV: &str = "STRETCHFLOW_THEME";

/// ANSI reset sequence
pub const RESET: &str = "\x1b[0m";

/// Whether the environment asks for a dark theme
pub fn system_prefers_dark() -> bool {
    let forced = std::env::var(THEME_ENV).ok();
    let colorfgbg = std::env::var("COLORFGBG").ok();
    resolve_system_dark(forced.as_deref(), colorfgbg.as_deref())
}

fn resolve_system_dark(forced: Option<&str>, colorfgbg: Option<&str>) -> bool {
    match forced.map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("dark") => return true,
        Some(value) if value.eq_ignore_ascii_case("light") => return false,
        _ => {}
    }
    colorfgbg.and_then(parse_colorfgbg).unwrap_or(false)
}

/// Read the terminal background from `COLORFGBG` (`fg;bg` or `fg;x;bg`).
///
/// Background colours 0-6 and 8 are dark.
fn parse_colorfgbg(value: &str) -> Option<bool> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(background, 0..=6 | 8))
}

/// Colours for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Titles and pose names
    pub accent: &'static str,
    /// Secondary text
    pub muted: &'static str,
    /// Completion messages
    pub success: &'static str,
    /// Error messages
    pub error: &'static str,
}

impl Palette {
    /// Palette for the dark-mode flag
    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self {
                accent: "\x1b[1;38;5;147m",
                muted: "\x1b[38;5;250m",
                success: "\x1b[38;5;79m",
                error: "\x1b[38;5;210m",
            }
        } else {
            Self {
                accent: "\x1b[1;38;5;62m",
                muted: "\x1b[38;5;242m",
                success: "\x1b[38;5;35m",
                error: "\x1b[38;5;160m",
            }
        }
    }

    /// Countdown colour: blue, then yellow, then red
    pub fn band(&self, band: TimeBand) -> &'static str {
        match band {
            TimeBand::Plenty => "\x1b[38;5;63m",
            TimeBand::Half => "\x1b[38;5;178m",
            TimeBand::Low => "\x1b[38;5;203m",
        }
    }
}

/// Human name for the dark-mode flag
pub fn mode_name(dark: bool) -> &'static str {
    if dark {
        "dark"
    } else {
        "light"
    }
}
