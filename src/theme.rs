use crate::color::Color;
use crate::config::types::Theme;
use crate::table::Tone;
use crate::types::StatusCode;

/// Detected terminal background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Dark,
    Light,
}

impl Background {
    /// Heuristic: read `COLORFGBG` ("fg;bg"), fall back to dark.
    pub fn detect() -> Self {
        if let Ok(val) = std::env::var("COLORFGBG")
            && let Some(bg) = val.rsplit(';').next()
            && let Ok(n) = bg.parse::<u8>()
            && n > 6
            && n != 8
        {
            return Background::Light;
        }
        Background::Dark
    }
}

/// Every color slot resolved to a concrete value.
#[derive(Debug, Clone)]
pub struct ResolvedTheme {
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_faint: Color,
    pub text_accent: Color,
    pub bg_selected: Color,
    pub border_primary: Color,
    pub border_faint: Color,
    pub status_none: Color,
    pub status_running: Color,
    pub status_error: Color,
    pub status_cancelled: Color,
    pub status_success: Color,
    pub status_skipped: Color,
}

impl ResolvedTheme {
    /// Overlay the user's colors on the defaults for `bg`.
    pub fn resolve(theme: &Theme, bg: Background) -> Self {
        let d = Self::defaults(bg);
        let text = &theme.colors.text;
        let status = &theme.colors.status;
        Self {
            text_primary: text.primary.unwrap_or(d.text_primary),
            text_secondary: text.secondary.unwrap_or(d.text_secondary),
            text_faint: text.faint.unwrap_or(d.text_faint),
            text_accent: text.accent.unwrap_or(d.text_accent),
            bg_selected: theme.colors.background.selected.unwrap_or(d.bg_selected),
            border_primary: theme.colors.border.primary.unwrap_or(d.border_primary),
            border_faint: theme.colors.border.faint.unwrap_or(d.border_faint),
            status_none: status.none.unwrap_or(d.status_none),
            status_running: status.running.unwrap_or(d.status_running),
            status_error: status.error.unwrap_or(d.status_error),
            status_cancelled: status.cancelled.unwrap_or(d.status_cancelled),
            status_success: status.success.unwrap_or(d.status_success),
            status_skipped: status.skipped.unwrap_or(d.status_skipped),
        }
    }

    fn defaults(bg: Background) -> Self {
        match bg {
            Background::Dark => Self {
                text_primary: Color::Ansi256(7),
                text_secondary: Color::Ansi256(245),
                text_faint: Color::Ansi256(243),
                text_accent: Color::Ansi256(6),
                bg_selected: Color::Ansi256(237),
                border_primary: Color::Ansi256(244),
                border_faint: Color::Ansi256(241),
                status_none: Color::Ansi256(243),
                status_running: Color::Ansi256(10),
                status_error: Color::Ansi256(9),
                status_cancelled: Color::Ansi256(13),
                status_success: Color::Ansi256(12),
                status_skipped: Color::Ansi256(245),
            },
            Background::Light => Self {
                text_primary: Color::Ansi256(0),
                text_secondary: Color::Ansi256(240),
                text_faint: Color::Ansi256(248),
                text_accent: Color::Ansi256(4),
                bg_selected: Color::Ansi256(254),
                border_primary: Color::Ansi256(240),
                border_faint: Color::Ansi256(252),
                status_none: Color::Ansi256(248),
                status_running: Color::Ansi256(2),
                status_error: Color::Ansi256(1),
                status_cancelled: Color::Ansi256(5),
                status_success: Color::Ansi256(4),
                status_skipped: Color::Ansi256(240),
            },
        }
    }

    pub fn status_color(&self, code: StatusCode) -> Color {
        match code {
            StatusCode::None => self.status_none,
            StatusCode::Running => self.status_running,
            StatusCode::Error => self.status_error,
            StatusCode::Cancelled => self.status_cancelled,
            StatusCode::Success => self.status_success,
            StatusCode::Skipped => self.status_skipped,
        }
    }

    pub fn tone_color(&self, tone: Tone) -> Color {
        match tone {
            Tone::Normal => self.text_primary,
            Tone::Secondary => self.text_secondary,
            Tone::Faint => self.text_faint,
            Tone::Accent => self.text_accent,
            Tone::Status(code) => self.status_color(code),
        }
    }
}

impl Default for ResolvedTheme {
    fn default() -> Self {
        Self::defaults(Background::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_status_color_overrides_default() {
        let toml = r##"
[colors.status]
running = "#00ff00"
"##;
        let theme: Theme = toml::from_str(toml).unwrap();
        let resolved = ResolvedTheme::resolve(&theme, Background::Dark);
        assert_eq!(
            resolved.status_color(StatusCode::Running),
            Color::Hex { r: 0, g: 255, b: 0 }
        );
        assert_eq!(resolved.status_color(StatusCode::Error), Color::Ansi256(9));
    }

    #[test]
    fn tones_map_to_slots() {
        let theme = ResolvedTheme::default();
        assert_eq!(theme.tone_color(Tone::Faint), theme.text_faint);
        assert_eq!(
            theme.tone_color(Tone::Status(StatusCode::Success)),
            theme.status_success
        );
    }
}
