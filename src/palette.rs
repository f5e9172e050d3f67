use ratatui::style::{Color, Modifier, Style};
use std::time::Duration;

/// Which of the palette's (background, foreground) pairs a rendered cell
/// takes before any tag overlay is applied.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DayKind {
    Normal,
    Weekend,
    OtherMonth,
    OtherMonthWeekend,
    Disabled,
    Selected,
    DisabledSelected,
    Headers,
    WeekNumber,
}

/// The widget's enumerated appearance options.
///
/// Every key has a default and is independently settable; the string
/// spellings used by [`keys`](crate::options::keys) and
/// [`CalendarState::configure`](crate::CalendarState::configure) match the
/// field names with the underscores removed (`headers_background` ↔
/// `"headersbackground"`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub bordercolor: Color,
    pub headers_background: Color,
    pub headers_foreground: Color,
    pub select_background: Color,
    pub select_foreground: Color,
    pub disabled_select_background: Color,
    pub disabled_select_foreground: Color,
    pub normal_background: Color,
    pub normal_foreground: Color,
    pub weekend_background: Color,
    pub weekend_foreground: Color,
    pub othermonth_background: Color,
    pub othermonth_foreground: Color,
    pub othermonthwe_background: Color,
    pub othermonthwe_foreground: Color,
    pub disabledday_background: Color,
    pub disabledday_foreground: Color,
    pub tooltip_background: Color,
    pub tooltip_foreground: Color,
    pub tooltip_delay: Duration,
}

impl Default for Palette {
    fn default() -> Palette {
        Palette {
            background: Color::Black,
            foreground: Color::White,
            bordercolor: Color::DarkGray,
            headers_background: Color::Black,
            headers_foreground: Color::White,
            select_background: Color::LightBlue,
            select_foreground: Color::Black,
            disabled_select_background: Color::DarkGray,
            disabled_select_foreground: Color::White,
            normal_background: Color::Black,
            normal_foreground: Color::White,
            weekend_background: Color::Black,
            weekend_foreground: Color::LightRed,
            othermonth_background: Color::Black,
            othermonth_foreground: Color::DarkGray,
            othermonthwe_background: Color::Black,
            othermonthwe_foreground: Color::DarkGray,
            disabledday_background: Color::Black,
            disabledday_foreground: Color::DarkGray,
            tooltip_background: Color::LightYellow,
            tooltip_foreground: Color::Black,
            tooltip_delay: Duration::from_millis(1500),
        }
    }
}

impl Palette {
    /// Style the whole widget area is filled with
    pub fn base_style(&self) -> Style {
        Style::new().bg(self.background).fg(self.foreground)
    }

    pub fn border_style(&self) -> Style {
        Style::new().bg(self.background).fg(self.bordercolor)
    }

    pub fn tooltip_style(&self) -> Style {
        Style::new()
            .bg(self.tooltip_background)
            .fg(self.tooltip_foreground)
    }

    /// Base style of a cell of the given kind, before tag overlays
    pub fn day_style(&self, kind: DayKind) -> Style {
        let (bg, fg) = match kind {
            DayKind::Normal => (self.normal_background, self.normal_foreground),
            DayKind::Weekend => (self.weekend_background, self.weekend_foreground),
            DayKind::OtherMonth => (self.othermonth_background, self.othermonth_foreground),
            DayKind::OtherMonthWeekend => {
                (self.othermonthwe_background, self.othermonthwe_foreground)
            }
            DayKind::Disabled => (self.disabledday_background, self.disabledday_foreground),
            DayKind::Selected => (self.select_background, self.select_foreground),
            DayKind::DisabledSelected => {
                (self.disabled_select_background, self.disabled_select_foreground)
            }
            DayKind::Headers | DayKind::WeekNumber => {
                return Style::new()
                    .bg(self.headers_background)
                    .fg(self.headers_foreground)
                    .add_modifier(Modifier::BOLD)
            }
        };
        Style::new().bg(bg).fg(fg)
    }

    /// Look up a color field by its option-key spelling
    pub fn color(&self, key: &str) -> Option<Color> {
        Some(match key {
            "background" => self.background,
            "foreground" => self.foreground,
            "bordercolor" => self.bordercolor,
            "headersbackground" => self.headers_background,
            "headersforeground" => self.headers_foreground,
            "selectbackground" => self.select_background,
            "selectforeground" => self.select_foreground,
            "disabledselectbackground" => self.disabled_select_background,
            "disabledselectforeground" => self.disabled_select_foreground,
            "normalbackground" => self.normal_background,
            "normalforeground" => self.normal_foreground,
            "weekendbackground" => self.weekend_background,
            "weekendforeground" => self.weekend_foreground,
            "othermonthbackground" => self.othermonth_background,
            "othermonthforeground" => self.othermonth_foreground,
            "othermonthwebackground" => self.othermonthwe_background,
            "othermonthweforeground" => self.othermonthwe_foreground,
            "disableddaybackground" => self.disabledday_background,
            "disableddayforeground" => self.disabledday_foreground,
            "tooltipbackground" => self.tooltip_background,
            "tooltipforeground" => self.tooltip_foreground,
            _ => return None,
        })
    }

    /// Mutable counterpart of [`Palette::color`]
    pub fn color_mut(&mut self, key: &str) -> Option<&mut Color> {
        Some(match key {
            "background" => &mut self.background,
            "foreground" => &mut self.foreground,
            "bordercolor" => &mut self.bordercolor,
            "headersbackground" => &mut self.headers_background,
            "headersforeground" => &mut self.headers_foreground,
            "selectbackground" => &mut self.select_background,
            "selectforeground" => &mut self.select_foreground,
            "disabledselectbackground" => &mut self.disabled_select_background,
            "disabledselectforeground" => &mut self.disabled_select_foreground,
            "normalbackground" => &mut self.normal_background,
            "normalforeground" => &mut self.normal_foreground,
            "weekendbackground" => &mut self.weekend_background,
            "weekendforeground" => &mut self.weekend_foreground,
            "othermonthbackground" => &mut self.othermonth_background,
            "othermonthforeground" => &mut self.othermonth_foreground,
            "othermonthwebackground" => &mut self.othermonthwe_background,
            "othermonthweforeground" => &mut self.othermonthwe_foreground,
            "disableddaybackground" => &mut self.disabledday_background,
            "disableddayforeground" => &mut self.disabledday_foreground,
            "tooltipbackground" => &mut self.tooltip_background,
            "tooltipforeground" => &mut self.tooltip_foreground,
            _ => return None,
        })
    }
}

/// Option-key spellings of all color fields, in `keys()` order
pub(crate) static COLOR_KEYS: &[&str] = &[
    "background",
    "bordercolor",
    "disableddaybackground",
    "disableddayforeground",
    "disabledselectbackground",
    "disabledselectforeground",
    "foreground",
    "headersbackground",
    "headersforeground",
    "normalbackground",
    "normalforeground",
    "othermonthbackground",
    "othermonthforeground",
    "othermonthwebackground",
    "othermonthweforeground",
    "selectbackground",
    "selectforeground",
    "tooltipbackground",
    "tooltipforeground",
    "weekendbackground",
    "weekendforeground",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_color_key_resolves() {
        let mut palette = Palette::default();
        for &key in COLOR_KEYS {
            assert!(palette.color(key).is_some(), "{key}");
            assert!(palette.color_mut(key).is_some(), "{key}");
        }
        assert!(palette.color("tooltipalpha").is_none());
        assert!(palette.color_mut("tooltipdelay").is_none());
    }

    #[test]
    fn test_keys_are_independent() {
        let mut palette = Palette::default();
        let before = palette.clone();
        *palette.color_mut("weekendforeground").unwrap() = Color::Magenta;
        assert_eq!(palette.day_style(DayKind::Weekend).fg, Some(Color::Magenta));
        for &key in COLOR_KEYS {
            if key != "weekendforeground" {
                assert_eq!(palette.color(key), before.color(key), "{key}");
            }
        }
    }

    #[test]
    fn test_selected_style() {
        let palette = Palette::default();
        let style = palette.day_style(DayKind::Selected);
        assert_eq!(style.bg, Some(Color::LightBlue));
        assert_eq!(style.fg, Some(Color::Black));
    }
}
