use crate::locale::Locale;
use crate::palette::Palette;
use ratatui::style::Color;
use thiserror::Error;
use time::{Date, Month};

/// Which weekday begins each displayed week row
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FirstWeekday {
    #[default]
    Monday,
    Sunday,
}

impl FirstWeekday {
    pub fn weekday(self) -> time::Weekday {
        match self {
            FirstWeekday::Monday => time::Weekday::Monday,
            FirstWeekday::Sunday => time::Weekday::Sunday,
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<FirstWeekday> {
        match name {
            "monday" => Some(FirstWeekday::Monday),
            "sunday" => Some(FirstWeekday::Sunday),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            FirstWeekday::Monday => "monday",
            FirstWeekday::Sunday => "sunday",
        }
    }
}

/// Whether user click/keyboard date selection is enabled
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SelectMode {
    /// The widget only displays; selection operations fail
    None,
    /// Single-day selection
    #[default]
    Day,
}

impl SelectMode {
    pub(crate) fn from_name(name: &str) -> Option<SelectMode> {
        match name {
            "none" => Some(SelectMode::None),
            "day" => Some(SelectMode::Day),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            SelectMode::None => "none",
            SelectMode::Day => "day",
        }
    }
}

/// Whether the widget reacts to input.  A disabled widget still renders
/// its selection.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum WidgetState {
    #[default]
    Normal,
    Disabled,
}

impl WidgetState {
    pub(crate) fn from_name(name: &str) -> Option<WidgetState> {
        match name {
            "normal" => Some(WidgetState::Normal),
            "disabled" => Some(WidgetState::Disabled),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            WidgetState::Normal => "normal",
            WidgetState::Disabled => "disabled",
        }
    }
}

/// Construction-time configuration of a [`CalendarState`](crate::CalendarState).
///
/// `day` names an initial selection; when `year`/`month` are absent they
/// complete from the host-supplied today.  Without `day`, `year`/`month`
/// only pick the initially displayed month.  In
/// [`SelectMode::None`] no initial selection is made regardless of `day`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CalendarOptions {
    pub year: Option<i32>,
    pub month: Option<Month>,
    pub day: Option<u8>,
    pub first_weekday: FirstWeekday,
    pub show_week_numbers: bool,
    pub show_other_month_days: bool,
    pub locale: Locale,
    pub select_mode: SelectMode,
    pub state: WidgetState,
    pub min_date: Option<Date>,
    pub max_date: Option<Date>,
    pub palette: Palette,
}

impl Default for CalendarOptions {
    fn default() -> CalendarOptions {
        CalendarOptions {
            year: None,
            month: None,
            day: None,
            first_weekday: FirstWeekday::default(),
            show_week_numbers: true,
            show_other_month_days: true,
            locale: Locale::default(),
            select_mode: SelectMode::default(),
            state: WidgetState::default(),
            min_date: None,
            max_date: None,
            palette: Palette::default(),
        }
    }
}

impl CalendarOptions {
    pub fn new() -> CalendarOptions {
        CalendarOptions::default()
    }

    /// Set `year`, `month`, and `day` from a date
    pub fn date(mut self, date: Date) -> Self {
        self.year = Some(date.year());
        self.month = Some(date.month());
        self.day = Some(date.day());
        self
    }

    pub fn first_weekday(mut self, first_weekday: FirstWeekday) -> Self {
        self.first_weekday = first_weekday;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn select_mode(mut self, select_mode: SelectMode) -> Self {
        self.select_mode = select_mode;
        self
    }

    pub fn show_week_numbers(mut self, show: bool) -> Self {
        self.show_week_numbers = show;
        self
    }

    pub fn show_other_month_days(mut self, show: bool) -> Self {
        self.show_other_month_days = show;
        self
    }

    pub fn min_date(mut self, date: Date) -> Self {
        self.min_date = Some(date);
        self
    }

    pub fn max_date(mut self, date: Date) -> Self {
        self.max_date = Some(date);
        self
    }

    /// Resolve the initially displayed month (as its first day) and the
    /// initial selection.
    pub(crate) fn initial(&self, today: Date) -> Result<(Date, Option<Date>), OptionError> {
        if let (Some(min), Some(max)) = (self.min_date, self.max_date) {
            if min > max {
                return Err(OptionError::invalid("mindate", "mindate <= maxdate"));
            }
        }
        let year = self.year.unwrap_or_else(|| today.year());
        let month = self.month.unwrap_or_else(|| today.month());
        let selection = match self.day {
            Some(day) if self.select_mode == SelectMode::Day => {
                let date = Date::from_calendar_date(year, month, day)
                    .map_err(|_| OptionError::invalid("day", "a valid calendar date"))?;
                if !in_range(date, self.min_date, self.max_date) {
                    return Err(OptionError::invalid("day", "a date within mindate..=maxdate"));
                }
                Some(date)
            }
            _ => None,
        };
        let anchor = Date::from_calendar_date(year, month, 1)
            .map_err(|_| OptionError::invalid("year", "a representable year"))?;
        Ok((anchor, selection))
    }
}

pub(crate) fn in_range(date: Date, min: Option<Date>, max: Option<Date>) -> bool {
    min.is_none_or(|d| date >= d) && max.is_none_or(|d| date <= d)
}

/// Every configurable option name, sorted, stable across calls
pub fn keys() -> &'static [&'static str] {
    static KEYS: &[&str] = &[
        "background",
        "bordercolor",
        "day",
        "disableddaybackground",
        "disableddayforeground",
        "disabledselectbackground",
        "disabledselectforeground",
        "firstweekday",
        "foreground",
        "headersbackground",
        "headersforeground",
        "locale",
        "maxdate",
        "mindate",
        "month",
        "normalbackground",
        "normalforeground",
        "othermonthbackground",
        "othermonthforeground",
        "othermonthwebackground",
        "othermonthweforeground",
        "selectbackground",
        "selectforeground",
        "selectmode",
        "showothermonthdays",
        "showweeknumbers",
        "state",
        "tooltipbackground",
        "tooltipdelay",
        "tooltipforeground",
        "weekendbackground",
        "weekendforeground",
        "year",
    ];
    KEYS
}

/// Dynamically typed option value used by the string-keyed
/// `configure`/`cget` surface
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OptionValue {
    Color(Color),
    Str(String),
    Int(i64),
    Bool(bool),
    Date(Date),
    /// An unset optional value (e.g. `mindate` with no bound)
    None,
}

impl OptionValue {
    pub(crate) fn color(&self) -> Option<Color> {
        match *self {
            OptionValue::Color(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn string(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn int(&self) -> Option<i64> {
        match *self {
            OptionValue::Int(n) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn boolean(&self) -> Option<bool> {
        match *self {
            OptionValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// `Date` or `None`, for the optional date-valued keys
    pub(crate) fn date_bound(&self) -> Option<Option<Date>> {
        match *self {
            OptionValue::Date(d) => Some(Some(d)),
            OptionValue::None => Some(None),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum OptionError {
    #[error("unknown option: {0:?}")]
    UnknownOption(String),
    #[error("invalid value for option {key:?}: expected {expected}")]
    InvalidValue { key: String, expected: &'static str },
}

impl OptionError {
    pub(crate) fn invalid(key: &str, expected: &'static str) -> OptionError {
        OptionError::InvalidValue {
            key: key.to_owned(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::COLOR_KEYS;
    use time::macros::date;

    #[test]
    fn test_keys_sorted_and_complete() {
        let keys = keys();
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys should be sorted");
        for &key in COLOR_KEYS {
            assert!(keys.contains(&key), "{key}");
        }
        for key in ["firstweekday", "selectmode", "tooltipdelay", "mindate"] {
            assert!(keys.contains(&key), "{key}");
        }
    }

    #[test]
    fn test_initial_day_completed_from_today() {
        let today = date!(2020 - 01 - 15);
        let opts = CalendarOptions::new();
        let with_day = CalendarOptions {
            day: Some(20),
            ..opts
        };
        let (anchor, selection) = with_day.initial(today).unwrap();
        assert_eq!(anchor, date!(2020 - 01 - 01));
        assert_eq!(selection, Some(date!(2020 - 01 - 20)));
    }

    #[test]
    fn test_initial_full_date() {
        let today = date!(2020 - 01 - 15);
        let opts = CalendarOptions::new().date(date!(1999 - 06 - 07));
        let (anchor, selection) = opts.initial(today).unwrap();
        assert_eq!(anchor, date!(1999 - 06 - 01));
        assert_eq!(selection, Some(date!(1999 - 06 - 07)));
    }

    #[test]
    fn test_initial_month_without_day() {
        let today = date!(2020 - 01 - 15);
        let opts = CalendarOptions {
            year: Some(2021),
            month: Some(Month::March),
            ..CalendarOptions::new()
        };
        let (anchor, selection) = opts.initial(today).unwrap();
        assert_eq!(anchor, date!(2021 - 03 - 01));
        assert_eq!(selection, None);
    }

    #[test]
    fn test_initial_ignores_day_when_selection_disabled() {
        let today = date!(2020 - 01 - 15);
        let opts = CalendarOptions {
            day: Some(20),
            ..CalendarOptions::new().select_mode(SelectMode::None)
        };
        let (anchor, selection) = opts.initial(today).unwrap();
        assert_eq!(anchor, date!(2020 - 01 - 01));
        assert_eq!(selection, None);
    }

    #[test]
    fn test_initial_rejects_invalid_date() {
        let today = date!(2020 - 01 - 15);
        let opts = CalendarOptions {
            month: Some(Month::February),
            day: Some(30),
            ..CalendarOptions::new()
        };
        assert!(matches!(
            opts.initial(today),
            Err(OptionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_initial_rejects_selection_outside_bounds() {
        let today = date!(2020 - 01 - 15);
        let opts = CalendarOptions::new()
            .date(date!(2020 - 01 - 10))
            .min_date(date!(2020 - 01 - 12));
        assert!(matches!(
            opts.initial(today),
            Err(OptionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_initial_rejects_inverted_bounds() {
        let today = date!(2020 - 01 - 15);
        let opts = CalendarOptions::new()
            .min_date(date!(2020 - 02 - 01))
            .max_date(date!(2020 - 01 - 01));
        assert!(matches!(
            opts.initial(today),
            Err(OptionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_enum_names_round_trip() {
        for fw in [FirstWeekday::Monday, FirstWeekday::Sunday] {
            assert_eq!(FirstWeekday::from_name(fw.name()), Some(fw));
        }
        for sm in [SelectMode::None, SelectMode::Day] {
            assert_eq!(SelectMode::from_name(sm.name()), Some(sm));
        }
        for st in [WidgetState::Normal, WidgetState::Disabled] {
            assert_eq!(WidgetState::from_name(st.name()), Some(st));
        }
        assert_eq!(FirstWeekday::from_name("tuesday"), None);
    }
}
