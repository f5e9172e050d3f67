use thiserror::Error;
use time::{Date, Month, Weekday};

/// Day & month names plus the conventional numeric date layout (`%x`) for
/// one language.  Names are stored Monday-first to line up with
/// [`Weekday::number_days_from_monday`].
#[derive(Debug, Eq, PartialEq)]
struct LocaleSpec {
    code: &'static str,
    months: [&'static str; 12],
    months_abbrev: [&'static str; 12],
    days: [&'static str; 7],
    days_abbrev: [&'static str; 7],
    date_layout: &'static str,
}

static EN: LocaleSpec = LocaleSpec {
    code: "en",
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    months_abbrev: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    days: [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ],
    days_abbrev: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
    date_layout: "%m/%d/%Y",
};

static FR: LocaleSpec = LocaleSpec {
    code: "fr",
    months: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
    months_abbrev: [
        "jan", "fév", "mar", "avr", "mai", "juin", "juil", "août", "sep", "oct", "nov", "déc",
    ],
    days: [
        "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
    ],
    days_abbrev: ["lun", "mar", "mer", "jeu", "ven", "sam", "dim"],
    date_layout: "%d/%m/%Y",
};

static DE: LocaleSpec = LocaleSpec {
    code: "de",
    months: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    months_abbrev: [
        "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
    ],
    days: [
        "Montag",
        "Dienstag",
        "Mittwoch",
        "Donnerstag",
        "Freitag",
        "Samstag",
        "Sonntag",
    ],
    days_abbrev: ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"],
    date_layout: "%d.%m.%Y",
};

static ES: LocaleSpec = LocaleSpec {
    code: "es",
    months: [
        "enero",
        "febrero",
        "marzo",
        "abril",
        "mayo",
        "junio",
        "julio",
        "agosto",
        "septiembre",
        "octubre",
        "noviembre",
        "diciembre",
    ],
    months_abbrev: [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
    ],
    days: [
        "lunes",
        "martes",
        "miércoles",
        "jueves",
        "viernes",
        "sábado",
        "domingo",
    ],
    days_abbrev: ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"],
    date_layout: "%d/%m/%Y",
};

static IT: LocaleSpec = LocaleSpec {
    code: "it",
    months: [
        "gennaio",
        "febbraio",
        "marzo",
        "aprile",
        "maggio",
        "giugno",
        "luglio",
        "agosto",
        "settembre",
        "ottobre",
        "novembre",
        "dicembre",
    ],
    months_abbrev: [
        "gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic",
    ],
    days: [
        "lunedì",
        "martedì",
        "mercoledì",
        "giovedì",
        "venerdì",
        "sabato",
        "domenica",
    ],
    days_abbrev: ["lun", "mar", "mer", "gio", "ven", "sab", "dom"],
    date_layout: "%d/%m/%Y",
};

/// A fixed-table locale used for day & month names and for `%x`-style
/// formatting of dates.
///
/// Identifiers are resolved by language prefix, so `"fr"`, `"fr_FR"`, and
/// `"fr_CA.UTF-8"` all name the same table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Locale(&'static LocaleSpec);

impl Default for Locale {
    fn default() -> Locale {
        Locale(&EN)
    }
}

impl Locale {
    pub fn from_identifier(identifier: &str) -> Result<Locale, LocaleError> {
        let lang = identifier
            .split(['_', '.', '-', '@'])
            .next()
            .unwrap_or_default();
        match lang.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale(&EN)),
            "fr" => Ok(Locale(&FR)),
            "de" => Ok(Locale(&DE)),
            "es" => Ok(Locale(&ES)),
            "it" => Ok(Locale(&IT)),
            _ => Err(LocaleError::UnknownLocale(identifier.to_owned())),
        }
    }

    /// The language code the locale was resolved to
    pub fn identifier(&self) -> &'static str {
        self.0.code
    }

    pub fn month_name(&self, month: Month) -> &'static str {
        self.0.months[month_index(month)]
    }

    pub fn month_abbrev(&self, month: Month) -> &'static str {
        self.0.months_abbrev[month_index(month)]
    }

    pub fn day_name(&self, weekday: Weekday) -> &'static str {
        self.0.days[day_index(weekday)]
    }

    pub fn day_abbrev(&self, weekday: Weekday) -> &'static str {
        self.0.days_abbrev[day_index(weekday)]
    }

    /// Render `date` according to a strftime-like `format` string.
    ///
    /// Supported directives: `%a`, `%A`, `%b`, `%B`, `%d`, `%e`, `%m`,
    /// `%x`, `%y`, `%Y`, and `%%`.  `%x` expands to the locale's
    /// conventional numeric date layout.
    pub fn format_date(&self, date: Date, format: &str) -> Result<String, LocaleError> {
        use std::fmt::Write;
        let mut out = String::with_capacity(format.len());
        let mut chars = format.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            let Some(directive) = chars.next() else {
                return Err(LocaleError::TrailingPercent);
            };
            match directive {
                'a' => out.push_str(self.day_abbrev(date.weekday())),
                'A' => out.push_str(self.day_name(date.weekday())),
                'b' => out.push_str(self.month_abbrev(date.month())),
                'B' => out.push_str(self.month_name(date.month())),
                'd' => {
                    let _ = write!(out, "{:02}", date.day());
                }
                'e' => {
                    let _ = write!(out, "{:2}", date.day());
                }
                'm' => {
                    let _ = write!(out, "{:02}", u8::from(date.month()));
                }
                'x' => out.push_str(&self.format_date(date, self.0.date_layout)?),
                'y' => {
                    let _ = write!(out, "{:02}", date.year().rem_euclid(100));
                }
                'Y' => {
                    let year = date.year();
                    if year < 0 {
                        let _ = write!(out, "-{:04}", year.unsigned_abs());
                    } else {
                        let _ = write!(out, "{year:04}");
                    }
                }
                '%' => out.push('%'),
                other => return Err(LocaleError::UnknownDirective(other)),
            }
        }
        Ok(out)
    }

    /// Parse a string in the locale's `%x` layout back into a date.
    ///
    /// This is the inverse of `format_date(date, "%x")` and accepts
    /// unpadded day & month fields.
    pub fn parse_date(&self, s: &str) -> Result<Date, LocaleError> {
        let bad = || LocaleError::ParseDate(s.to_owned());
        let mut input = s.chars().peekable();
        let mut year: Option<i32> = None;
        let mut month: Option<u8> = None;
        let mut day: Option<u8> = None;
        let mut layout = self.0.date_layout.chars();
        while let Some(ch) = layout.next() {
            if ch != '%' {
                if input.next() != Some(ch) {
                    return Err(bad());
                }
                continue;
            }
            match layout.next() {
                Some('d') => day = Some(parse_number(&mut input, 2).ok_or_else(bad)?),
                Some('m') => month = Some(parse_number(&mut input, 2).ok_or_else(bad)?),
                Some('Y') => {
                    let negative = input.next_if_eq(&'-').is_some();
                    let y: i32 = parse_number(&mut input, 4).ok_or_else(bad)?;
                    year = Some(if negative { -y } else { y });
                }
                _ => return Err(bad()),
            }
        }
        if input.next().is_some() {
            return Err(bad());
        }
        let (Some(year), Some(month), Some(day)) = (year, month, day) else {
            return Err(bad());
        };
        let month = Month::try_from(month).map_err(|_| bad())?;
        Date::from_calendar_date(year, month, day).map_err(|_| bad())
    }
}

fn month_index(month: Month) -> usize {
    usize::from(u8::from(month) - 1)
}

fn day_index(weekday: Weekday) -> usize {
    usize::from(weekday.number_days_from_monday())
}

/// Parse one to `max_digits` decimal digits off the front of `input`.
fn parse_number<T>(
    input: &mut std::iter::Peekable<std::str::Chars<'_>>,
    max_digits: u32,
) -> Option<T>
where
    T: From<u8> + std::ops::Mul<T, Output = T> + std::ops::Add<T, Output = T>,
{
    let mut value: Option<T> = None;
    for _ in 0..max_digits {
        let Some(d) = input.peek().and_then(|c| c.to_digit(10)) else {
            break;
        };
        let _ = input.next();
        let d = T::from(u8::try_from(d).expect("decimal digit should fit in u8"));
        value = Some(match value {
            Some(v) => v * T::from(10) + d,
            None => d,
        });
    }
    value
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LocaleError {
    /// The identifier does not name a built-in locale table
    #[error("unknown locale: {0:?}")]
    UnknownLocale(String),
    /// A `%` directive that the formatter does not implement
    #[error("unknown format directive: %{0}")]
    UnknownDirective(char),
    #[error("format string ends with an incomplete directive")]
    TrailingPercent,
    #[error("date string {0:?} does not match the locale's date layout")]
    ParseDate(String),
}
