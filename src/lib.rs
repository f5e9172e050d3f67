//! A month-grid date-picker widget for [ratatui] terminal UIs.
//!
//! The widget pairs a [`Calendar`] (the render half, a
//! [`StatefulWidget`](ratatui::widgets::StatefulWidget)) with a
//! [`CalendarState`] (the model): displayed month, optional selected date,
//! locale-aware day & month names, a palette of per-day-category colors,
//! named style [tags](tags::TagTable), and dated
//! [calevents](events::EventTable) that overlay tag styles and tooltips
//! onto day cells.  The embedding application owns the event loop and
//! feeds the state [`CalendarInput`]s; the state reports back through a
//! queue of [`Notification`]s.
//!
//! ```no_run
//! use calgrid::{Calendar, CalendarOptions, CalendarState};
//! use ratatui::{buffer::Buffer, layout::Rect, widgets::StatefulWidget};
//! use time::macros::date;
//!
//! let options = CalendarOptions::new().date(date!(2024 - 06 - 07));
//! let mut cal = CalendarState::new(options, date!(2024 - 06 - 15))?;
//! cal.select(date!(2024 - 06 - 21))?;
//! let area = Rect::new(0, 0, 34, 10);
//! let mut buf = Buffer::empty(area);
//! Calendar::new().render(area, &mut buf, &mut cal);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [ratatui]: https://docs.rs/ratatui

mod calendar;
pub mod events;
pub mod locale;
pub mod options;
pub mod palette;
pub mod tags;

pub use crate::calendar::{
    Calendar, CalendarInput, CalendarState, EndOfCalendarError, InputOutcome, Notification,
    SelectError,
};
pub use crate::events::{CalEvent, CalEventError, CalEventId};
pub use crate::locale::{Locale, LocaleError};
pub use crate::options::{
    keys, CalendarOptions, FirstWeekday, OptionError, OptionValue, SelectMode, WidgetState,
};
pub use crate::palette::{DayKind, Palette};
pub use crate::tags::{TagError, TagStyle};
