mod grid;
mod state;
mod tooltip;
mod widget;

pub use self::state::{
    CalendarInput, CalendarState, EndOfCalendarError, InputOutcome, Notification, SelectError,
};
pub use self::widget::Calendar;
