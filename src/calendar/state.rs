use super::grid::{self, DayCell, MonthGrid};
use super::tooltip::TooltipState;
use crate::events::{CalEvent, CalEventError, CalEventId, EventTable};
use crate::locale::{Locale, LocaleError};
use crate::options::{
    in_range, CalendarOptions, FirstWeekday, OptionError, OptionValue, SelectMode, WidgetState,
};
use crate::palette::{DayKind, Palette};
use crate::tags::{TagError, TagStyle, TagTable};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;
use thiserror::Error;
use time::{Date, Month, Weekday};

/// What external code is told about via [`CalendarState::take_notification`]
/// — the widget's two "virtual events".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notification {
    /// The selection changed to this date
    SelectionChanged(Date),
    /// The displayed month changed to this (year, month)
    MonthChanged(i32, Month),
}

/// Toolkit-independent input fed to [`CalendarState::handle_input`].
/// The embedding application translates its toolkit's events into these.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CalendarInput {
    PrevMonth,
    NextMonth,
    PrevYear,
    NextYear,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    /// Select the date under the day cursor
    Activate,
    /// Jump back to today's month
    Today,
    /// Mouse click at buffer coordinates
    Click { column: u16, row: u16 },
    /// Mouse pointer at buffer coordinates
    Hover {
        column: u16,
        row: u16,
        now: Instant,
    },
    /// Mouse pointer left the widget
    HoverEnd,
}

/// Whether [`CalendarState::handle_input`] did anything
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputOutcome {
    Handled,
    Ignored,
}

fn outcome(handled: bool) -> InputOutcome {
    if handled {
        InputOutcome::Handled
    } else {
        InputOutcome::Ignored
    }
}

/// What a point of the rendered widget maps back to
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum HitTarget {
    Day(Date),
    PrevMonth,
    NextMonth,
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SelectError {
    #[error("selection is disabled (selectmode is \"none\")")]
    SelectionDisabled,
    #[error("date {0} is outside the selectable range")]
    OutOfRange(Date),
}

/// Navigation ran off the displayable months — either past the
/// representable date range or past the mindate/maxdate window
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("no further month to display")]
pub struct EndOfCalendarError;

/// The date-picker's model: displayed month, selection, tag table,
/// calendar events, and the notification queue.  Render it with
/// [`Calendar`](crate::Calendar) and feed it input with
/// [`handle_input`](CalendarState::handle_input).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CalendarState {
    today: Date,
    /// First day of the displayed month
    displayed: Date,
    selection: Option<Date>,
    /// Keyboard day cursor
    cursor: Date,
    first_weekday: FirstWeekday,
    show_week_numbers: bool,
    show_other_month_days: bool,
    locale: Locale,
    select_mode: SelectMode,
    widget_state: WidgetState,
    min_date: Option<Date>,
    max_date: Option<Date>,
    palette: Palette,
    tags: TagTable,
    events: EventTable,
    notifications: VecDeque<Notification>,
    text_buffer: Option<Rc<RefCell<String>>>,
    /// Cell rectangles recorded by the last render, for mouse hit-testing
    pub(crate) hit_map: Vec<(Rect, HitTarget)>,
    pub(crate) tooltip: TooltipState,
}

impl CalendarState {
    /// `today` anchors the defaults (initial month, day-completion, the
    /// today marker); the host resolves it once from its clock.
    pub fn new(options: CalendarOptions, today: Date) -> Result<CalendarState, OptionError> {
        let (anchor, selection) = options.initial(today)?;
        let CalendarOptions {
            first_weekday,
            show_week_numbers,
            show_other_month_days,
            locale,
            select_mode,
            state,
            min_date,
            max_date,
            palette,
            ..
        } = options;
        let tooltip = TooltipState::new(palette.tooltip_delay);
        let mut cursor = selection.unwrap_or(today);
        if let Some(min) = min_date {
            cursor = cursor.max(min);
        }
        if let Some(max) = max_date {
            cursor = cursor.min(max);
        }
        Ok(CalendarState {
            today,
            displayed: anchor,
            selection,
            cursor,
            first_weekday,
            show_week_numbers,
            show_other_month_days,
            locale,
            select_mode,
            widget_state: state,
            min_date,
            max_date,
            palette,
            tags: TagTable::new(),
            events: EventTable::new(),
            notifications: VecDeque::new(),
            text_buffer: None,
            hit_map: Vec::new(),
            tooltip,
        })
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn first_weekday(&self) -> FirstWeekday {
        self.first_weekday
    }

    pub fn show_week_numbers(&self) -> bool {
        self.show_week_numbers
    }

    pub fn show_other_month_days(&self) -> bool {
        self.show_other_month_days
    }

    pub fn select_mode(&self) -> SelectMode {
        self.select_mode
    }

    pub fn widget_state(&self) -> WidgetState {
        self.widget_state
    }

    /// The (year, month) currently rendered
    pub fn displayed_month(&self) -> (i32, Month) {
        (self.displayed.year(), self.displayed.month())
    }

    pub(crate) fn grid(&self) -> MonthGrid {
        MonthGrid::of(self.displayed, self.first_weekday)
    }

    // --- selection ------------------------------------------------------

    pub fn selection(&self) -> Option<Date> {
        self.selection
    }

    /// Set the selection.  Scrolls the displayed month to the date,
    /// mirrors it into the bound text buffer, and queues a
    /// [`Notification::SelectionChanged`] — unless the date was already
    /// selected, in which case nothing changes.
    pub fn select(&mut self, date: Date) -> Result<(), SelectError> {
        if self.select_mode == SelectMode::None {
            return Err(SelectError::SelectionDisabled);
        }
        if !in_range(date, self.min_date, self.max_date) {
            return Err(SelectError::OutOfRange(date));
        }
        self.cursor = date;
        self.display_month_of(date);
        if self.selection != Some(date) {
            self.selection = Some(date);
            self.sync_text_buffer();
            self.notifications
                .push_back(Notification::SelectionChanged(date));
        }
        Ok(())
    }

    /// Empty the selection (and the bound text buffer).  Queues nothing.
    pub fn selection_clear(&mut self) {
        self.selection = None;
        self.sync_text_buffer();
    }

    /// Attach a shared text buffer that mirrors the `%x`-formatted
    /// selection, the way a bound text variable would in a desktop
    /// toolkit.  Synced immediately and on every selection change.
    pub fn bind_text_buffer(&mut self, buffer: Rc<RefCell<String>>) {
        self.text_buffer = Some(buffer);
        self.sync_text_buffer();
    }

    fn sync_text_buffer(&self) {
        if let Some(buffer) = &self.text_buffer {
            let text = self
                .selection
                .and_then(|d| self.locale.format_date(d, "%x").ok())
                .unwrap_or_default();
            *buffer.borrow_mut() = text;
        }
    }

    /// Render a date per the widget's locale and a strftime-like format
    pub fn format_date(&self, date: Date, format: &str) -> Result<String, LocaleError> {
        self.locale.format_date(date, format)
    }

    // --- navigation -----------------------------------------------------

    /// Display a month.  Queues one [`Notification::MonthChanged`] per
    /// actual change; re-showing the displayed month queues nothing.
    pub fn show_month(&mut self, year: i32, month: Month) -> Result<(), EndOfCalendarError> {
        let anchor = Date::from_calendar_date(year, month, 1).map_err(|_| EndOfCalendarError)?;
        if !self.month_allowed(anchor) {
            return Err(EndOfCalendarError);
        }
        if self.displayed != anchor {
            self.displayed = anchor;
            self.notifications
                .push_back(Notification::MonthChanged(year, month));
        }
        Ok(())
    }

    /// Scroll the display so `date`'s month is shown
    pub fn show_date(&mut self, date: Date) -> Result<(), EndOfCalendarError> {
        self.show_month(date.year(), date.month())
    }

    pub fn next_month(&mut self) -> Result<(), EndOfCalendarError> {
        let (year, month) = self.displayed_month();
        let (year, month) = grid::next_month(year, month).ok_or(EndOfCalendarError)?;
        self.show_month(year, month)
    }

    pub fn prev_month(&mut self) -> Result<(), EndOfCalendarError> {
        let (year, month) = self.displayed_month();
        let (year, month) = grid::prev_month(year, month).ok_or(EndOfCalendarError)?;
        self.show_month(year, month)
    }

    pub fn next_year(&mut self) -> Result<(), EndOfCalendarError> {
        let (year, month) = self.displayed_month();
        self.show_month(year.checked_add(1).ok_or(EndOfCalendarError)?, month)
    }

    pub fn prev_year(&mut self) -> Result<(), EndOfCalendarError> {
        let (year, month) = self.displayed_month();
        self.show_month(year.checked_sub(1).ok_or(EndOfCalendarError)?, month)
    }

    fn month_allowed(&self, anchor: Date) -> bool {
        let last = anchor
            .replace_day(anchor.month().length(anchor.year()))
            .expect("month length is a valid day");
        self.min_date.is_none_or(|min| last >= min) && self.max_date.is_none_or(|max| anchor <= max)
    }

    /// Unconditionally scroll to `date`'s month (already validated)
    fn display_month_of(&mut self, date: Date) {
        let anchor = date.replace_day(1).expect("day 1 is valid in any month");
        if self.displayed != anchor {
            self.displayed = anchor;
            self.notifications
                .push_back(Notification::MonthChanged(anchor.year(), anchor.month()));
        }
    }

    // --- notifications --------------------------------------------------

    /// Drain one queued notification, oldest first
    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    // --- tags -----------------------------------------------------------

    /// Create-or-update a tag (see [`TagTable::config`])
    pub fn tag_config(&mut self, name: &str, style: TagStyle) {
        self.tags.config(name, style);
    }

    pub fn tag_cget(&self, name: &str) -> Result<&TagStyle, TagError> {
        self.tags.style(name)
    }

    /// Delete a tag and remove it from every calevent referencing it
    pub fn tag_delete(&mut self, name: &str) -> Result<(), TagError> {
        self.tags.delete(name)?;
        self.events.strip_tag(name);
        Ok(())
    }

    /// Tag names in creation order
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.names()
    }

    pub fn tag_raise(&mut self, name: &str) -> Result<(), TagError> {
        self.tags.raise(name)
    }

    pub fn tag_lower(&mut self, name: &str) -> Result<(), TagError> {
        self.tags.lower(name)
    }

    // --- calevents ------------------------------------------------------

    /// Create a calendar event; every tag name must already exist
    pub fn calevent_create<S: Into<String>>(
        &mut self,
        date: Date,
        text: S,
        tags: Vec<String>,
    ) -> Result<CalEventId, CalEventError> {
        self.check_tags(&tags)?;
        Ok(self.events.create(date, text, tags))
    }

    pub fn calevent(&self, id: CalEventId) -> Result<&CalEvent, CalEventError> {
        self.events.get(id)
    }

    pub fn calevent_set_date(&mut self, id: CalEventId, date: Date) -> Result<(), CalEventError> {
        self.events.set_date(id, date)
    }

    pub fn calevent_set_text<S: Into<String>>(
        &mut self,
        id: CalEventId,
        text: S,
    ) -> Result<(), CalEventError> {
        self.events.set_text(id, text)
    }

    pub fn calevent_set_tags(
        &mut self,
        id: CalEventId,
        tags: Vec<String>,
    ) -> Result<(), CalEventError> {
        self.check_tags(&tags)?;
        self.events.set_tags(id, tags)
    }

    pub fn calevent_remove(&mut self, id: CalEventId) -> Result<(), CalEventError> {
        self.events.remove(id).map(|_| ())
    }

    pub fn calevent_raise(&mut self, id: CalEventId) -> Result<(), CalEventError> {
        self.events.raise(id)
    }

    pub fn calevent_lower(&mut self, id: CalEventId) -> Result<(), CalEventError> {
        self.events.lower(id)
    }

    /// Event ids, optionally filtered by date and/or tag (see
    /// [`EventTable::query`] for ordering)
    pub fn calevents(&self, date: Option<Date>, tag: Option<&str>) -> Vec<CalEventId> {
        self.events.query(date, tag)
    }

    fn check_tags(&self, tags: &[String]) -> Result<(), CalEventError> {
        for name in tags {
            if !self.tags.contains(name) {
                return Err(CalEventError::UnknownTag(name.clone()));
            }
        }
        Ok(())
    }

    // --- input ----------------------------------------------------------

    /// Feed one input to the widget.  A disabled widget ignores
    /// everything; otherwise inputs that cannot take effect (navigation
    /// past the calendar's edge, clicks on nothing, selection in
    /// [`SelectMode::None`]) report [`InputOutcome::Ignored`].
    pub fn handle_input(&mut self, input: CalendarInput) -> InputOutcome {
        if self.widget_state == WidgetState::Disabled {
            return InputOutcome::Ignored;
        }
        match input {
            CalendarInput::PrevMonth => outcome(self.prev_month().is_ok()),
            CalendarInput::NextMonth => outcome(self.next_month().is_ok()),
            CalendarInput::PrevYear => outcome(self.prev_year().is_ok()),
            CalendarInput::NextYear => outcome(self.next_year().is_ok()),
            CalendarInput::CursorLeft => self.move_cursor(-1),
            CalendarInput::CursorRight => self.move_cursor(1),
            CalendarInput::CursorUp => self.move_cursor(-7),
            CalendarInput::CursorDown => self.move_cursor(7),
            CalendarInput::Activate => outcome(self.select(self.cursor).is_ok()),
            CalendarInput::Today => outcome(self.show_date(self.today).is_ok()),
            CalendarInput::Click { column, row } => match self.hit_test(column, row) {
                Some(HitTarget::Day(date)) => outcome(self.select(date).is_ok()),
                Some(HitTarget::PrevMonth) => outcome(self.prev_month().is_ok()),
                Some(HitTarget::NextMonth) => outcome(self.next_month().is_ok()),
                None => InputOutcome::Ignored,
            },
            CalendarInput::Hover { column, row, now } => {
                match self.hit_test(column, row) {
                    Some(HitTarget::Day(date)) if !self.events.date_stack(date).is_empty() => {
                        self.tooltip.hover(date, now);
                    }
                    _ => self.tooltip.clear(),
                }
                InputOutcome::Handled
            }
            CalendarInput::HoverEnd => {
                self.tooltip.clear();
                InputOutcome::Handled
            }
        }
    }

    fn move_cursor(&mut self, days: i64) -> InputOutcome {
        let Some(target) = self.cursor.checked_add(time::Duration::days(days)) else {
            return InputOutcome::Ignored;
        };
        if !in_range(target, self.min_date, self.max_date) {
            return InputOutcome::Ignored;
        }
        self.cursor = target;
        self.display_month_of(target);
        InputOutcome::Handled
    }

    fn hit_test(&self, column: u16, row: u16) -> Option<HitTarget> {
        let position = Position::new(column, row);
        self.hit_map
            .iter()
            .find(|(rect, _)| rect.contains(position))
            .map(|&(_, target)| target)
    }

    /// Advance the tooltip timer; true means visibility changed and a
    /// redraw is due
    pub fn tick(&mut self, now: Instant) -> bool {
        self.widget_state == WidgetState::Normal && self.tooltip.tick(now)
    }

    /// The tooltip currently due for display: hovered date plus its
    /// event texts, topmost first
    pub(crate) fn tooltip_payload(&self) -> Option<(Date, String)> {
        let date = self.tooltip.shown()?;
        let text = self.events.tooltip_text(date)?;
        Some((date, text))
    }

    // --- styling --------------------------------------------------------

    /// Effective style of a day cell: palette base kind, then the tag
    /// overlay of the date's events (bottom of the stack first, so the
    /// topmost event wins), then the today/cursor markers.  Selection and
    /// the disabled states override tag colors.
    pub(crate) fn day_style(&self, cell: DayCell) -> Style {
        let disabled_widget = self.widget_state == WidgetState::Disabled;
        let selected = self.selection == Some(cell.date);
        let blocked = disabled_widget || !in_range(cell.date, self.min_date, self.max_date);
        let weekend = matches!(cell.date.weekday(), Weekday::Saturday | Weekday::Sunday);
        let kind = if selected {
            if disabled_widget {
                DayKind::DisabledSelected
            } else {
                DayKind::Selected
            }
        } else if blocked {
            DayKind::Disabled
        } else if !cell.in_month {
            if weekend {
                DayKind::OtherMonthWeekend
            } else {
                DayKind::OtherMonth
            }
        } else if weekend {
            DayKind::Weekend
        } else {
            DayKind::Normal
        };
        let mut style = self.palette.day_style(kind);
        if !selected && !blocked {
            let mut overlay = TagStyle::default();
            for tags in self.events.date_tag_sets(cell.date) {
                overlay.layer(&self.tags.resolve(tags));
            }
            style = overlay.apply_to(style);
        }
        if cell.date == self.today {
            style = style.add_modifier(Modifier::BOLD);
        }
        if cell.date == self.cursor && !disabled_widget && self.select_mode == SelectMode::Day {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    // --- string-keyed option surface ------------------------------------

    /// Set one option by its string key, the way a desktop toolkit's
    /// `configure` does.  See [`keys`](crate::options::keys) for the key
    /// list.
    pub fn configure(&mut self, key: &str, value: OptionValue) -> Result<(), OptionError> {
        match key {
            "tooltipdelay" => {
                let ms = value
                    .int()
                    .and_then(|n| u64::try_from(n).ok())
                    .ok_or_else(|| OptionError::invalid(key, "a non-negative millisecond count"))?;
                let delay = std::time::Duration::from_millis(ms);
                self.palette.tooltip_delay = delay;
                self.tooltip.set_delay(delay);
            }
            "firstweekday" => {
                self.first_weekday = value
                    .string()
                    .and_then(FirstWeekday::from_name)
                    .ok_or_else(|| OptionError::invalid(key, "\"monday\" or \"sunday\""))?;
            }
            "selectmode" => {
                let mode = value
                    .string()
                    .and_then(SelectMode::from_name)
                    .ok_or_else(|| OptionError::invalid(key, "\"none\" or \"day\""))?;
                self.select_mode = mode;
                if mode == SelectMode::None {
                    self.selection_clear();
                }
            }
            "state" => {
                self.widget_state = value
                    .string()
                    .and_then(WidgetState::from_name)
                    .ok_or_else(|| OptionError::invalid(key, "\"normal\" or \"disabled\""))?;
            }
            "locale" => {
                let identifier = value
                    .string()
                    .ok_or_else(|| OptionError::invalid(key, "a locale identifier"))?;
                self.locale = Locale::from_identifier(identifier)
                    .map_err(|_| OptionError::invalid(key, "a known locale identifier"))?;
                self.sync_text_buffer();
            }
            "showweeknumbers" => {
                self.show_week_numbers = value
                    .boolean()
                    .ok_or_else(|| OptionError::invalid(key, "a boolean"))?;
            }
            "showothermonthdays" => {
                self.show_other_month_days = value
                    .boolean()
                    .ok_or_else(|| OptionError::invalid(key, "a boolean"))?;
            }
            "mindate" | "maxdate" => {
                let bound = value
                    .date_bound()
                    .ok_or_else(|| OptionError::invalid(key, "a date or none"))?;
                let (min, max) = if key == "mindate" {
                    (bound, self.max_date)
                } else {
                    (self.min_date, bound)
                };
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(OptionError::invalid(key, "mindate <= maxdate"));
                    }
                }
                if let Some(date) = self.selection {
                    if !in_range(date, min, max) {
                        return Err(OptionError::invalid(
                            key,
                            "a range containing the current selection",
                        ));
                    }
                }
                self.min_date = min;
                self.max_date = max;
                if let Some(min) = min {
                    self.cursor = self.cursor.max(min);
                }
                if let Some(max) = max {
                    self.cursor = self.cursor.min(max);
                }
                if !self.month_allowed(self.displayed) {
                    // scroll back inside the permitted window
                    let target = if min.is_some_and(|m| self.displayed < m) {
                        min
                    } else {
                        max
                    };
                    if let Some(target) = target {
                        self.display_month_of(target);
                    }
                }
            }
            "year" => {
                let year = value
                    .int()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| OptionError::invalid(key, "a year"))?;
                let month = self.displayed.month();
                self.show_month(year, month)
                    .map_err(|_| OptionError::invalid(key, "a displayable year"))?;
            }
            "month" => {
                let month = value
                    .int()
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(|n| Month::try_from(n).ok())
                    .ok_or_else(|| OptionError::invalid(key, "a month number (1-12)"))?;
                let year = self.displayed.year();
                self.show_month(year, month)
                    .map_err(|_| OptionError::invalid(key, "a displayable month"))?;
            }
            "day" => {
                let day = value
                    .int()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| OptionError::invalid(key, "a day of the month"))?;
                let (year, month) = self.displayed_month();
                let date = Date::from_calendar_date(year, month, day)
                    .map_err(|_| OptionError::invalid(key, "a day of the displayed month"))?;
                self.select(date)
                    .map_err(|_| OptionError::invalid(key, "a selectable date"))?;
            }
            _ => {
                let color = value
                    .color()
                    .ok_or_else(|| OptionError::invalid(key, "a color"));
                match self.palette.color_mut(key) {
                    Some(slot) => *slot = color?,
                    None => return Err(OptionError::UnknownOption(key.to_owned())),
                }
            }
        }
        Ok(())
    }

    /// Read one option by its string key
    pub fn cget(&self, key: &str) -> Result<OptionValue, OptionError> {
        Ok(match key {
            "tooltipdelay" => OptionValue::Int(
                i64::try_from(self.palette.tooltip_delay.as_millis()).unwrap_or(i64::MAX),
            ),
            "firstweekday" => OptionValue::Str(self.first_weekday.name().to_owned()),
            "selectmode" => OptionValue::Str(self.select_mode.name().to_owned()),
            "state" => OptionValue::Str(self.widget_state.name().to_owned()),
            "locale" => OptionValue::Str(self.locale.identifier().to_owned()),
            "showweeknumbers" => OptionValue::Bool(self.show_week_numbers),
            "showothermonthdays" => OptionValue::Bool(self.show_other_month_days),
            "mindate" => self.min_date.map_or(OptionValue::None, OptionValue::Date),
            "maxdate" => self.max_date.map_or(OptionValue::None, OptionValue::Date),
            "year" => OptionValue::Int(i64::from(self.displayed.year())),
            "month" => OptionValue::Int(i64::from(u8::from(self.displayed.month()))),
            "day" => self
                .selection
                .map_or(OptionValue::None, |d| OptionValue::Int(i64::from(d.day()))),
            _ => match self.palette.color(key) {
                Some(color) => OptionValue::Color(color),
                None => return Err(OptionError::UnknownOption(key.to_owned())),
            },
        })
    }
}
