use super::grid::DAYS_IN_WEEK;
use super::state::{CalendarState, HitTarget};
use crate::palette::DayKind;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Margin, Rect},
    style::Style,
    text::Text,
    widgets::{Block, Clear, Paragraph, StatefulWidget, Widget},
};

/// Columns per day cell (`" 15 "` / `"[15]"`)
const DAY_WIDTH: u16 = 4;

/// Columns of the optional ISO-week-number column
const WEEKNUM_WIDTH: u16 = 4;

/// Lines taken up by the title row, the weekday row, and the rule under
/// them
const HEADER_LINES: u16 = 3;

const ACS_HLINE: char = '─';
const PREV_ARROW: &str = "◂";
const NEXT_ARROW: &str = "▸";

/// The month-grid widget.  All of the model lives in
/// [`CalendarState`]; rendering also records the cell geometry needed
/// for mouse hit-testing back into the state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Calendar;

impl Calendar {
    pub fn new() -> Calendar {
        Calendar
    }
}

impl StatefulWidget for Calendar {
    type State = CalendarState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let grid = state.grid();
        let weeknum_width = if state.show_week_numbers() {
            WEEKNUM_WIDTH
        } else {
            0
        };
        let grid_width = weeknum_width + DAY_WIDTH * 7;
        let week_qty = u16::try_from(grid.weeks().len()).unwrap_or(6);
        let [outer] = Layout::horizontal([Constraint::Length((grid_width + 2).min(area.width))])
            .flex(Flex::Center)
            .areas(area);
        let [outer] =
            Layout::vertical([Constraint::Length((HEADER_LINES + week_qty + 2).min(outer.height))])
                .areas(outer);
        buf.set_style(outer, state.palette().base_style());
        let block = Block::bordered().border_style(state.palette().border_style());
        let inner = block.inner(outer);
        block.render(outer, buf);

        let headers = state.palette().day_style(DayKind::Headers);
        let mut hits = Vec::with_capacity(grid.weeks().len() * DAYS_IN_WEEK + 2);
        let mut canvas = BufferCanvas::new(inner, buf);

        // title row: navigation arrows flanking "<month name> <year>"
        canvas.mvprint(0, 1, PREV_ARROW, Some(headers));
        canvas.mvprint(0, grid_width.saturating_sub(2), NEXT_ARROW, Some(headers));
        hits.push((
            Rect::new(inner.x, inner.y, 3, 1).intersection(inner),
            HitTarget::PrevMonth,
        ));
        hits.push((
            Rect::new(
                (inner.x + grid_width.saturating_sub(3)).min(inner.right()),
                inner.y,
                3,
                1,
            )
            .intersection(inner),
            HitTarget::NextMonth,
        ));
        let (year, month) = state.displayed_month();
        let title = format!("{} {year}", state.locale().month_name(month));
        let title_width = u16::try_from(title.chars().count()).unwrap_or(u16::MAX);
        canvas.mvprint(
            0,
            grid_width.saturating_sub(title_width) / 2,
            title,
            Some(headers),
        );

        // weekday abbreviations, two columns each
        let mut weekday = state.first_weekday().weekday();
        for col in 0..7u16 {
            let abbrev = state
                .locale()
                .day_abbrev(weekday)
                .chars()
                .take(2)
                .collect::<String>();
            canvas.mvprint(1, weeknum_width + col * DAY_WIDTH + 1, abbrev, Some(headers));
            weekday = weekday.next();
        }
        canvas.hline(2, 0, ACS_HLINE, grid_width);

        for (row, week) in std::iter::zip(0u16.., grid.weeks()) {
            let y = HEADER_LINES + row;
            if state.show_week_numbers() {
                canvas.mvprint(
                    y,
                    0,
                    format!(" {:2} ", grid.week_number(usize::from(row))),
                    Some(state.palette().day_style(DayKind::WeekNumber)),
                );
            }
            for (col, cell) in std::iter::zip(0u16.., week) {
                if !cell.in_month && !state.show_other_month_days() {
                    continue;
                }
                let x = weeknum_width + DAY_WIDTH * col;
                let text = if state.selection() == Some(cell.date) {
                    format!("[{:2}]", cell.date.day())
                } else {
                    format!(" {:2} ", cell.date.day())
                };
                canvas.mvprint(y, x, text, Some(state.day_style(*cell)));
                hits.push((
                    Rect::new(inner.x + x, inner.y + y, DAY_WIDTH, 1).intersection(inner),
                    HitTarget::Day(cell.date),
                ));
            }
        }
        state.hit_map = hits;

        if let Some((date, text)) = state.tooltip_payload() {
            let anchor = state
                .hit_map
                .iter()
                .find(|&&(_, target)| target == HitTarget::Day(date))
                .map(|&(rect, _)| rect);
            if let Some(anchor) = anchor {
                render_tooltip(anchor, &text, state.palette().tooltip_style(), buf);
            }
        }
    }
}

/// Bordered popup listing a day's event texts, drawn below the cell
fn render_tooltip(anchor: Rect, text: &str, style: Style, buf: &mut Buffer) {
    let lines = text.lines().count();
    let width = text
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let popup = Rect::new(
        anchor.x,
        anchor.y.saturating_add(1),
        u16::try_from(width + 2).unwrap_or(u16::MAX),
        u16::try_from(lines + 2).unwrap_or(u16::MAX),
    )
    .intersection(*buf.area());
    if popup.width < 2 || popup.height < 2 {
        return;
    }
    Clear.render(popup, buf);
    Block::bordered().style(style).render(popup, buf);
    Paragraph::new(Text::raw(text)).render(popup.inner(Margin::new(1, 1)), buf);
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond
            // the calendar's area, though we need to be sure that the Rect
            // passed to the Paragraph is entirely within the frame lest a
            // panic result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::state::{CalendarInput, InputOutcome};
    use crate::options::{CalendarOptions, FirstWeekday, OptionValue};
    use crate::tags::TagStyle;
    use ratatui::style::{Color, Modifier};
    use std::time::Instant;
    use time::macros::date;

    fn sample_state() -> CalendarState {
        let options = CalendarOptions::new().date(date!(2020 - 01 - 08));
        CalendarState::new(options, date!(2020 - 01 - 15)).unwrap()
    }

    fn render(state: &mut CalendarState, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        Calendar::new().render(area, &mut buffer, state);
        buffer
    }

    fn content_lines(buffer: &Buffer) -> Vec<String> {
        let area = *buffer.area();
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_render_january_2020() {
        let mut state = sample_state();
        let buffer = render(&mut state, 34, 10);
        let mut expected = Buffer::with_lines([
            "┌────────────────────────────────┐",
            "│ ◂        January 2020        ▸ │",
            "│     Mo  Tu  We  Th  Fr  Sa  Su │",
            "│────────────────────────────────│",
            "│  1  30  31   1   2   3   4   5 │",
            "│  2   6   7 [ 8]  9  10  11  12 │",
            "│  3  13  14  15  16  17  18  19 │",
            "│  4  20  21  22  23  24  25  26 │",
            "│  5  27  28  29  30  31   1   2 │",
            "└────────────────────────────────┘",
        ]);
        let base = Style::new().bg(Color::Black).fg(Color::White);
        let border = Style::new().bg(Color::Black).fg(Color::DarkGray);
        let headers = base.add_modifier(Modifier::BOLD);
        expected.set_style(*expected.area(), base);
        expected.set_style(Rect::new(0, 0, 34, 1), border);
        expected.set_style(Rect::new(0, 9, 34, 1), border);
        expected.set_style(Rect::new(0, 0, 1, 10), border);
        expected.set_style(Rect::new(33, 0, 1, 10), border);
        // arrows and title
        expected.set_style(Rect::new(2, 1, 1, 1), headers);
        expected.set_style(Rect::new(31, 1, 1, 1), headers);
        expected.set_style(Rect::new(11, 1, 12, 1), headers);
        // weekday labels
        for col in 0..7u16 {
            expected.set_style(Rect::new(6 + 4 * col, 2, 2, 1), headers);
        }
        // week-number column
        for row in 0..5u16 {
            expected.set_style(Rect::new(1, 4 + row, 4, 1), headers);
        }
        // other-month days (Dec 30 & 31, Feb 1 & 2 — the latter on a
        // weekend)
        let dim = Style::new().fg(Color::DarkGray);
        expected.set_style(Rect::new(5, 4, 4, 1), dim);
        expected.set_style(Rect::new(9, 4, 4, 1), dim);
        expected.set_style(Rect::new(25, 8, 4, 1), dim);
        expected.set_style(Rect::new(29, 8, 4, 1), dim);
        // weekends
        let weekend = Style::new().fg(Color::LightRed);
        for row in [4u16, 5, 6, 7] {
            expected.set_style(Rect::new(25, row, 4, 1), weekend);
            expected.set_style(Rect::new(29, row, 4, 1), weekend);
        }
        // selection (also carrying the day cursor)
        expected.set_style(
            Rect::new(13, 5, 4, 1),
            Style::new()
                .bg(Color::LightBlue)
                .fg(Color::Black)
                .add_modifier(Modifier::REVERSED),
        );
        // today
        expected.set_style(
            Rect::new(13, 6, 4, 1),
            Style::new().add_modifier(Modifier::BOLD),
        );
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_render_compact_variant() {
        let options = CalendarOptions::new()
            .first_weekday(FirstWeekday::Sunday)
            .show_week_numbers(false)
            .show_other_month_days(false);
        let mut state = CalendarState::new(options, date!(2021 - 02 - 14)).unwrap();
        let buffer = render(&mut state, 30, 10);
        let expected = [
            "┌────────────────────────────┐",
            "│ ◂     February 2021      ▸ │",
            "│ Su  Mo  Tu  We  Th  Fr  Sa │",
            "│────────────────────────────│",
            "│      1   2   3   4   5   6 │",
            "│  7   8   9  10  11  12  13 │",
            "│ 14  15  16  17  18  19  20 │",
            "│ 21  22  23  24  25  26  27 │",
            "│ 28                         │",
            "└────────────────────────────┘",
        ];
        assert_eq!(content_lines(&buffer), expected);
    }

    #[test]
    fn test_render_localized_headers() {
        let mut state = sample_state();
        state
            .configure("locale", OptionValue::Str("de_DE".into()))
            .unwrap();
        let buffer = render(&mut state, 34, 10);
        let lines = content_lines(&buffer);
        assert!(lines[1].contains("Januar 2020"), "{:?}", lines[1]);
        assert!(
            lines[2].contains("Mo  Di  Mi  Do  Fr  Sa  So"),
            "{:?}",
            lines[2]
        );
    }

    #[test]
    fn test_render_records_hit_map() {
        let mut state = sample_state();
        render(&mut state, 34, 10);
        assert!(state
            .hit_map
            .contains(&(Rect::new(1, 1, 3, 1), HitTarget::PrevMonth)));
        assert!(state
            .hit_map
            .contains(&(Rect::new(13, 5, 4, 1), HitTarget::Day(date!(2020 - 01 - 08)))));
        // clicking the cell one to the right of the selection selects
        // January 9
        assert_eq!(
            state.handle_input(CalendarInput::Click { column: 17, row: 5 }),
            InputOutcome::Handled
        );
        assert_eq!(state.selection(), Some(date!(2020 - 01 - 09)));
    }

    #[test]
    fn test_hidden_other_month_days_are_not_clickable() {
        let options = CalendarOptions::new()
            .first_weekday(FirstWeekday::Sunday)
            .show_week_numbers(false)
            .show_other_month_days(false);
        let mut state = CalendarState::new(options, date!(2021 - 02 - 14)).unwrap();
        render(&mut state, 30, 10);
        assert!(state
            .hit_map
            .iter()
            .all(|&(_, target)| target != HitTarget::Day(date!(2021 - 01 - 31))));
    }

    #[test]
    fn test_tooltip_popup() {
        let mut state = sample_state();
        state.tag_config("birthday", TagStyle::new().foreground(Color::Red));
        state
            .calevent_create(date!(2020 - 01 - 08), "cake", vec!["birthday".to_owned()])
            .unwrap();
        render(&mut state, 40, 14);
        let cell = state
            .hit_map
            .iter()
            .find(|&&(_, target)| target == HitTarget::Day(date!(2020 - 01 - 08)))
            .map(|&(rect, _)| rect)
            .unwrap();
        let t0 = Instant::now();
        state.handle_input(CalendarInput::Hover {
            column: cell.x,
            row: cell.y,
            now: t0,
        });
        assert!(state.tick(t0 + state.palette().tooltip_delay));
        let buffer = render(&mut state, 40, 14);
        let lines = content_lines(&buffer);
        assert!(
            lines.iter().any(|line| line.contains("cake")),
            "tooltip text should be rendered: {lines:#?}"
        );
    }
}
