use anyhow::Context;
use calgrid::{
    Calendar, CalendarInput, CalendarOptions, CalendarState, FirstWeekday, InputOutcome, Locale,
    Notification, TagStyle,
};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier};
use ratatui::widgets::Paragraph;
use ratatui::DefaultTerminal;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        date: Option<Date>,
        locale: Locale,
        sunday_first: bool,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut date = None;
        let mut locale = Locale::default();
        let mut sunday_first = false;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('s') | Arg::Long("sunday-first") => sunday_first = true,
                Arg::Short('l') | Arg::Long("locale") => {
                    let value = parser.value()?.string()?;
                    match Locale::from_identifier(&value) {
                        Ok(loc) => locale = loc,
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                Arg::Value(value) if date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            date,
            locale,
            sunday_first,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                date,
                locale,
                sunday_first,
            } => {
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let mut options = CalendarOptions::new().locale(locale);
                if sunday_first {
                    options = options.first_weekday(FirstWeekday::Sunday);
                }
                if let Some(date) = date {
                    options = options.date(date);
                }
                let mut calendar = CalendarState::new(options, today)?;
                seed_demo_events(&mut calendar, today)?;
                let text = Rc::new(RefCell::new(String::new()));
                calendar.bind_text_buffer(Rc::clone(&text));
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(calendar, text).run(terminal)
                })
            }
            Command::Help => {
                println!("Usage: calgrid-demo [-l LOCALE] [-s] [YYYY-MM-DD]");
                println!();
                println!("Month-grid date picker demo with style tags and calendar events");
                println!();
                println!("Options:");
                println!("  -l, --locale LOCALE   Day and month names to use (en, fr, de, es, it)");
                println!("  -s, --sunday-first    Start weeks on Sunday");
                println!("  -h, --help            Display this help message and exit");
                println!("  -V, --version         Show the program version and exit");
                println!();
                println!("Keys:");
                println!("  LEFT, RIGHT, UP, DOWN   Move the day cursor");
                println!("  ENTER, SPACE            Select the date under the cursor");
                println!("  w, PAGE UP              Show the previous month");
                println!("  z, PAGE DOWN            Show the next month");
                println!("  [ / ]                   Show the previous / next year");
                println!("  0, HOME                 Jump back to today's month");
                println!("  q, ESC                  Quit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// A couple of tagged events around today so the overlay styling and the
/// tooltips have something to show
fn seed_demo_events(calendar: &mut CalendarState, today: Date) -> anyhow::Result<()> {
    calendar.tag_config("meeting", TagStyle::new().foreground(Color::LightCyan));
    calendar.tag_config(
        "birthday",
        TagStyle::new()
            .foreground(Color::LightMagenta)
            .modifier(Modifier::BOLD),
    );
    for (days, text, tag) in [
        (1, "Sprint review", "meeting"),
        (3, "Mel's birthday", "birthday"),
        (3, "One-on-one", "meeting"),
        (-2, "Retro notes due", "meeting"),
    ] {
        if let Some(date) = today.checked_add(time::Duration::days(days)) {
            calendar.calevent_create(date, text, vec![tag.to_owned()])?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let mouse = execute!(io::stdout(), EnableMouseCapture).is_ok();
    let r = func(terminal);
    if mouse {
        let _ = execute!(io::stdout(), DisableMouseCapture);
    }
    ratatui::restore();
    r
}

#[derive(Clone, Debug)]
struct App {
    calendar: CalendarState,
    text: Rc<RefCell<String>>,
    status: String,
    quitting: bool,
}

impl App {
    fn new(calendar: CalendarState, text: Rc<RefCell<String>>) -> App {
        App {
            calendar,
            text,
            status: String::from("arrows move the cursor; Enter selects; ? is in --help"),
            quitting: false,
        }
    }

    fn run(mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        while !self.quitting {
            self.draw(&mut terminal)?;
            self.handle_events()?;
            self.drain_notifications();
        }
        Ok(())
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        terminal.draw(|frame| {
            let [cal_area, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
            frame.render_stateful_widget(Calendar::new(), cal_area, &mut self.calendar);
            let line = format!(" {}  {}", self.text.borrow(), self.status);
            frame.render_widget(Paragraph::new(line), status_area);
        })?;
        Ok(())
    }

    fn handle_events(&mut self) -> anyhow::Result<()> {
        // Poll with a short timeout so the tooltip timer fires without
        // needing further input
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if let Some(KeyEvent {
                code, modifiers, ..
            }) = ev.as_key_press_event()
            {
                let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
                if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                    self.quitting = true;
                } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                    self.beep()?;
                }
            } else if let Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) = ev
            {
                self.handle_mouse(kind, column, row);
            }
            // else: Redraw on resize, and we might as well redraw on other
            // stuff too
        }
        self.calendar.tick(Instant::now());
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        let input = match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quitting = true;
                return true;
            }
            KeyCode::Left => CalendarInput::CursorLeft,
            KeyCode::Right => CalendarInput::CursorRight,
            KeyCode::Up => CalendarInput::CursorUp,
            KeyCode::Down => CalendarInput::CursorDown,
            KeyCode::Enter | KeyCode::Char(' ') => CalendarInput::Activate,
            KeyCode::Char('w') | KeyCode::PageUp => CalendarInput::PrevMonth,
            KeyCode::Char('z') | KeyCode::PageDown => CalendarInput::NextMonth,
            KeyCode::Char('[') => CalendarInput::PrevYear,
            KeyCode::Char(']') => CalendarInput::NextYear,
            KeyCode::Char('0') | KeyCode::Home => CalendarInput::Today,
            _ => return false,
        };
        self.calendar.handle_input(input) == InputOutcome::Handled
    }

    fn handle_mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        let input = match kind {
            MouseEventKind::Down(MouseButton::Left) => CalendarInput::Click { column, row },
            MouseEventKind::Moved => CalendarInput::Hover {
                column,
                row,
                now: Instant::now(),
            },
            _ => return,
        };
        self.calendar.handle_input(input);
    }

    fn drain_notifications(&mut self) {
        while let Some(notification) = self.calendar.take_notification() {
            self.status = match notification {
                Notification::SelectionChanged(date) => {
                    match self.calendar.format_date(date, "%A, %x") {
                        Ok(s) => format!("selected {s}"),
                        Err(_) => format!("selected {date}"),
                    }
                }
                Notification::MonthChanged(year, month) => {
                    format!("viewing {} {year}", self.calendar.locale().month_name(month))
                }
            };
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }
}
