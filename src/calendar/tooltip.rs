use std::time::{Duration, Instant};
use time::Date;

/// Deferred tooltip timer: a single-shot delay armed by hovering a day
/// cell, cancelled (or re-armed) the moment the hover target changes.
/// Time is injected by the caller, so the state machine is testable
/// without sleeping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TooltipState {
    delay: Duration,
    hover: Option<Hover>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Hover {
    date: Date,
    since: Instant,
    shown: bool,
}

impl TooltipState {
    pub(crate) fn new(delay: Duration) -> TooltipState {
        TooltipState { delay, hover: None }
    }

    pub(crate) fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// The pointer is over `date`.  Staying on the same date keeps the
    /// running timer (and any visible tooltip); moving re-arms it.
    pub(crate) fn hover(&mut self, date: Date, now: Instant) {
        if self.hover.is_none_or(|h| h.date != date) {
            self.hover = Some(Hover {
                date,
                since: now,
                shown: false,
            });
        }
    }

    /// The pointer left the grid
    pub(crate) fn clear(&mut self) {
        self.hover = None;
    }

    /// Advance the timer.  Returns true when visibility just changed, so
    /// the caller knows a redraw is due.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        let delay = self.delay;
        if let Some(h) = self.hover.as_mut() {
            if !h.shown && now.duration_since(h.since) >= delay {
                h.shown = true;
                return true;
            }
        }
        false
    }

    /// The date whose tooltip is currently visible
    pub(crate) fn shown(&self) -> Option<Date> {
        self.hover.and_then(|h| h.shown.then_some(h.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const DELAY: Duration = Duration::from_millis(1500);

    #[test]
    fn test_shows_after_delay() {
        let mut tooltip = TooltipState::new(DELAY);
        let t0 = Instant::now();
        tooltip.hover(date!(2020 - 01 - 15), t0);
        assert!(!tooltip.tick(t0));
        assert!(!tooltip.tick(t0 + DELAY / 2));
        assert_eq!(tooltip.shown(), None);
        assert!(tooltip.tick(t0 + DELAY));
        assert_eq!(tooltip.shown(), Some(date!(2020 - 01 - 15)));
        // already visible; no further visibility change
        assert!(!tooltip.tick(t0 + DELAY * 2));
    }

    #[test]
    fn test_moving_away_re_arms() {
        let mut tooltip = TooltipState::new(DELAY);
        let t0 = Instant::now();
        tooltip.hover(date!(2020 - 01 - 15), t0);
        tooltip.hover(date!(2020 - 01 - 16), t0 + DELAY / 2);
        assert!(!tooltip.tick(t0 + DELAY), "timer restarted on the new cell");
        assert!(tooltip.tick(t0 + DELAY / 2 + DELAY));
        assert_eq!(tooltip.shown(), Some(date!(2020 - 01 - 16)));
    }

    #[test]
    fn test_staying_put_keeps_the_timer() {
        let mut tooltip = TooltipState::new(DELAY);
        let t0 = Instant::now();
        tooltip.hover(date!(2020 - 01 - 15), t0);
        tooltip.hover(date!(2020 - 01 - 15), t0 + DELAY / 2);
        assert!(tooltip.tick(t0 + DELAY), "original arming time still counts");
    }

    #[test]
    fn test_clear_cancels() {
        let mut tooltip = TooltipState::new(DELAY);
        let t0 = Instant::now();
        tooltip.hover(date!(2020 - 01 - 15), t0);
        tooltip.clear();
        assert!(!tooltip.tick(t0 + DELAY * 2));
        assert_eq!(tooltip.shown(), None);
    }
}
