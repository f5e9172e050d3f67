use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use time::Date;

/// Identifier of a calendar event, unique and stable for the lifetime of
/// the table that issued it.  Ids are never reused after removal.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CalEventId(u64);

impl fmt::Display for CalEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dated annotation: some text plus the names of the tags that style it
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CalEvent {
    pub date: Date,
    pub text: String,
    pub tags: Vec<String>,
}

/// The widget's calendar events, with a per-date stacking order.
///
/// Within one date the events are ordered bottom to top; the topmost
/// event's tags win the day cell's styling, and tooltips list texts
/// topmost first.  New events enter at the top of their date's stack.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventTable {
    events: BTreeMap<CalEventId, CalEvent>,
    stacks: BTreeMap<Date, Vec<CalEventId>>,
    next_id: u64,
}

impl EventTable {
    pub fn new() -> EventTable {
        EventTable::default()
    }

    pub fn create<S: Into<String>>(
        &mut self,
        date: Date,
        text: S,
        tags: Vec<String>,
    ) -> CalEventId {
        let id = CalEventId(self.next_id);
        self.next_id += 1;
        self.events.insert(
            id,
            CalEvent {
                date,
                text: text.into(),
                tags,
            },
        );
        self.stacks.entry(date).or_default().push(id);
        id
    }

    pub fn get(&self, id: CalEventId) -> Result<&CalEvent, CalEventError> {
        self.events.get(&id).ok_or(CalEventError::UnknownEvent(id))
    }

    pub fn set_text<S: Into<String>>(
        &mut self,
        id: CalEventId,
        text: S,
    ) -> Result<(), CalEventError> {
        self.event_mut(id)?.text = text.into();
        Ok(())
    }

    pub fn set_tags(&mut self, id: CalEventId, tags: Vec<String>) -> Result<(), CalEventError> {
        self.event_mut(id)?.tags = tags;
        Ok(())
    }

    /// Move an event to another date; it enters at the top of the new
    /// date's stack.
    pub fn set_date(&mut self, id: CalEventId, date: Date) -> Result<(), CalEventError> {
        let old = self.event_mut(id)?.date;
        if old == date {
            return Ok(());
        }
        self.unstack(old, id);
        self.stacks.entry(date).or_default().push(id);
        self.events
            .get_mut(&id)
            .expect("event was just looked up")
            .date = date;
        Ok(())
    }

    pub fn remove(&mut self, id: CalEventId) -> Result<CalEvent, CalEventError> {
        let event = self
            .events
            .remove(&id)
            .ok_or(CalEventError::UnknownEvent(id))?;
        self.unstack(event.date, id);
        Ok(event)
    }

    /// Move an event to the top of its date's stack
    pub fn raise(&mut self, id: CalEventId) -> Result<(), CalEventError> {
        let date = self.get(id)?.date;
        let stack = self.stack_mut(date, id);
        stack.retain(|&other| other != id);
        stack.push(id);
        Ok(())
    }

    /// Move an event to the bottom of its date's stack
    pub fn lower(&mut self, id: CalEventId) -> Result<(), CalEventError> {
        let date = self.get(id)?.date;
        let stack = self.stack_mut(date, id);
        stack.retain(|&other| other != id);
        stack.insert(0, id);
        Ok(())
    }

    /// The events of one date, bottom of the stack first
    pub fn date_stack(&self, date: Date) -> &[CalEventId] {
        self.stacks.get(&date).map_or(&[], Vec::as_slice)
    }

    /// Filtered query.  With a `date` filter, results come back in
    /// stacking order, topmost first; otherwise in ascending id order.
    pub fn query(&self, date: Option<Date>, tag: Option<&str>) -> Vec<CalEventId> {
        let matches_tag = |id: &CalEventId| {
            tag.is_none_or(|t| {
                self.events
                    .get(id)
                    .is_some_and(|ev| ev.tags.iter().any(|n| n == t))
            })
        };
        match date {
            Some(date) => self
                .date_stack(date)
                .iter()
                .rev()
                .copied()
                .filter(matches_tag)
                .collect(),
            None => self.events.keys().copied().filter(matches_tag).collect(),
        }
    }

    /// Remove a deleted tag's name from every event referencing it
    pub fn strip_tag(&mut self, name: &str) {
        for event in self.events.values_mut() {
            event.tags.retain(|n| n != name);
        }
    }

    /// Tag references of a date's events, one set per event, bottom of
    /// the stack first — the order style resolution layers them in.
    pub(crate) fn date_tag_sets(&self, date: Date) -> impl Iterator<Item = &[String]> {
        self.date_stack(date)
            .iter()
            .filter_map(|id| self.events.get(id).map(|ev| ev.tags.as_slice()))
    }

    /// Tooltip payload of a date: event texts, topmost first, one per
    /// line.  `None` when the date has no events.
    pub fn tooltip_text(&self, date: Date) -> Option<String> {
        let texts = self
            .date_stack(date)
            .iter()
            .rev()
            .filter_map(|id| self.events.get(id))
            .map(|ev| ev.text.as_str())
            .collect::<Vec<_>>();
        (!texts.is_empty()).then(|| texts.join("\n"))
    }

    fn event_mut(&mut self, id: CalEventId) -> Result<&mut CalEvent, CalEventError> {
        self.events
            .get_mut(&id)
            .ok_or(CalEventError::UnknownEvent(id))
    }

    fn stack_mut(&mut self, date: Date, id: CalEventId) -> &mut Vec<CalEventId> {
        let stack = self
            .stacks
            .get_mut(&date)
            .expect("an existing event's date has a stack");
        debug_assert!(stack.contains(&id), "event should be on its date's stack");
        stack
    }

    fn unstack(&mut self, date: Date, id: CalEventId) {
        if let Some(stack) = self.stacks.get_mut(&date) {
            stack.retain(|&other| other != id);
            if stack.is_empty() {
                self.stacks.remove(&date);
            }
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CalEventError {
    #[error("unknown calendar event: {0}")]
    UnknownEvent(CalEventId),
    /// An event was configured with a tag name the tag table does not know
    #[error("unknown tag: {0:?}")]
    UnknownTag(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    #[test]
    fn test_ids_are_unique_and_stable() {
        let mut table = EventTable::new();
        let d = date!(2020 - 01 - 15);
        let a = table.create(d, "a", Vec::new());
        let b = table.create(d, "b", Vec::new());
        assert_ne!(a, b);
        table.remove(a).unwrap();
        let c = table.create(d, "c", Vec::new());
        assert_ne!(c, a, "removed ids are not reused");
        assert_ne!(c, b);
        assert_eq!(table.get(b).unwrap().text, "b");
    }

    #[test]
    fn test_remove_excludes_from_queries() {
        let mut table = EventTable::new();
        let d = date!(2020 - 01 - 15);
        let a = table.create(d, "a", Vec::new());
        let b = table.create(d, "b", Vec::new());
        table.remove(a).unwrap();
        assert_eq!(table.query(None, None), vec![b]);
        assert_eq!(table.query(Some(d), None), vec![b]);
        assert_eq!(table.remove(a), Err(CalEventError::UnknownEvent(a)));
    }

    #[test]
    fn test_new_events_enter_at_the_top() {
        let mut table = EventTable::new();
        let d = date!(2020 - 01 - 15);
        let a = table.create(d, "a", Vec::new());
        let b = table.create(d, "b", Vec::new());
        assert_eq!(table.date_stack(d), [a, b]);
        assert_eq!(table.query(Some(d), None), vec![b, a], "topmost first");
    }

    #[test]
    fn test_raise_and_lower() {
        let mut table = EventTable::new();
        let d = date!(2020 - 01 - 15);
        let a = table.create(d, "a", Vec::new());
        let b = table.create(d, "b", Vec::new());
        let c = table.create(d, "c", Vec::new());
        table.raise(a).unwrap();
        assert_eq!(table.date_stack(d), [b, c, a]);
        table.lower(c).unwrap();
        assert_eq!(table.date_stack(d), [c, b, a]);
        let gone = CalEventId(999);
        assert_eq!(table.raise(gone), Err(CalEventError::UnknownEvent(gone)));
    }

    #[test]
    fn test_query_filters() {
        let mut table = EventTable::new();
        let d1 = date!(2020 - 01 - 15);
        let d2 = date!(2020 - 01 - 16);
        let a = table.create(d1, "a", owned(&["birthday"]));
        let b = table.create(d1, "b", owned(&["meeting"]));
        let c = table.create(d2, "c", owned(&["birthday", "meeting"]));
        assert_eq!(table.query(None, None), vec![a, b, c]);
        assert_eq!(table.query(None, Some("birthday")), vec![a, c]);
        assert_eq!(table.query(Some(d1), Some("meeting")), vec![b]);
        assert_eq!(table.query(Some(d2), Some("lunch")), Vec::new());
    }

    #[test]
    fn test_set_date_restacks() {
        let mut table = EventTable::new();
        let d1 = date!(2020 - 01 - 15);
        let d2 = date!(2020 - 01 - 16);
        let a = table.create(d1, "a", Vec::new());
        let b = table.create(d2, "b", Vec::new());
        table.set_date(a, d2).unwrap();
        assert_eq!(table.date_stack(d1), []);
        assert_eq!(table.date_stack(d2), [b, a]);
        assert_eq!(table.get(a).unwrap().date, d2);
    }

    #[test]
    fn test_strip_tag() {
        let mut table = EventTable::new();
        let d = date!(2020 - 01 - 15);
        let a = table.create(d, "a", owned(&["birthday", "meeting"]));
        table.strip_tag("birthday");
        assert_eq!(table.get(a).unwrap().tags, ["meeting"]);
        assert_eq!(table.query(None, Some("birthday")), Vec::new());
    }

    #[test]
    fn test_tooltip_text_topmost_first() {
        let mut table = EventTable::new();
        let d = date!(2020 - 01 - 15);
        table.create(d, "first", Vec::new());
        table.create(d, "second", Vec::new());
        assert_eq!(table.tooltip_text(d).unwrap(), "second\nfirst");
        assert_eq!(table.tooltip_text(date!(2020 - 01 - 16)), None);
    }
}
