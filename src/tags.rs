use ratatui::style::{Color, Modifier, Style};
use thiserror::Error;

/// A named tag's style bundle.  Unset attributes inherit from whatever
/// lies below the tag in the stacking order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TagStyle {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub modifier: Option<Modifier>,
}

impl TagStyle {
    pub fn new() -> TagStyle {
        TagStyle::default()
    }

    pub fn foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Overwrite `self`'s attributes with those `upper` sets
    pub(crate) fn layer(&mut self, upper: &TagStyle) {
        if let Some(fg) = upper.foreground {
            self.foreground = Some(fg);
        }
        if let Some(bg) = upper.background {
            self.background = Some(bg);
        }
        if let Some(m) = upper.modifier {
            self.modifier = Some(m);
        }
    }

    /// Patch a base style with this bundle's attributes
    pub fn apply_to(&self, mut style: Style) -> Style {
        if let Some(fg) = self.foreground {
            style = style.fg(fg);
        }
        if let Some(bg) = self.background {
            style = style.bg(bg);
        }
        if let Some(m) = self.modifier {
            style = style.add_modifier(m);
        }
        style
    }
}

/// The widget's tag table: named style bundles with two independent
/// orders.  Creation order is what [`TagTable::names`] reports; stacking
/// order (bottom to top) is what style resolution layers in, reordered by
/// [`TagTable::raise`] and [`TagTable::lower`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagTable {
    entries: Vec<(String, TagStyle)>,
    stacking: Vec<String>,
}

impl TagTable {
    pub fn new() -> TagTable {
        TagTable::default()
    }

    /// Create-or-update a tag.  A new tag enters at the top of the
    /// stacking order; updating merges the given attributes into the
    /// stored bundle without disturbing stacking.
    pub fn config(&mut self, name: &str, style: TagStyle) {
        if let Some((_, stored)) = self.entries.iter_mut().find(|(n, _)| n == name) {
            stored.layer(&style);
        } else {
            self.entries.push((name.to_owned(), style));
            self.stacking.push(name.to_owned());
        }
    }

    /// The stored style bundle of a tag
    pub fn style(&self, name: &str) -> Result<&TagStyle, TagError> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, style)| style)
            .ok_or_else(|| TagError::UnknownTag(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Tag names in creation order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Move a tag to the top of the stacking order
    pub fn raise(&mut self, name: &str) -> Result<(), TagError> {
        let i = self.stacking_index(name)?;
        let tag = self.stacking.remove(i);
        self.stacking.push(tag);
        Ok(())
    }

    /// Move a tag to the bottom of the stacking order
    pub fn lower(&mut self, name: &str) -> Result<(), TagError> {
        let i = self.stacking_index(name)?;
        let tag = self.stacking.remove(i);
        self.stacking.insert(0, tag);
        Ok(())
    }

    /// Remove a tag.  The caller is responsible for cascading the removal
    /// into anything that references the tag by name.
    pub fn delete(&mut self, name: &str) -> Result<TagStyle, TagError> {
        let i = self
            .entries
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| TagError::UnknownTag(name.to_owned()))?;
        let (_, style) = self.entries.remove(i);
        self.stacking.retain(|n| n != name);
        Ok(style)
    }

    /// Effective style of a set of tag references: layers the referenced
    /// tags bottom-to-top in stacking order, so for each attribute the
    /// topmost tag that sets it wins.  Unknown names are skipped.
    pub fn resolve(&self, tags: &[String]) -> TagStyle {
        let mut effective = TagStyle::default();
        for name in &self.stacking {
            if tags.contains(name) {
                if let Ok(style) = self.style(name) {
                    effective.layer(style);
                }
            }
        }
        effective
    }

    fn stacking_index(&self, name: &str) -> Result<usize, TagError> {
        self.stacking
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| TagError::UnknownTag(name.to_owned()))
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TagError {
    #[error("unknown tag: {0:?}")]
    UnknownTag(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    #[test]
    fn test_names_keep_creation_order() {
        let mut table = TagTable::new();
        table.config("birthday", TagStyle::new().foreground(Color::Red));
        table.config("meeting", TagStyle::new().foreground(Color::Blue));
        table.config("holiday", TagStyle::new().foreground(Color::Green));
        table.raise("birthday").unwrap();
        table.lower("holiday").unwrap();
        let names = table.names().collect::<Vec<_>>();
        assert_eq!(names, ["birthday", "meeting", "holiday"]);
    }

    #[test]
    fn test_config_merges_without_clearing() {
        let mut table = TagTable::new();
        table.config(
            "birthday",
            TagStyle::new().foreground(Color::Red).modifier(Modifier::BOLD),
        );
        table.config("birthday", TagStyle::new().background(Color::White));
        let style = table.style("birthday").unwrap();
        assert_eq!(style.foreground, Some(Color::Red));
        assert_eq!(style.background, Some(Color::White));
        assert_eq!(style.modifier, Some(Modifier::BOLD));
    }

    #[test]
    fn test_topmost_tag_wins_per_attribute() {
        let mut table = TagTable::new();
        table.config(
            "low",
            TagStyle::new().foreground(Color::Red).background(Color::Black),
        );
        table.config("high", TagStyle::new().foreground(Color::Blue));
        let effective = table.resolve(&owned(&["low", "high"]));
        // "high" is above "low" and sets only the foreground; the
        // background shows through from "low"
        assert_eq!(effective.foreground, Some(Color::Blue));
        assert_eq!(effective.background, Some(Color::Black));
    }

    #[test]
    fn test_raise_and_lower_change_the_winner() {
        let mut table = TagTable::new();
        table.config("a", TagStyle::new().foreground(Color::Red));
        table.config("b", TagStyle::new().foreground(Color::Blue));
        let tags = owned(&["a", "b"]);
        assert_eq!(table.resolve(&tags).foreground, Some(Color::Blue));
        table.raise("a").unwrap();
        assert_eq!(table.resolve(&tags).foreground, Some(Color::Red));
        table.lower("a").unwrap();
        assert_eq!(table.resolve(&tags).foreground, Some(Color::Blue));
    }

    #[test]
    fn test_resolution_ignores_unreferenced_tags() {
        let mut table = TagTable::new();
        table.config("a", TagStyle::new().foreground(Color::Red));
        table.config("b", TagStyle::new().foreground(Color::Blue));
        let effective = table.resolve(&owned(&["a"]));
        assert_eq!(effective.foreground, Some(Color::Red));
        assert_eq!(table.resolve(&owned(&["nonexistent"])), TagStyle::default());
    }

    #[test]
    fn test_delete() {
        let mut table = TagTable::new();
        table.config("a", TagStyle::new().foreground(Color::Red));
        table.delete("a").unwrap();
        assert!(!table.contains("a"));
        assert_eq!(table.names().count(), 0);
        assert_eq!(table.delete("a"), Err(TagError::UnknownTag("a".into())));
    }

    #[test]
    fn test_unknown_tag_errors() {
        let mut table = TagTable::new();
        assert_eq!(table.style("x"), Err(TagError::UnknownTag("x".into())));
        assert_eq!(table.raise("x"), Err(TagError::UnknownTag("x".into())));
        assert_eq!(table.lower("x"), Err(TagError::UnknownTag("x".into())));
    }

    #[test]
    fn test_apply_to() {
        let base = Style::new().bg(Color::Black).fg(Color::White);
        let patched = TagStyle::new().foreground(Color::Red).apply_to(base);
        assert_eq!(patched.fg, Some(Color::Red));
        assert_eq!(patched.bg, Some(Color::Black));
    }
}
