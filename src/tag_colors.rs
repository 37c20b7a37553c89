use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};

pub const DEFAULT_TAG_COLOR: &str = "#cccccc";

/// Emitted whenever the resolved color of a tag changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorChange {
    pub tag: String,
    pub color: String,
}

/// Tag name to display color, shared by everything that draws a tag.
///
/// Lookups never fail: tags without an explicit entry resolve to the
/// default color. Subscribers receive a [`ColorChange`] for every tag whose
/// resolved color moves, which lets already-built widgets recolor in place.
pub struct TagColorRegistry {
    colors: HashMap<String, String>,
    default_color: String,
    subscribers: Vec<Sender<ColorChange>>,
}

impl Default for TagColorRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_COLOR)
    }
}

impl TagColorRegistry {
    pub fn new(default_color: &str) -> Self {
        let default_color = default_color.trim();
        Self {
            colors: HashMap::new(),
            default_color: if default_color.is_empty() {
                DEFAULT_TAG_COLOR.to_owned()
            } else {
                default_color.to_owned()
            },
            subscribers: Vec::new(),
        }
    }

    pub fn with_colors(default_color: &str, colors: HashMap<String, String>) -> Self {
        let mut registry = Self::new(default_color);
        registry.colors = colors;
        registry
    }

    pub fn default_color(&self) -> &str {
        &self.default_color
    }

    /// Explicit color for `tag`, if the server has one on record.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.colors
            .get(tag)
            .map(|color| color.as_str())
            .filter(|color| !color.trim().is_empty())
    }

    pub fn resolve(&self, tag: &str) -> &str {
        self.get(tag).unwrap_or(self.default_color.as_str())
    }

    pub fn colors(&self) -> &HashMap<String, String> {
        &self.colors
    }

    pub fn set(&mut self, tag: &str, color: &str) {
        let before = self.resolve(tag).to_owned();
        self.colors.insert(tag.to_owned(), color.to_owned());
        if before != color {
            self.notify(ColorChange {
                tag: tag.to_owned(),
                color: color.to_owned(),
            });
        }
    }

    /// Swaps in the full map the server returned and notifies for every tag
    /// whose resolved color differs from before.
    pub fn replace_all(&mut self, colors: HashMap<String, String>) {
        let previous = std::mem::replace(&mut self.colors, colors);

        let mut changes: Vec<ColorChange> = Vec::new();
        for tag in self.colors.keys() {
            let old = previous
                .get(tag)
                .filter(|c| !c.trim().is_empty())
                .map(|c| c.as_str())
                .unwrap_or(self.default_color.as_str());
            let new = self.resolve(tag);
            if old != new {
                changes.push(ColorChange {
                    tag: tag.clone(),
                    color: new.to_owned(),
                });
            }
        }
        for (tag, old) in &previous {
            if self.colors.contains_key(tag) {
                continue;
            }
            if !old.trim().is_empty() && old.as_str() != self.default_color {
                changes.push(ColorChange {
                    tag: tag.clone(),
                    color: self.default_color.clone(),
                });
            }
        }

        for change in changes {
            self.notify(change);
        }
    }

    pub fn subscribe(&mut self) -> Receiver<ColorChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, change: ColorChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn unknown_tags_resolve_to_default() {
        let registry = TagColorRegistry::with_colors("#cccccc", map(&[("music", "#ffadad")]));
        assert_eq!(registry.resolve("music"), "#ffadad");
        assert_eq!(registry.resolve("gaming"), "#cccccc");
    }

    #[test]
    fn blank_entries_fall_back_to_default() {
        let registry = TagColorRegistry::with_colors("#cccccc", map(&[("music", "")]));
        assert_eq!(registry.get("music"), None);
        assert_eq!(registry.resolve("music"), "#cccccc");
    }

    #[test]
    fn empty_default_uses_builtin() {
        let registry = TagColorRegistry::new("  ");
        assert_eq!(registry.default_color(), DEFAULT_TAG_COLOR);
    }

    #[test]
    fn set_notifies_only_on_change() {
        let mut registry = TagColorRegistry::default();
        let rx = registry.subscribe();

        registry.set("music", "#cccccc");
        assert!(rx.try_recv().is_err());

        registry.set("music", "#a0c4ff");
        assert_eq!(
            rx.try_recv().ok(),
            Some(ColorChange {
                tag: "music".into(),
                color: "#a0c4ff".into()
            })
        );
    }

    #[test]
    fn replace_all_reports_changed_and_dropped_tags() {
        let mut registry =
            TagColorRegistry::with_colors("#cccccc", map(&[("a", "#111111"), ("b", "#222222")]));
        let rx = registry.subscribe();

        registry.replace_all(map(&[("a", "#111111"), ("c", "#333333")]));

        let mut changes: Vec<ColorChange> = rx.try_iter().collect();
        changes.sort_by(|x, y| x.tag.cmp(&y.tag));
        assert_eq!(
            changes,
            vec![
                ColorChange {
                    tag: "b".into(),
                    color: "#cccccc".into()
                },
                ColorChange {
                    tag: "c".into(),
                    color: "#333333".into()
                },
            ]
        );
        assert_eq!(registry.resolve("b"), "#cccccc");
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut registry = TagColorRegistry::default();
        let rx = registry.subscribe();
        drop(rx);
        registry.set("x", "#ffffff");
        assert!(registry.subscribers.is_empty());
    }
}
