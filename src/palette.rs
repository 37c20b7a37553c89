use crate::cards::TagChip;
use crate::tag_colors::TagColorRegistry;

pub const SWATCHES: [&str; 8] = [
    "#ffadad", "#ffd6a5", "#fdffb6", "#caffbf", "#9bf6ff", "#a0c4ff", "#bdb2ff", "#ffc6ff",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swatch {
    pub color: String,
    pub label: Option<&'static str>,
}

/// The fixed swatches followed by a reset swatch carrying the default color.
pub fn swatches(default_color: &str) -> Vec<Swatch> {
    SWATCHES
        .iter()
        .map(|color| Swatch {
            color: (*color).to_owned(),
            label: None,
        })
        .chain(std::iter::once(Swatch {
            color: default_color.to_owned(),
            label: Some("Reset"),
        }))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRequest {
    pub tag: String,
    pub color: String,
}

/// Where a global click landed relative to the open popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Popover,
    Anchor,
    Elsewhere,
}

/// Sidebar list of every known tag, each with a color popover. At most one
/// popover is open at a time.
#[derive(Debug, Default)]
pub struct TagPalette {
    entries: Vec<TagChip>,
    open: Option<String>,
}

impl TagPalette {
    pub fn new(unique_tags: &[String], registry: &TagColorRegistry) -> Self {
        let mut palette = Self::default();
        palette.rebuild(unique_tags, registry);
        palette
    }

    pub fn entries(&self) -> &[TagChip] {
        &self.entries
    }

    pub fn open_tag(&self) -> Option<&str> {
        self.open.as_deref()
    }

    pub fn rebuild(&mut self, unique_tags: &[String], registry: &TagColorRegistry) {
        self.entries = unique_tags
            .iter()
            .map(|tag| TagChip::resolved(tag, registry))
            .collect();
        if let Some(open) = &self.open {
            if !unique_tags.iter().any(|tag| tag == open) {
                self.open = None;
            }
        }
    }

    /// Chip click: opens this tag's popover (closing any other) or closes
    /// it if it was already open.
    pub fn toggle(&mut self, tag: &str) {
        if self.open.as_deref() == Some(tag) {
            self.open = None;
        } else {
            self.open = Some(tag.to_owned());
        }
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    /// Clicks outside both the popover and its chip close it.
    pub fn handle_click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Elsewhere {
            self.open = None;
        }
    }

    /// Swatch click. Always closes the popover; yields a request only when the
    /// color actually changes.
    pub fn choose(
        &mut self,
        tag: &str,
        color: &str,
        registry: &TagColorRegistry,
    ) -> Option<ColorRequest> {
        self.open = None;
        if registry.resolve(tag) == color {
            return None;
        }
        Some(ColorRequest {
            tag: tag.to_owned(),
            color: color.to_owned(),
        })
    }

    pub fn recolor(&mut self, tag: &str, color: &str) -> bool {
        match self.entries.iter_mut().find(|entry| entry.tag == tag) {
            Some(entry) if entry.color != color => {
                entry.color = color.to_owned();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn registry() -> TagColorRegistry {
        let mut colors = HashMap::new();
        colors.insert("music".to_string(), "#ffadad".to_string());
        TagColorRegistry::with_colors("#cccccc", colors)
    }

    #[test]
    fn opening_one_popover_closes_the_other() {
        let mut palette = TagPalette::new(&tags(&["music", "news"]), &registry());
        palette.toggle("music");
        assert_eq!(palette.open_tag(), Some("music"));
        palette.toggle("news");
        assert_eq!(palette.open_tag(), Some("news"));
        palette.toggle("news");
        assert_eq!(palette.open_tag(), None);
    }

    #[test]
    fn same_color_issues_no_request() {
        let registry = registry();
        let mut palette = TagPalette::new(&tags(&["music", "news"]), &registry);
        palette.toggle("music");
        assert_eq!(palette.choose("music", "#ffadad", &registry), None);
        assert_eq!(palette.open_tag(), None);

        assert_eq!(palette.choose("news", "#cccccc", &registry), None);
    }

    #[test]
    fn different_color_issues_request() {
        let registry = registry();
        let mut palette = TagPalette::new(&tags(&["music"]), &registry);
        assert_eq!(
            palette.choose("music", "#caffbf", &registry),
            Some(ColorRequest {
                tag: "music".into(),
                color: "#caffbf".into()
            })
        );
    }

    #[test]
    fn clicks_inside_keep_the_popover_open() {
        let mut palette = TagPalette::new(&tags(&["music"]), &registry());
        palette.toggle("music");
        palette.handle_click(ClickTarget::Popover);
        palette.handle_click(ClickTarget::Anchor);
        assert_eq!(palette.open_tag(), Some("music"));
        palette.handle_click(ClickTarget::Elsewhere);
        assert_eq!(palette.open_tag(), None);
    }

    #[test]
    fn rebuild_closes_popover_of_removed_tag() {
        let mut palette = TagPalette::new(&tags(&["music"]), &registry());
        palette.toggle("music");
        palette.rebuild(&tags(&["news"]), &registry());
        assert_eq!(palette.open_tag(), None);
        assert_eq!(palette.entries()[0].color, "#cccccc");
    }

    #[test]
    fn reset_swatch_carries_default_color() {
        let all = swatches("#cccccc");
        assert_eq!(all.len(), SWATCHES.len() + 1);
        assert_eq!(
            all.last(),
            Some(&Swatch {
                color: "#cccccc".into(),
                label: Some("Reset")
            })
        );
    }
}
