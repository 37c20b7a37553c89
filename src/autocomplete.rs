//! Inline tag completion for comma-separated tag inputs.
//!
//! Only the segment after the last comma is considered. The first known tag
//! (in the order the server listed them) that extends that segment becomes
//! the suggestion; Tab accepts it.

/// Per-input completion state. Empty `current_suggestion` means none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutocompleteState {
    current_suggestion: String,
}

impl AutocompleteState {
    pub fn current_suggestion(&self) -> Option<&str> {
        if self.current_suggestion.is_empty() {
            None
        } else {
            Some(&self.current_suggestion)
        }
    }

    fn clear(&mut self) {
        self.current_suggestion.clear();
    }
}

/// A tag-edit field. Inputs start unwired; the autocomplete engine wires
/// them when the card list mounts them.
#[derive(Debug, Clone, Default)]
pub struct TagInput {
    pub value: String,
    autocomplete: Option<AutocompleteState>,
}

impl TagInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            autocomplete: None,
        }
    }

    pub fn is_wired(&self) -> bool {
        self.autocomplete.is_some()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.autocomplete
            .as_ref()
            .and_then(|state| state.current_suggestion())
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        if let Some(state) = self.autocomplete.as_mut() {
            state.clear();
        }
    }
}

/// Trimmed text after the last comma.
pub fn active_segment(value: &str) -> &str {
    match value.rfind(',') {
        Some(idx) => value[idx + 1..].trim(),
        None => value.trim(),
    }
}

/// `value` with its active segment replaced by `tag`. Everything up to and
/// including the last comma, plus the whitespace that led into the segment,
/// is kept verbatim.
pub fn complete_with(value: &str, tag: &str) -> String {
    let (head, segment) = match value.rfind(',') {
        Some(idx) => value.split_at(idx + 1),
        None => ("", value),
    };
    let lead_len = segment.len() - segment.trim_start().len();
    format!("{}{}{}", head, &segment[..lead_len], tag)
}

#[derive(Debug, Clone, Default)]
pub struct AutocompleteEngine {
    unique_tags: Vec<String>,
}

impl AutocompleteEngine {
    pub fn new(unique_tags: Vec<String>) -> Self {
        Self { unique_tags }
    }

    pub fn unique_tags(&self) -> &[String] {
        &self.unique_tags
    }

    pub fn set_unique_tags(&mut self, unique_tags: Vec<String>) {
        self.unique_tags = unique_tags;
    }

    /// First known tag extending the active segment, skipping a tag the
    /// segment already spells out in full.
    pub fn matching_tag(&self, value: &str) -> Option<&str> {
        let segment = active_segment(value);
        if segment.is_empty() {
            return None;
        }
        let needle = segment.to_lowercase();
        self.unique_tags
            .iter()
            .map(|tag| tag.as_str())
            .find(|tag| {
                let lower = tag.to_lowercase();
                lower.starts_with(&needle) && lower != needle
            })
    }

    pub fn suggest(&self, value: &str) -> Option<String> {
        self.matching_tag(value)
            .map(|tag| complete_with(value, tag))
    }

    pub fn mount(&self, input: &mut TagInput) {
        if input.autocomplete.is_none() {
            input.autocomplete = Some(AutocompleteState::default());
        }
    }

    /// Recomputes the suggestion from scratch after an edit.
    pub fn on_input(&self, input: &mut TagInput) {
        let suggestion = self.suggest(&input.value);
        if let Some(state) = input.autocomplete.as_mut() {
            state.current_suggestion = suggestion.unwrap_or_default();
        }
    }

    /// Handles the accept key. Returns `true` when a suggestion was taken, in
    /// which case the caller must swallow the key's default behavior.
    pub fn accept(&self, input: &mut TagInput) -> bool {
        let Some(state) = input.autocomplete.as_mut() else {
            return false;
        };
        if state.current_suggestion.is_empty() {
            return false;
        }
        input.value = std::mem::take(&mut state.current_suggestion);
        true
    }
}
