use iocraft::prelude::*;

use crate::color::ColorDepth;
use crate::theme::ResolvedTheme;

/// Upper bound on suggestion lines shown under the prompt.
const MAX_SUGGESTIONS: usize = 8;

// ---------------------------------------------------------------------------
// Pre-rendered text input
// ---------------------------------------------------------------------------

pub struct RenderedTextInput {
    pub prompt: String,
    pub text: String,
    pub text_fg: Color,
    pub prompt_fg: Color,
    pub border_fg: Color,
    pub suggestions: Vec<RenderedSuggestion>,
}

pub struct RenderedSuggestion {
    pub text: String,
    pub is_selected: bool,
    pub fg: Color,
    pub selected_fg: Color,
}

impl RenderedTextInput {
    /// Plain prompt line, used by the search box.
    pub fn build(prompt: &str, text: &str, depth: ColorDepth, theme: &ResolvedTheme) -> Self {
        Self::build_with_suggestions(prompt, text, depth, theme, &[], None)
    }

    /// Prompt line plus a window of suggestions that keeps `selected_index`
    /// on screen. Used by the tag picker.
    pub fn build_with_suggestions(
        prompt: &str,
        text: &str,
        depth: ColorDepth,
        theme: &ResolvedTheme,
        suggestions: &[String],
        selected_index: Option<usize>,
    ) -> Self {
        let text_fg = theme.text_primary.to_crossterm_color(depth);
        let prompt_fg = theme.text_accent.to_crossterm_color(depth);
        let border_fg = theme.border_faint.to_crossterm_color(depth);
        let secondary_fg = theme.text_secondary.to_crossterm_color(depth);

        let start = selected_index
            .map_or(0, |sel| (sel + 1).saturating_sub(MAX_SUGGESTIONS));
        let rendered_suggestions = suggestions
            .iter()
            .enumerate()
            .skip(start)
            .take(MAX_SUGGESTIONS)
            .map(|(i, s)| RenderedSuggestion {
                text: s.clone(),
                is_selected: selected_index == Some(i),
                fg: secondary_fg,
                selected_fg: prompt_fg,
            })
            .collect();

        Self {
            prompt: prompt.to_owned(),
            text: format!("{text}\u{2588}"),
            text_fg,
            prompt_fg,
            border_fg,
            suggestions: rendered_suggestions,
        }
    }
}

// ---------------------------------------------------------------------------
// Autocomplete filtering helper
// ---------------------------------------------------------------------------

/// Filter a list of candidates by a query string (case-insensitive substring match).
pub(crate) fn filter_suggestions(candidates: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return candidates.to_vec();
    }
    let lower = query.to_lowercase();
    candidates
        .iter()
        .filter(|c| c.to_lowercase().contains(&lower))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// TextInput component
// ---------------------------------------------------------------------------

#[derive(Default, Props)]
pub struct TextInputProps {
    pub input: Option<RenderedTextInput>,
}

#[component]
pub fn TextInput(props: &mut TextInputProps) -> impl Into<AnyElement<'static>> {
    let Some(input) = props.input.take() else {
        return element! { View }.into_any();
    };

    let suggestion_elements: Vec<_> = input
        .suggestions
        .iter()
        .map(|s| {
            let color = if s.is_selected { s.selected_fg } else { s.fg };
            let prefix = if s.is_selected { "> " } else { "  " };
            (format!("{prefix}{}", s.text), color)
        })
        .collect();

    let has_suggestions = !suggestion_elements.is_empty();

    element! {
        View(
            flex_direction: FlexDirection::Column,
            border_style: BorderStyle::Single,
            border_edges: Edges::Top,
            border_color: input.border_fg,
            padding_left: 1,
            padding_right: 1,
        ) {
            View(flex_direction: FlexDirection::Row) {
                Text(content: input.prompt, color: input.prompt_fg, wrap: TextWrap::NoWrap)
                Text(content: " ", color: input.text_fg)
                Text(content: input.text, color: input.text_fg, wrap: TextWrap::NoWrap)
            }
            #(if has_suggestions {
                Some(element! {
                    View(flex_direction: FlexDirection::Column) {
                        #(suggestion_elements.into_iter().map(|(text, fg)| {
                            element! {
                                Text(content: text, color: fg, wrap: TextWrap::NoWrap)
                            }.into_any()
                        }))
                    }
                })
            } else {
                None
            })
        }
    }
    .into_any()
}
