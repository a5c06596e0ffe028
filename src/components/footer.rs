use std::time::Instant;

use iocraft::prelude::*;

use crate::color::ColorDepth;
use crate::table::{SortDirection, ViewState};
use crate::theme::ResolvedTheme;

// ---------------------------------------------------------------------------
// Footer component: structured status bar
// ---------------------------------------------------------------------------

pub struct RenderedFooter {
    pub scope_label: String,
    pub context_text: String,
    pub filter_text: String,
    pub updated_text: String,
    pub key_hint: String,
    pub scope_fg: Color,
    pub text_fg: Color,
    pub border_fg: Color,
    pub separator_fg: Color,
}

impl RenderedFooter {
    pub fn build(
        scope_label: String,
        context_text: String,
        filter_text: String,
        updated_text: String,
        depth: ColorDepth,
        theme: &ResolvedTheme,
    ) -> Self {
        Self {
            scope_label,
            context_text,
            filter_text,
            updated_text,
            key_hint: "/ search  t tag  s/x/R run  q quit".to_owned(),
            scope_fg: theme.text_accent.to_crossterm_color(depth),
            text_fg: theme.text_secondary.to_crossterm_color(depth),
            border_fg: theme.border_faint.to_crossterm_color(depth),
            separator_fg: theme.text_faint.to_crossterm_color(depth),
        }
    }
}

/// Group scope as shown in the footer.
pub fn format_scope(group: &str) -> String {
    if group.is_empty() {
        "all workflows".to_owned()
    } else {
        format!("group: {group}")
    }
}

/// Summarise the active filters and sort, e.g. `"etl" Tags=nightly Status▼`.
pub fn format_filters(state: &ViewState) -> String {
    let mut parts = Vec::new();
    if !state.global_filter().is_empty() {
        parts.push(format!("\"{}\"", state.global_filter()));
    }
    for (id, value) in state.column_filters() {
        parts.push(format!("{id}={value}"));
    }
    if let Some(sort) = state.sort() {
        let arrow = match sort.direction {
            SortDirection::Asc => '\u{25b2}',
            SortDirection::Desc => '\u{25bc}',
        };
        parts.push(format!("{}{arrow}", sort.column_id));
    }
    parts.join(" ")
}

/// Format a last-fetch instant as a human-readable "Updated ~Xs ago" string.
pub fn format_updated_ago(last_fetch: Option<Instant>) -> String {
    let Some(t) = last_fetch else {
        return String::new();
    };
    let elapsed = t.elapsed().as_secs();
    if elapsed < 60 {
        format!("Updated ~{elapsed}s ago")
    } else if elapsed < 3600 {
        format!("Updated ~{}m ago", elapsed / 60)
    } else {
        format!("Updated ~{}h ago", elapsed / 3600)
    }
}

#[derive(Default, Props)]
pub struct FooterProps {
    pub footer: Option<RenderedFooter>,
}

#[component]
pub fn Footer(props: &mut FooterProps) -> impl Into<AnyElement<'static>> {
    let Some(f) = props.footer.take() else {
        return element! { View }.into_any();
    };

    let mut context_contents = Vec::new();
    for part in [&f.context_text, &f.filter_text, &f.updated_text] {
        if part.is_empty() {
            continue;
        }
        if !context_contents.is_empty() {
            context_contents.push(MixedTextContent::new("  \u{2022}  ").color(f.separator_fg));
        }
        context_contents.push(MixedTextContent::new(part).color(f.text_fg));
    }

    element! {
        View(
            border_style: BorderStyle::Single,
            border_edges: Edges::Top,
            border_color: f.border_fg,
            padding_left: 1,
            padding_right: 1,
        ) {
            Text(content: f.scope_label.clone(), color: f.scope_fg, weight: Weight::Bold, wrap: TextWrap::NoWrap)
            Text(content: " \u{2502} ", color: f.separator_fg, wrap: TextWrap::NoWrap)
            View(flex_grow: 1.0) {
                MixedText(contents: context_contents, wrap: TextWrap::NoWrap)
            }
            Text(content: " \u{2502} ", color: f.separator_fg, wrap: TextWrap::NoWrap)
            Text(content: f.key_hint.clone(), color: f.text_fg, wrap: TextWrap::NoWrap)
        }
    }
    .into_any()
}
