use iocraft::prelude::*;

use crate::color::ColorDepth;
use crate::config::types::AppConfig;
use crate::engine::EngineHandle;
use crate::theme::ResolvedTheme;
use crate::views::workflows::WorkflowsView;

// ---------------------------------------------------------------------------
// Root App component
// ---------------------------------------------------------------------------

#[derive(Default, Props)]
pub struct AppProps<'a> {
    pub config: Option<&'a AppConfig>,
    pub engine: Option<&'a EngineHandle>,
    pub theme: Option<&'a ResolvedTheme>,
    pub color_depth: ColorDepth,
    /// Group scope to open first; overrides `[defaults] group`.
    pub initial_group: Option<String>,
}

#[component]
pub fn App<'a>(props: &AppProps<'a>, mut hooks: Hooks) -> impl Into<AnyElement<'a>> {
    let (width, height) = hooks.use_terminal_size();
    let mut system = hooks.use_context_mut::<SystemContext>();
    let should_exit = hooks.use_state(|| false);

    if should_exit.get() {
        system.exit();
    }

    let config = props.config;
    let show_separator = config.is_none_or(|c| c.theme.ui.table.show_separator);
    let initial_group = props
        .initial_group
        .clone()
        .or_else(|| config.map(|c| c.defaults.group.clone()))
        .unwrap_or_default();
    let initial_sort = config.and_then(|c| c.defaults.initial_sort());
    let lookup_policy = config.map(|c| c.defaults.lookup_policy).unwrap_or_default();

    element! {
        View(width: u32::from(width), height: u32::from(height), flex_direction: FlexDirection::Column) {
            WorkflowsView(
                engine: props.engine,
                theme: props.theme,
                layout: config.map(|c| &c.layout),
                color_depth: props.color_depth,
                width,
                height,
                show_separator,
                initial_group,
                initial_sort,
                lookup_policy,
                should_exit,
            )
        }
    }
}
