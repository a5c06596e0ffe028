use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::color::Color;
use crate::table::{LookupPolicy, SortDirection, SortSpec};

// ---------------------------------------------------------------------------
// Custom Color deserialization
// ---------------------------------------------------------------------------

/// Deserialize an `Option<Color>` from a TOML string value.
pub(crate) mod color_de {
    use serde::{self, Deserialize, Deserializer};

    use crate::color::Color;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| Color::parse(&s, "<theme>"))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub layout: LayoutConfig,
    pub theme: Theme,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Snapshot file used when none is given on the command line.
    pub snapshot: Option<PathBuf>,
    /// Group scope to open with (empty = root).
    pub group: String,
    pub lookup_policy: LookupPolicy,
    /// Column id to sort by on startup.
    pub sort: Option<String>,
    pub sort_direction: SortDirection,
}

impl Defaults {
    pub fn initial_sort(&self) -> Option<SortSpec> {
        self.sort.as_ref().map(|column_id| SortSpec {
            column_id: column_id.clone(),
            direction: self.sort_direction,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Column ids not to display.
    pub hidden: Vec<String>,
    /// Fixed widths by column id.
    pub widths: HashMap<String, u16>,
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub ui: UiTheme,
    pub colors: ColorsTheme,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiTheme {
    pub table: TableTheme,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableTheme {
    pub show_separator: bool,
}

impl Default for TableTheme {
    fn default() -> Self {
        Self {
            show_separator: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColorsTheme {
    pub text: TextColors,
    pub background: BgColors,
    pub border: BorderColors,
    pub status: StatusColors,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub primary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub secondary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub faint: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub accent: Option<Color>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BgColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub selected: Option<Color>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BorderColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub primary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub faint: Option<Color>,
}

/// Status chip colors, one per run status.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub none: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub running: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub error: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub cancelled: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub success: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub skipped: Option<Color>,
}
