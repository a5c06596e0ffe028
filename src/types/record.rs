use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status code
// ---------------------------------------------------------------------------

/// Run status of a workflow.
///
/// The declaration order is the sort order used by the Status column.
/// `None` doubles as the sentinel for records that carry no status at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub enum StatusCode {
    #[default]
    None,
    Running,
    Error,
    Cancelled,
    Success,
    Skipped,
}

impl From<i64> for StatusCode {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::Running,
            2 => Self::Error,
            3 => Self::Cancelled,
            4 => Self::Success,
            5 => Self::Skipped,
            _ => Self::None,
        }
    }
}

impl From<StatusCode> for u8 {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::None => 0,
            StatusCode::Running => 1,
            StatusCode::Error => 2,
            StatusCode::Cancelled => 3,
            StatusCode::Success => 4,
            StatusCode::Skipped => 5,
        }
    }
}

impl StatusCode {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "not started",
            Self::Running => "running",
            Self::Error => "failed",
            Self::Cancelled => "canceled",
            Self::Success => "finished",
            Self::Skipped => "skipped",
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow and Group
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Group the workflow is listed under. Empty for top-level workflows.
    #[serde(default)]
    pub group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    #[serde(rename = "status", default)]
    pub code: StatusCode,
    #[serde(default)]
    pub status_text: String,
    /// Zero-padded `YYYY-MM-DD HH:MM:SS`; the timestamp columns sort on the raw string.
    #[serde(default)]
    pub started_at: String,
    #[serde(default)]
    pub finished_at: String,
    /// Identifier of the last run, needed to retry it.
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Definition file name, e.g. `daily-etl.yaml`.
    pub file: String,
    pub config: WorkflowConfig,
    #[serde(default)]
    pub status: Option<WorkflowStatus>,
}

impl Workflow {
    /// File name without a trailing `.yaml` / `.yml`.
    pub fn file_stem(&self) -> &str {
        self.file
            .strip_suffix(".yaml")
            .or_else(|| self.file.strip_suffix(".yml"))
            .unwrap_or(&self.file)
    }

    pub fn status_code(&self) -> StatusCode {
        self.status.as_ref().map_or(StatusCode::None, |s| s.code)
    }

    pub fn is_running(&self) -> bool {
        self.status_code() == StatusCode::Running
    }
}

// ---------------------------------------------------------------------------
// Record union
// ---------------------------------------------------------------------------

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Group(Group),
    Workflow(Workflow),
}

/// Variant tag of a [`Record`].
///
/// Derived ordering is the Type column's ordinal: workflows before groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Workflow,
    Group,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Workflow => "Workflow",
            Self::Group => "Group",
        }
    }
}

/// Status fields addressable through [`status_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    StatusText,
    StartedAt,
    FinishedAt,
    RequestId,
}

impl Record {
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(Group { name: name.into() })
    }

    pub fn as_workflow(&self) -> Option<&Workflow> {
        match self {
            Self::Workflow(w) => Some(w),
            Self::Group(_) => None,
        }
    }
}

pub fn variant_of(record: &Record) -> RecordKind {
    match record {
        Record::Group(_) => RecordKind::Group,
        Record::Workflow(_) => RecordKind::Workflow,
    }
}

/// Group name, or the workflow's configured name (file stem if unnamed).
pub fn display_name(record: &Record) -> &str {
    match record {
        Record::Group(g) => &g.name,
        Record::Workflow(w) if w.config.name.is_empty() => w.file_stem(),
        Record::Workflow(w) => &w.config.name,
    }
}

/// First tag of a workflow; empty for groups and untagged workflows.
pub fn first_tag(record: &Record) -> &str {
    match record {
        Record::Workflow(w) => w.config.tags.first().map_or("", String::as_str),
        Record::Group(_) => "",
    }
}

/// Status code, [`StatusCode::None`] when the record has no status.
pub fn status_of(record: &Record) -> StatusCode {
    match record {
        Record::Workflow(w) => w.status_code(),
        Record::Group(_) => StatusCode::None,
    }
}

/// A string status field; empty when the record has no status.
pub fn status_field(field: StatusField, record: &Record) -> &str {
    let Record::Workflow(Workflow {
        status: Some(status),
        ..
    }) = record
    else {
        return "";
    };
    match field {
        StatusField::StatusText => &status.status_text,
        StatusField::StartedAt => &status.started_at,
        StatusField::FinishedAt => &status.finished_at,
        StatusField::RequestId => &status.request_id,
    }
}

/// Strings the free-text search looks at: the group name, or a workflow's
/// displayed name, description and tags.
pub fn searchable_text(record: &Record) -> Vec<&str> {
    match record {
        Record::Group(g) => vec![g.name.as_str()],
        Record::Workflow(w) => {
            let mut out = Vec::with_capacity(2 + w.config.tags.len());
            out.push(display_name(record));
            out.push(w.config.description.as_str());
            out.extend(w.config.tags.iter().map(String::as_str));
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(name: &str, tags: &[&str], status: Option<WorkflowStatus>) -> Record {
        Record::Workflow(Workflow {
            file: format!("{name}.yaml"),
            config: WorkflowConfig {
                name: name.to_owned(),
                description: format!("{name} description"),
                tags: tags.iter().map(|t| (*t).to_owned()).collect(),
                group: String::new(),
            },
            status,
        })
    }

    #[test]
    fn first_tag_is_empty_for_groups_and_untagged() {
        assert_eq!(first_tag(&Record::group("etl")), "");
        assert_eq!(first_tag(&workflow("a", &[], None)), "");
        assert_eq!(first_tag(&workflow("a", &["prod", "daily"], None)), "prod");
    }

    #[test]
    fn status_accessors_fall_back_to_sentinel() {
        let group = Record::group("etl");
        let unrun = workflow("a", &[], None);
        assert_eq!(status_of(&group), StatusCode::None);
        assert_eq!(status_of(&unrun), StatusCode::None);
        assert_eq!(status_field(StatusField::StartedAt, &group), "");
        assert_eq!(status_field(StatusField::FinishedAt, &unrun), "");
    }

    #[test]
    fn status_field_reads_populated_status() {
        let rec = workflow(
            "a",
            &[],
            Some(WorkflowStatus {
                code: StatusCode::Success,
                status_text: "finished".to_owned(),
                started_at: "2024-01-02 03:04:05".to_owned(),
                finished_at: "2024-01-02 03:05:00".to_owned(),
                request_id: "req-1".to_owned(),
            }),
        );
        assert_eq!(status_of(&rec), StatusCode::Success);
        assert_eq!(status_field(StatusField::StartedAt, &rec), "2024-01-02 03:04:05");
        assert_eq!(status_field(StatusField::RequestId, &rec), "req-1");
    }

    #[test]
    fn status_order_puts_none_lowest() {
        assert!(StatusCode::None < StatusCode::Running);
        assert!(StatusCode::Running < StatusCode::Error);
        assert!(StatusCode::Success < StatusCode::Skipped);
    }

    #[test]
    fn unknown_status_code_maps_to_none() {
        assert_eq!(StatusCode::from(42_i64), StatusCode::None);
        assert_eq!(StatusCode::from(-1_i64), StatusCode::None);
        assert_eq!(u8::from(StatusCode::Cancelled), 3);
    }

    #[test]
    fn out_of_range_status_code_does_not_reject_the_record() {
        let json = r#"[
            {"type": "workflow", "file": "a.yaml", "config": {"name": "a"},
             "status": {"status": 300}},
            {"type": "workflow", "file": "b.yaml", "config": {"name": "b"},
             "status": {"status": -7}}
        ]"#;
        let records: Vec<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(status_of(&records[0]), StatusCode::None);
        assert_eq!(status_of(&records[1]), StatusCode::None);
    }

    #[test]
    fn display_name_falls_back_to_file_stem() {
        let rec = Record::Workflow(Workflow {
            file: "nightly.yml".to_owned(),
            config: WorkflowConfig::default(),
            status: None,
        });
        assert_eq!(display_name(&rec), "nightly");
        assert_eq!(display_name(&Record::group("etl")), "etl");
    }

    #[test]
    fn searchable_text_is_variant_aware() {
        assert_eq!(searchable_text(&Record::group("etl")), vec!["etl"]);
        let rec = workflow("daily-etl", &["prod"], None);
        assert_eq!(
            searchable_text(&rec),
            vec!["daily-etl", "daily-etl description", "prod"]
        );
        let unnamed = Record::Workflow(Workflow {
            file: "nightly.yml".to_owned(),
            config: WorkflowConfig::default(),
            status: None,
        });
        assert_eq!(searchable_text(&unnamed)[0], "nightly");
    }

    #[test]
    fn deserializes_tagged_records() {
        let json = r#"[
            {"type": "group", "name": "etl"},
            {"type": "workflow", "file": "a.yaml",
             "config": {"name": "a", "tags": ["prod"]},
             "status": {"status": 1, "status_text": "running", "started_at": "2024-01-01 00:00:00"}}
        ]"#;
        let records: Vec<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(variant_of(&records[0]), RecordKind::Group);
        assert_eq!(variant_of(&records[1]), RecordKind::Workflow);
        assert_eq!(status_of(&records[1]), StatusCode::Running);
        assert_eq!(status_field(StatusField::FinishedAt, &records[1]), "");
    }
}
