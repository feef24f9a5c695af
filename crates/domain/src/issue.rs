use serde_json::{Map, Value};

use crate::audit::AuditRecord;

/// Literal rendered in place of empty field values.
pub const EMPTY_VALUE_PLACEHOLDER: &str = "NO_VALUE_SPECIFIED";

/// Description section a log field is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSection {
    /// Event metadata such as name, source and time.
    Event,
    /// Caller identity and origin metadata.
    Identity,
    /// Every field without an explicit classification.
    Additional,
}

impl IssueSection {
    /// Sections in rendering order.
    pub const ALL: [Self; 3] = [Self::Event, Self::Identity, Self::Additional];

    /// Returns the section heading line.
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::Event => "Event Details",
            Self::Identity => "User Details",
            Self::Additional => "Additional Details",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Event => 0,
            Self::Identity => 1,
            Self::Additional => 2,
        }
    }
}

/// How one top-level log field is placed into the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPlacement {
    /// Field is omitted from the description.
    Skip,
    /// Field renders as one line in the section.
    Line(IssueSection),
    /// Object members render as individual lines in the section.
    Expand(IssueSection),
}

const FIELD_PLACEMENTS: &[(&str, FieldPlacement)] = &[
    ("eventID", FieldPlacement::Skip),
    ("eventVersion", FieldPlacement::Skip),
    ("eventName", FieldPlacement::Line(IssueSection::Event)),
    ("errorMessage", FieldPlacement::Line(IssueSection::Event)),
    ("eventSource", FieldPlacement::Line(IssueSection::Event)),
    ("eventTime", FieldPlacement::Line(IssueSection::Event)),
    ("eventType", FieldPlacement::Line(IssueSection::Event)),
    ("eventCategory", FieldPlacement::Line(IssueSection::Event)),
    ("userIdentity", FieldPlacement::Expand(IssueSection::Identity)),
    ("sourceIPAddress", FieldPlacement::Line(IssueSection::Identity)),
    ("userAgent", FieldPlacement::Line(IssueSection::Identity)),
    ("recipientAccountId", FieldPlacement::Line(IssueSection::Identity)),
    ("awsRegion", FieldPlacement::Line(IssueSection::Identity)),
];

const DEFAULT_PLACEMENT: FieldPlacement = FieldPlacement::Line(IssueSection::Additional);

/// Returns the placement for a top-level log field name.
#[must_use]
pub fn placement_for_field(name: &str) -> FieldPlacement {
    FIELD_PLACEMENTS
        .iter()
        .find(|(field, _)| *field == name)
        .map_or(DEFAULT_PLACEMENT, |(_, placement)| *placement)
}

/// Human-readable issue content built from one audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    summary: String,
    alarm_name: String,
    event_id: String,
    sections: [Vec<String>; 3],
}

impl IssueDraft {
    /// Builds the draft for `record` raised by `alarm_name`.
    #[must_use]
    pub fn for_record(alarm_name: &str, record: &AuditRecord) -> Self {
        let mut sections: [Vec<String>; 3] = Default::default();

        for (key, value) in record.log_record() {
            match placement_for_field(key) {
                FieldPlacement::Skip => {}
                FieldPlacement::Line(section) => {
                    sections[section.index()].push(render_line(key, value));
                }
                FieldPlacement::Expand(section) => match value {
                    Value::Object(members) => {
                        sections[section.index()].extend(render_members(members));
                    }
                    other => sections[section.index()].push(render_line(key, other)),
                },
            }
        }

        Self {
            summary: format!("{alarm_name} ({})", record.event_id()),
            alarm_name: alarm_name.to_owned(),
            event_id: record.event_id().as_str().to_owned(),
            sections,
        }
    }

    /// Returns the one-line issue summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.summary.as_str()
    }

    /// Returns the rendered `key: value` lines of one section.
    #[must_use]
    pub fn lines(&self, section: IssueSection) -> &[String] {
        self.sections[section.index()].as_slice()
    }

    /// Renders the full issue description.
    #[must_use]
    pub fn description(&self) -> String {
        let mut description = format!(
            "Alarm Name: {}\nEvent ID: {}\n\n",
            self.alarm_name, self.event_id
        );

        for section in IssueSection::ALL {
            description.push_str(section.heading());
            description.push('\n');
            for line in self.lines(section) {
                description.push_str(line);
                description.push('\n');
            }
            description.push('\n');
        }

        description
    }
}

fn render_members(members: &Map<String, Value>) -> impl Iterator<Item = String> + '_ {
    members.iter().map(|(key, value)| render_line(key, value))
}

fn render_line(key: &str, value: &Value) -> String {
    format!("{key}: {}", render_value(value))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => EMPTY_VALUE_PLACEHOLDER.to_owned(),
        Value::String(text) if text.is_empty() => EMPTY_VALUE_PLACEHOLDER.to_owned(),
        Value::Array(items) if items.is_empty() => EMPTY_VALUE_PLACEHOLDER.to_owned(),
        Value::Object(members) if members.is_empty() => EMPTY_VALUE_PLACEHOLDER.to_owned(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
