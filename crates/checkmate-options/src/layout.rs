//! Which option groups are displayed, in what order, under which header.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Groups shown when a blueprint does not specify its own list.
const DEFAULT_SECTIONS: [(&str, &str); 6] = [
    ("deployment", "Deployment Options"),
    ("application", "Application Options"),
    ("server", "Server Options"),
    ("load-balancer", "Load Balancer Options"),
    ("database", "Database Options"),
    ("dns", "DNS Options"),
];

/// A displayed group and its header text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupHeader {
    /// Group name as used in `display-hints.group`.
    pub group: String,
    /// Header shown above the group.
    pub header: String,
}

impl GroupHeader {
    /// Create a group header.
    #[must_use]
    pub fn new(group: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            header: header.into(),
        }
    }

    /// Header derived from the group name: `load-balancer` -> `Load Balancer Options`.
    #[must_use]
    pub fn derived(group: impl Into<String>) -> Self {
        let group = group.into();
        let words: Vec<String> = group
            .split(&['-', '_', ' '][..])
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect();
        let header = format!("{} Options", words.join(" "));
        Self { group, header }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Ordered list of groups to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayLayout {
    sections: Vec<GroupHeader>,
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self {
            sections: DEFAULT_SECTIONS
                .iter()
                .map(|(group, header)| GroupHeader::new(*group, *header))
                .collect(),
        }
    }
}

impl DisplayLayout {
    /// Layout from a `reach-info.option-groups` list.
    ///
    /// Entries are either `"group"` (header derived from the name) or
    /// `{"group": "Header"}`; both forms may be mixed in one list.
    #[must_use]
    pub fn from_option_groups(entries: &[Value]) -> Self {
        let mut sections = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Value::String(group) => sections.push(GroupHeader::derived(group.as_str())),
                Value::Object(map) => {
                    for (group, header) in map {
                        match header.as_str() {
                            Some(header) => sections.push(GroupHeader::new(group.as_str(), header)),
                            None => sections.push(GroupHeader::derived(group.as_str())),
                        }
                    }
                }
                other => warn!(entry = %other, "ignoring malformed option-groups entry"),
            }
        }
        Self { sections }
    }

    /// Groups in display order with their headers.
    #[must_use]
    pub fn sections(&self) -> &[GroupHeader] {
        &self.sections
    }

    /// Group names in display order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.group.as_str())
    }

    /// Header for a group, if the group is displayed.
    #[must_use]
    pub fn header(&self, group: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.group == group)
            .map(|s| s.header.as_str())
    }
}
