use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Email,
    Phone,
    GovernmentId,
}

impl PiiCategory {
    pub const ALL: [PiiCategory; 3] = [
        PiiCategory::Email,
        PiiCategory::Phone,
        PiiCategory::GovernmentId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PiiCategory::Email => "email",
            PiiCategory::Phone => "phone",
            PiiCategory::GovernmentId => "government_id",
        }
    }

    fn pattern(self) -> &'static LazyLock<Option<Regex>> {
        match self {
            PiiCategory::Email => &RE_EMAIL,
            PiiCategory::Phone => &RE_PHONE,
            PiiCategory::GovernmentId => &RE_US_SSN,
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static RE_EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b[\w.-]+@[\w.-]+\.\w{2,4}\b").ok());

static RE_PHONE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-.\s]??\d{3}[-.\s]??\d{4}\b").ok());

static RE_US_SSN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").ok());

pub type PiiMatches = BTreeMap<PiiCategory, Vec<String>>;

/// Categories with no match are left out of the map.
pub fn detect(text: &str) -> PiiMatches {
    let mut found = PiiMatches::new();
    if text.is_empty() {
        return found;
    }

    for category in PiiCategory::ALL {
        let Some(regex) = category.pattern().as_ref() else {
            continue;
        };
        let matches: Vec<String> = regex
            .find_iter(text)
            .map(|hit| hit.as_str().to_string())
            .collect();
        if !matches.is_empty() {
            found.insert(category, matches);
        }
    }

    found
}

/// One line per category: `"email: a@b.com, c@d.org"`.
pub fn describe(matches: &PiiMatches) -> Vec<String> {
    matches
        .iter()
        .map(|(category, values)| format!("{category}: {}", values.join(", ")))
        .collect()
}
