use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Closed set of question intents the desk can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Requirements,
    Deadline,
    Fee,
    Process,
    Documents,
    Greeting,
    Unknown,
}

impl Category {
    /// Scoring order. Earlier entries win ties.
    pub const RANKED: [Category; 6] = [
        Category::Requirements,
        Category::Deadline,
        Category::Fee,
        Category::Process,
        Category::Documents,
        Category::Greeting,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Requirements => "requirements",
            Category::Deadline => "deadline",
            Category::Fee => "fee",
            Category::Process => "process",
            Category::Documents => "documents",
            Category::Greeting => "greeting",
            Category::Unknown => "unknown",
        }
    }

    /// Lowercase substrings that count as evidence for this category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Requirements => &["requirement", "eligibility", "criteria"],
            Category::Deadline => &["deadline", "last date", "timeline"],
            Category::Fee => &["fee", "cost", "payment", "charge"],
            Category::Process => &["apply", "application", "process", "online"],
            Category::Documents => &["document", "documents", "papers", "certificates"],
            Category::Greeting => &["hello", "hi", "hey"],
            Category::Unknown => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category label '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::RANKED
            .into_iter()
            .chain(std::iter::once(Category::Unknown))
            .find(|c| c.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
