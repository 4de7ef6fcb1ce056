//! Autocomplete entries offered to the query editor.

use serde::{Deserialize, Serialize};

/// Type tag for keyword completions.
pub const TYPE_KEYWORD: &str = "kw";
/// Priority of reserved keywords (lower sorts first).
pub const RESERVED_PRIORITY: i32 = 100;
/// Priority of non-reserved keywords.
pub const KEYWORD_PRIORITY: i32 = 1000;

/// A single autocomplete entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Text shown in the completion list
    pub label: String,
    /// Short type tag (e.g. "kw")
    pub type_label: String,
    /// Text inserted into the editor
    pub value: String,
    /// Sort rank; lower sorts first
    pub priority: i32,
    /// Optional context (e.g. a schema name)
    pub context: Option<String>,
}

impl Completion {
    /// Create a keyword completion ranked by whether it is reserved.
    pub fn keyword(keyword: impl Into<String>, reserved: bool) -> Self {
        let keyword = keyword.into();
        Self {
            label: keyword.clone(),
            type_label: TYPE_KEYWORD.to_string(),
            value: keyword,
            priority: if reserved { RESERVED_PRIORITY } else { KEYWORD_PRIORITY },
            context: None,
        }
    }
}
