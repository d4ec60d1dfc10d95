//! Language tracks and the trilingual book name

use serde::{Deserialize, Serialize};

/// One of the three parallel language tracks carried by every text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Armenian,
    English,
    Classical,
}

impl Language {
    /// All tracks in display order
    pub const ALL: [Language; 3] = [Language::Armenian, Language::English, Language::Classical];

    /// The field name used for this track in the persisted schema
    pub fn field_name(self) -> &'static str {
        match self {
            Language::Armenian => "armenian",
            Language::English => "english",
            Language::Classical => "classical",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Display name of a book in all three tracks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookName {
    pub english: String,
    pub armenian: String,
    pub classical: String,
}

impl BookName {
    /// Use the same label for every track
    pub fn uniform(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            english: label.clone(),
            armenian: label.clone(),
            classical: label,
        }
    }

    /// Get the name in one track
    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::Armenian => &self.armenian,
            Language::English => &self.english,
            Language::Classical => &self.classical,
        }
    }
}
