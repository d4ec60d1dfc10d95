//! Word-anchored footnotes
//!
//! Every verse carries one ordered footnote list per language. A footnote
//! points at a word of the verse text in the same language through a 1-based
//! `anchorWord` index.
//!
//! ## Tolerant loading
//!
//! Persisted books may predate the current footnote shape. Loading never fails
//! on footnote data; instead it is normalized:
//!
//! - a footnote set that is not an object becomes empty
//! - a language list that is missing or not an array becomes empty
//! - a bare string at position `i` becomes `{ id: "legacy-{i+1}", anchorWord: i+1 }`
//! - an object gets `text = ""`, `id = "fn-{i+1}"` and `anchorWord = i+1` when
//!   those fields are missing or malformed; anchors are floored and clamped to 1
//! - any other entry is dropped

use crate::Language;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A footnote attached to one word of a verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordFootnote {
    /// Identifier, unique within its list
    pub id: String,
    /// Footnote body
    pub text: String,
    /// 1-based index into the verse's word sequence for this language
    pub anchor_word: u32,
}

impl WordFootnote {
    /// Create a footnote
    pub fn new(id: impl Into<String>, text: impl Into<String>, anchor_word: u32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            anchor_word,
        }
    }
}

/// Per-language footnote lists of a verse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FootnoteSet {
    pub armenian: Vec<WordFootnote>,
    pub english: Vec<WordFootnote>,
    pub classical: Vec<WordFootnote>,
}

impl FootnoteSet {
    /// An empty set in all three languages
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the list for one language
    pub fn get(&self, lang: Language) -> &[WordFootnote] {
        match lang {
            Language::Armenian => &self.armenian,
            Language::English => &self.english,
            Language::Classical => &self.classical,
        }
    }

    /// Copy of this set with one language list replaced
    pub fn with(&self, lang: Language, footnotes: Vec<WordFootnote>) -> Self {
        let mut next = self.clone();
        match lang {
            Language::Armenian => next.armenian = footnotes,
            Language::English => next.english = footnotes,
            Language::Classical => next.classical = footnotes,
        }
        next
    }

    /// Whether no language has any footnote
    pub fn is_empty(&self) -> bool {
        Language::ALL.iter().all(|&lang| self.get(lang).is_empty())
    }

    /// Normalize a raw JSON value into a footnote set, never failing
    pub fn from_value(raw: &Value) -> Self {
        let Some(data) = raw.as_object() else {
            return Self::empty();
        };
        let list = |lang: Language| {
            data.get(lang.field_name())
                .map(normalize_word_footnotes)
                .unwrap_or_default()
        };
        Self {
            armenian: list(Language::Armenian),
            english: list(Language::English),
            classical: list(Language::Classical),
        }
    }

    /// Repair entries that violate the footnote invariants.
    ///
    /// Anchors of zero are replaced by the footnote's own 1-based position and
    /// blank ids by `fn-{position}`. Already valid sets come back unchanged.
    pub fn normalized(&self) -> Self {
        let repair = |list: &[WordFootnote]| {
            list.iter()
                .enumerate()
                .map(|(i, footnote)| {
                    let position = i as u32 + 1;
                    WordFootnote {
                        id: if footnote.id.is_empty() {
                            format!("fn-{position}")
                        } else {
                            footnote.id.clone()
                        },
                        text: footnote.text.clone(),
                        anchor_word: if footnote.anchor_word == 0 {
                            position
                        } else {
                            footnote.anchor_word
                        },
                    }
                })
                .collect()
        };
        Self {
            armenian: repair(&self.armenian),
            english: repair(&self.english),
            classical: repair(&self.classical),
        }
    }
}

impl<'de> Deserialize<'de> for FootnoteSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&raw))
    }
}

fn normalize_word_footnotes(raw: &Value) -> Vec<WordFootnote> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let position = i as u32 + 1;
        match item {
            Value::String(text) => {
                let id = format!("legacy-{position}");
                result.push(WordFootnote::new(id, text.clone(), position));
            }
            Value::Object(rec) => {
                let text = rec.get("text").and_then(Value::as_str).unwrap_or_default();
                let id = rec
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("fn-{position}"));
                let anchor = rec
                    .get("anchorWord")
                    .and_then(Value::as_f64)
                    .or_else(|| rec.get("anchor_word").and_then(Value::as_f64))
                    .map(|raw| raw.floor().clamp(1.0, u32::MAX as f64) as u32)
                    .unwrap_or(position);
                result.push(WordFootnote::new(id, text, anchor));
            }
            _ => {}
        }
    }
    result
}
