//! Chapter content: verses and headings

use crate::{FootnoteSet, Language, WordFootnote};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Indentation levels carried over from imported source documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armenian: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classical: Option<u32>,
}

/// A numbered verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    /// 1-based position among the verses of its chapter
    pub number: u32,
    pub armenian: String,
    pub english: String,
    pub classical: String,
    #[serde(default)]
    pub footnotes: FootnoteSet,
    /// Rendered as poetry (alternating indentation)
    #[serde(default, skip_serializing_if = "is_false")]
    pub poetry: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent_hints: Option<IndentHints>,
}

impl Verse {
    /// Create an empty verse with the given number
    pub fn new(number: u32) -> Self {
        Self {
            number,
            armenian: String::new(),
            english: String::new(),
            classical: String::new(),
            footnotes: FootnoteSet::empty(),
            poetry: false,
            indent_hints: None,
        }
    }

    /// Builder-style text setter
    pub fn with_text(mut self, lang: Language, value: impl Into<String>) -> Self {
        *self.text_mut(lang) = value.into();
        self
    }

    /// Text of one language track
    pub fn text(&self, lang: Language) -> &str {
        match lang {
            Language::Armenian => &self.armenian,
            Language::English => &self.english,
            Language::Classical => &self.classical,
        }
    }

    fn text_mut(&mut self, lang: Language) -> &mut String {
        match lang {
            Language::Armenian => &mut self.armenian,
            Language::English => &mut self.english,
            Language::Classical => &mut self.classical,
        }
    }

    /// The word sequence footnote anchors index into
    pub fn words(&self, lang: Language) -> Vec<&str> {
        self.text(lang).unicode_words().collect()
    }

    /// Resolve the word a footnote is anchored to, if it is in range
    pub fn anchored_word(&self, lang: Language, footnote: &WordFootnote) -> Option<&str> {
        let index = (footnote.anchor_word as usize).checked_sub(1)?;
        self.text(lang).unicode_words().nth(index)
    }
}

/// An unnumbered section heading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub armenian: String,
    pub english: String,
    pub classical: String,
}

impl Heading {
    /// Create an empty heading
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style text setter
    pub fn with_text(mut self, lang: Language, value: impl Into<String>) -> Self {
        *self.text_mut(lang) = value.into();
        self
    }

    /// Text of one language track
    pub fn text(&self, lang: Language) -> &str {
        match lang {
            Language::Armenian => &self.armenian,
            Language::English => &self.english,
            Language::Classical => &self.classical,
        }
    }

    fn text_mut(&mut self, lang: Language) -> &mut String {
        match lang {
            Language::Armenian => &mut self.armenian,
            Language::English => &mut self.english,
            Language::Classical => &mut self.classical,
        }
    }
}

/// Discriminant of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Verse,
    Heading,
}

/// One entry of a chapter's content sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
    Verse(Verse),
    Heading(Heading),
}

impl ContentItem {
    /// Classify the item
    pub fn kind(&self) -> ItemKind {
        match self {
            ContentItem::Verse(_) => ItemKind::Verse,
            ContentItem::Heading(_) => ItemKind::Heading,
        }
    }

    pub fn is_verse(&self) -> bool {
        self.kind() == ItemKind::Verse
    }

    pub fn is_heading(&self) -> bool {
        self.kind() == ItemKind::Heading
    }

    pub fn as_verse(&self) -> Option<&Verse> {
        match self {
            ContentItem::Verse(verse) => Some(verse),
            ContentItem::Heading(_) => None,
        }
    }

    pub fn as_heading(&self) -> Option<&Heading> {
        match self {
            ContentItem::Heading(heading) => Some(heading),
            ContentItem::Verse(_) => None,
        }
    }

    /// Verse number, or `None` for headings
    pub fn verse_number(&self) -> Option<u32> {
        self.as_verse().map(|verse| verse.number)
    }

    /// Text of one language track
    pub fn text(&self, lang: Language) -> &str {
        match self {
            ContentItem::Verse(verse) => verse.text(lang),
            ContentItem::Heading(heading) => heading.text(lang),
        }
    }
}

impl From<Verse> for ContentItem {
    fn from(verse: Verse) -> Self {
        ContentItem::Verse(verse)
    }
}

impl From<Heading> for ContentItem {
    fn from(heading: Heading) -> Self {
        ContentItem::Heading(heading)
    }
}

/// Reassign verse numbers `1..=M` in content order.
///
/// Headings are left untouched, and so is every verse whose number is already
/// correct: those entries keep sharing their allocation with the input.
pub fn renumber_verses(content: &[Arc<ContentItem>]) -> Vec<Arc<ContentItem>> {
    let mut next_number = 1;
    content
        .iter()
        .map(|item| match item.as_ref() {
            ContentItem::Heading(_) => Arc::clone(item),
            ContentItem::Verse(verse) => {
                let number = next_number;
                next_number += 1;
                if verse.number == number {
                    Arc::clone(item)
                } else {
                    Arc::new(ContentItem::Verse(Verse {
                        number,
                        ..verse.clone()
                    }))
                }
            }
        })
        .collect()
}

/// Whether the verses of a content sequence are numbered exactly `1..=M`
pub fn has_contiguous_verse_numbers(content: &[Arc<ContentItem>]) -> bool {
    content
        .iter()
        .filter_map(|item| item.verse_number())
        .zip(1..)
        .all(|(number, expected)| number == expected)
}
