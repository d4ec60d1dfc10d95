//! Word footnote commands
//!
//! Footnotes live per verse and per language, each anchored to a 1-based word
//! position in that language's text. All edits go through `update_footnotes`,
//! which repairs the stored set before handing the list to the edit.

use crate::content_commands::replace_item;
use book_model::{move_item, Book, Language, WordFootnote};

/// Apply `edit` to one verse's footnote list in one language.
///
/// The verse's whole footnote set is normalized first. Returns `None` when the
/// verse is absent or the normalized set comes out unchanged.
pub fn update_footnotes(
    book: &Book,
    chapter: u32,
    verse: u32,
    lang: Language,
    edit: impl FnOnce(Vec<WordFootnote>) -> Vec<WordFootnote>,
) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let (index, current) = ch.find_verse(verse)?;
        let normalized = current.footnotes.normalized();
        let footnotes = normalized.with(lang, edit(normalized.get(lang).to_vec()));
        if footnotes == current.footnotes {
            return None;
        }
        let mut updated = current.clone();
        updated.footnotes = footnotes;
        Some(replace_item(ch, index, updated.into()))
    })
}

/// Move a footnote within its list; `None` for invalid or equal indices
pub fn reorder_footnotes(
    book: &Book,
    chapter: u32,
    verse: u32,
    lang: Language,
    from: usize,
    to: usize,
) -> Option<Book> {
    if from == to {
        return None;
    }
    update_footnotes(book, chapter, verse, lang, |list| {
        move_item(&list, from, to).unwrap_or(list)
    })
}

/// Append a footnote with a fresh id. Returns the edited book and the id.
pub fn add_footnote(
    book: &Book,
    chapter: u32,
    verse: u32,
    lang: Language,
    text: &str,
    anchor_word: u32,
) -> Option<(Book, String)> {
    let id = uuid::Uuid::new_v4().to_string();
    let footnote = WordFootnote::new(id.clone(), text, anchor_word.max(1));
    let edited = update_footnotes(book, chapter, verse, lang, |mut list| {
        list.push(footnote);
        list
    })?;
    Some((edited, id))
}

/// Replace the text of the footnote with `id`
pub fn edit_footnote_text(
    book: &Book,
    chapter: u32,
    verse: u32,
    lang: Language,
    id: &str,
    text: &str,
) -> Option<Book> {
    update_footnotes(book, chapter, verse, lang, |mut list| {
        if let Some(footnote) = list.iter_mut().find(|f| f.id == id) {
            footnote.text = text.to_string();
        }
        list
    })
}

/// Anchor the footnote with `id` to another word (clamped to at least 1)
pub fn set_footnote_anchor(
    book: &Book,
    chapter: u32,
    verse: u32,
    lang: Language,
    id: &str,
    anchor_word: u32,
) -> Option<Book> {
    update_footnotes(book, chapter, verse, lang, |mut list| {
        if let Some(footnote) = list.iter_mut().find(|f| f.id == id) {
            footnote.anchor_word = anchor_word.max(1);
        }
        list
    })
}

/// Remove the footnote with `id`
pub fn remove_footnote(
    book: &Book,
    chapter: u32,
    verse: u32,
    lang: Language,
    id: &str,
) -> Option<Book> {
    update_footnotes(book, chapter, verse, lang, |mut list| {
        list.retain(|f| f.id != id);
        list
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_model::{BookId, BookName, Chapter, ContentItem, FootnoteSet, Verse};
    use std::sync::Arc;

    fn book_with_footnotes(footnotes: FootnoteSet) -> Book {
        let mut verse = Verse::new(1).with_text(Language::English, "In the beginning God created");
        verse.footnotes = footnotes;
        Book {
            id: BookId::parse("genesis").unwrap(),
            name: BookName::uniform("Genesis"),
            chapters: vec![Arc::new(Chapter::with_items(
                1,
                [ContentItem::from(verse), ContentItem::from(Verse::new(2))],
            ))],
        }
    }

    fn notes(book: &Book, lang: Language) -> Vec<WordFootnote> {
        book.chapters[0].content[0]
            .as_verse()
            .unwrap()
            .footnotes
            .get(lang)
            .to_vec()
    }

    fn english(list: Vec<WordFootnote>) -> FootnoteSet {
        FootnoteSet::empty().with(Language::English, list)
    }

    #[test]
    fn test_add_footnote() {
        let book = book_with_footnotes(FootnoteSet::empty());
        let (edited, id) = add_footnote(&book, 1, 1, Language::English, "Or: God", 4).unwrap();

        let list = notes(&edited, Language::English);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
        assert_eq!(list[0].anchor_word, 4);
        let verse = edited.chapters[0].content[0].as_verse().unwrap();
        assert_eq!(verse.anchored_word(Language::English, &list[0]), Some("God"));
        assert!(notes(&edited, Language::Armenian).is_empty());
    }

    #[test]
    fn test_add_footnote_to_missing_verse() {
        let book = book_with_footnotes(FootnoteSet::empty());
        assert!(add_footnote(&book, 1, 9, Language::English, "x", 1).is_none());
    }

    #[test]
    fn test_edit_anchor_and_remove() {
        let book = book_with_footnotes(english(vec![
            WordFootnote::new("a", "first", 1),
            WordFootnote::new("b", "second", 2),
        ]));

        let edited = edit_footnote_text(&book, 1, 1, Language::English, "b", "changed").unwrap();
        assert_eq!(notes(&edited, Language::English)[1].text, "changed");

        let edited = set_footnote_anchor(&edited, 1, 1, Language::English, "b", 0).unwrap();
        assert_eq!(notes(&edited, Language::English)[1].anchor_word, 1);
        assert!(set_footnote_anchor(&book, 1, 1, Language::English, "a", 0).is_none());

        let edited = remove_footnote(&edited, 1, 1, Language::English, "a").unwrap();
        let list = notes(&edited, Language::English);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "b");

        assert!(remove_footnote(&book, 1, 1, Language::English, "zzz").is_none());
    }

    #[test]
    fn test_reorder_footnotes() {
        let book = book_with_footnotes(english(vec![
            WordFootnote::new("a", "first", 1),
            WordFootnote::new("b", "second", 2),
            WordFootnote::new("c", "third", 3),
        ]));

        let edited = reorder_footnotes(&book, 1, 1, Language::English, 0, 2).unwrap();
        let ids: Vec<String> = notes(&edited, Language::English)
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        assert!(reorder_footnotes(&book, 1, 1, Language::English, 1, 1).is_none());
        assert!(reorder_footnotes(&book, 1, 1, Language::English, 0, 3).is_none());
    }

    #[test]
    fn test_update_normalizes_stored_set() {
        let book = book_with_footnotes(FootnoteSet::empty().with(
            Language::Classical,
            vec![WordFootnote::new("", "unanchored", 0)],
        ));

        // The identity edit on English still repairs the Classical list.
        let edited = update_footnotes(&book, 1, 1, Language::English, |list| list).unwrap();

        let repaired = notes(&edited, Language::Classical);
        assert_eq!(repaired[0].id, "fn-1");
        assert_eq!(repaired[0].anchor_word, 1);
        assert!(update_footnotes(&edited, 1, 1, Language::English, |list| list).is_none());
    }
}
