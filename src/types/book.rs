//! Book-related types
//!
//! A book is a catalog entry for one title; `copies_available` counts the
//! physical copies that can currently be lent.

use super::error::LibraryError;

/// Book identifier (SQLite rowid)
pub type BookId = i64;

/// Copies registered when a book is created without an explicit count
pub const DEFAULT_COPIES: u32 = 1;

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub copies_available: u32,
}

impl Book {
    /// True iff at least one copy can be lent
    pub fn is_available(&self) -> bool {
        self.copies_available > 0
    }
}

/// Fields for registering a new book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub copies: u32,
}

impl NewBook {
    /// Create a book registration with one copy and no year
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        NewBook {
            title: title.into(),
            author: author.into(),
            year: None,
            copies: DEFAULT_COPIES,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies;
        self
    }

    /// Validate the fields and return the trimmed form to persist
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` if the title or author is blank.
    pub fn normalized(self) -> Result<Self, LibraryError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(LibraryError::invalid_field("title", "is required"));
        }
        let author = self.author.trim().to_string();
        if author.is_empty() {
            return Err(LibraryError::invalid_field("author", "is required"));
        }

        Ok(NewBook {
            title,
            author,
            ..self
        })
    }
}

/// Partial update of a book's descriptive fields
///
/// The copy counter is absent: only loan creation and loan
/// completion move it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    /// `Some(None)` clears the year
    pub year: Option<Option<i32>>,
}

impl BookUpdate {
    /// Merge the update over an existing book
    pub fn apply_to(self, book: &Book) -> NewBook {
        NewBook {
            title: self.title.unwrap_or_else(|| book.title.clone()),
            author: self.author.unwrap_or_else(|| book.author.clone()),
            year: self.year.unwrap_or(book.year),
            copies: book.copies_available,
        }
    }
}

/// Parse an optional numeric text field ("" means absent)
///
/// # Errors
///
/// Returns `InvalidField` naming `field` when the text is not a number.
pub fn parse_optional_number<T: std::str::FromStr>(
    field: &str,
    value: Option<&str>,
) -> Result<Option<T>, LibraryError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(|_| {
            LibraryError::invalid_field(field, &format!("'{}' is not a valid number", text))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(12, true)]
    fn test_is_available(#[case] copies: u32, #[case] expected: bool) {
        let book = Book {
            id: 1,
            title: "Dom Casmurro".to_string(),
            author: "Machado de Assis".to_string(),
            year: Some(1899),
            copies_available: copies,
        };
        assert_eq!(book.is_available(), expected);
    }

    #[test]
    fn test_new_book_defaults_to_one_copy() {
        let book = NewBook::new("Iracema", "José de Alencar");
        assert_eq!(book.copies, DEFAULT_COPIES);
        assert_eq!(book.year, None);
    }

    #[rstest]
    #[case::blank_title(NewBook::new("  ", "Author"), "title")]
    #[case::blank_author(NewBook::new("Title", ""), "author")]
    fn test_normalized_requires_title_and_author(#[case] book: NewBook, #[case] field: &str) {
        match book.normalized() {
            Err(LibraryError::InvalidField { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[rstest]
    #[case::absent(None, Ok(None))]
    #[case::blank(Some("  "), Ok(None))]
    #[case::number(Some(" 1954 "), Ok(Some(1954)))]
    #[case::garbage(Some("19x4"), Err("validation"))]
    fn test_parse_optional_number(
        #[case] input: Option<&str>,
        #[case] expected: Result<Option<i32>, &str>,
    ) {
        let parsed = parse_optional_number::<i32>("year", input);
        match expected {
            Ok(value) => assert_eq!(parsed.unwrap(), value),
            Err(kind) => assert_eq!(parsed.unwrap_err().kind(), kind),
        }
    }

    #[test]
    fn test_update_never_touches_copies() {
        let book = Book {
            id: 3,
            title: "Old".to_string(),
            author: "Someone".to_string(),
            year: Some(2000),
            copies_available: 4,
        };
        let merged = BookUpdate {
            title: Some("New".to_string()),
            year: Some(None),
            ..BookUpdate::default()
        }
        .apply_to(&book);

        assert_eq!(merged.title, "New");
        assert_eq!(merged.author, "Someone");
        assert_eq!(merged.year, None);
        assert_eq!(merged.copies, 4);
    }
}
