//! Book catalog
//!
//! Queries and writes against the `books` table. The copy counter is only
//! moved by [`take_copy`] and [`return_copy`], which the circulation module
//! calls from inside its loan transactions.

use crate::types::{Book, BookId, LibraryError, NewBook};
use rusqlite::{params, Connection, OptionalExtension, Row};

const BOOK_COLUMNS: &str = "id, title, author, year, copies_available";

/// Map a `books` row to a Book by column name
pub fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        year: row.get("year")?,
        copies_available: row.get("copies_available")?,
    })
}

/// Insert a validated book and return its id
///
/// # Errors
///
/// - `InvalidField` if title or author is blank
/// - `ConstraintViolation` if the title/author pair already exists
pub fn insert(conn: &Connection, book: NewBook) -> Result<BookId, LibraryError> {
    let book = book.normalized()?;

    conn.execute(
        "INSERT INTO books (title, author, year, copies_available) VALUES (?1, ?2, ?3, ?4)",
        params![book.title, book.author, book.year, book.copies],
    )
    .map_err(|e| duplicate_title(e, &book))?;

    Ok(conn.last_insert_rowid())
}

/// Look up a book, returning `None` if absent
pub fn find(conn: &Connection, id: BookId) -> Result<Option<Book>, LibraryError> {
    let book = conn
        .query_row(
            &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS),
            [id],
            book_from_row,
        )
        .optional()?;
    Ok(book)
}

/// Look up a book, failing with `NotFound` if absent
pub fn get(conn: &Connection, id: BookId) -> Result<Book, LibraryError> {
    find(conn, id)?.ok_or_else(|| LibraryError::not_found("Book", id))
}

/// Books ordered by title; `available_only` keeps those with a free copy
pub fn list(conn: &Connection, available_only: bool) -> Result<Vec<Book>, LibraryError> {
    let filter = if available_only {
        " WHERE copies_available > 0"
    } else {
        ""
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM books{} ORDER BY title, author, id",
        BOOK_COLUMNS, filter
    ))?;
    let books = stmt
        .query_map([], book_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}

/// Replace a book's descriptive fields; the copy counter is left alone
///
/// # Errors
///
/// - `NotFound` if the book does not exist
/// - `InvalidField` if title or author is blank
/// - `ConstraintViolation` if the new title/author pair already exists
pub fn update(conn: &Connection, id: BookId, book: NewBook) -> Result<Book, LibraryError> {
    let book = book.normalized()?;

    let changed = conn
        .execute(
            "UPDATE books SET title = ?1, author = ?2, year = ?3 WHERE id = ?4",
            params![book.title, book.author, book.year, id],
        )
        .map_err(|e| duplicate_title(e, &book))?;
    if changed == 0 {
        return Err(LibraryError::not_found("Book", id));
    }

    get(conn, id)
}

/// Delete a book that has never been lent
///
/// # Errors
///
/// - `NotFound` if the book does not exist
/// - `StillReferenced` if any loan (open or closed) points at the book
pub fn delete(conn: &Connection, id: BookId) -> Result<(), LibraryError> {
    get(conn, id)?;

    let loans: u32 = conn.query_row(
        "SELECT COUNT(*) FROM loans WHERE book_id = ?1",
        [id],
        |row| row.get(0),
    )?;
    if loans > 0 {
        return Err(LibraryError::still_referenced("Book", id, loans));
    }

    conn.execute("DELETE FROM books WHERE id = ?1", [id])?;
    Ok(())
}

/// Take one copy off the shelf
///
/// The decrement is conditional on a copy being available, so the counter
/// can never go negative even if the caller's earlier read is stale.
/// Returns `false` when no copy was available.
pub fn take_copy(conn: &Connection, id: BookId) -> Result<bool, LibraryError> {
    let changed = conn.execute(
        "UPDATE books SET copies_available = copies_available - 1 WHERE id = ?1 AND copies_available > 0",
        [id],
    )?;
    Ok(changed == 1)
}

/// Put one copy back on the shelf
///
/// # Errors
///
/// Returns `NotFound` if the book does not exist.
pub fn return_copy(conn: &Connection, id: BookId) -> Result<(), LibraryError> {
    let changed = conn.execute(
        "UPDATE books SET copies_available = copies_available + 1 WHERE id = ?1",
        [id],
    )?;
    if changed == 0 {
        return Err(LibraryError::not_found("Book", id));
    }
    Ok(())
}

fn duplicate_title(error: rusqlite::Error, book: &NewBook) -> LibraryError {
    match LibraryError::from(error) {
        LibraryError::ConstraintViolation { .. } => LibraryError::ConstraintViolation {
            message: format!(
                "'{}' by {} is already in the catalog",
                book.title, book.author
            ),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{Store, StoreConfig};

    fn store() -> Store {
        Store::open(&StoreConfig::in_memory()).unwrap()
    }

    #[test]
    fn test_insert_defaults_to_one_copy() {
        let store = store();
        let book = store
            .write(|conn| {
                let id = insert(conn, NewBook::new("Vidas Secas", "Graciliano Ramos"))?;
                get(conn, id)
            })
            .unwrap();

        assert_eq!(book.copies_available, 1);
        assert_eq!(book.year, None);
        assert!(book.is_available());
    }

    #[test]
    fn test_duplicate_title_author_rejected() {
        let store = store();
        store
            .write(|conn| insert(conn, NewBook::new("Vidas Secas", "Graciliano Ramos")))
            .unwrap();

        let result =
            store.write(|conn| insert(conn, NewBook::new(" Vidas Secas ", "Graciliano Ramos")));
        assert!(matches!(
            result,
            Err(LibraryError::ConstraintViolation { .. })
        ));

        // Same title by a different author is a different book
        store
            .write(|conn| insert(conn, NewBook::new("Vidas Secas", "Someone Else")))
            .unwrap();
    }

    #[test]
    fn test_list_available_only() {
        let store = store();
        store
            .write(|conn| {
                insert(conn, NewBook::new("A", "X").with_copies(0))?;
                insert(conn, NewBook::new("B", "X").with_copies(2))?;
                Ok(())
            })
            .unwrap();

        let all = store.read(|conn| list(conn, false)).unwrap();
        let available = store.read(|conn| list(conn, true)).unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].title, "B");
    }

    #[test]
    fn test_take_copy_stops_at_zero() {
        let store = store();
        let id = store
            .write(|conn| insert(conn, NewBook::new("A", "X").with_copies(1)))
            .unwrap();

        assert!(store.write(|conn| take_copy(conn, id)).unwrap());
        assert!(!store.write(|conn| take_copy(conn, id)).unwrap());
        assert_eq!(store.read(|conn| get(conn, id)).unwrap().copies_available, 0);

        store.write(|conn| return_copy(conn, id)).unwrap();
        assert_eq!(store.read(|conn| get(conn, id)).unwrap().copies_available, 1);
    }

    #[test]
    fn test_update_keeps_copies() {
        let store = store();
        let id = store
            .write(|conn| insert(conn, NewBook::new("A", "X").with_copies(3)))
            .unwrap();

        let updated = store
            .write(|conn| update(conn, id, NewBook::new("A (2nd ed.)", "X").with_year(2001)))
            .unwrap();

        assert_eq!(updated.title, "A (2nd ed.)");
        assert_eq!(updated.year, Some(2001));
        assert_eq!(updated.copies_available, 3);
    }

    #[test]
    fn test_delete_unknown_book() {
        let store = store();
        let result = store.write(|conn| delete(conn, 404));
        assert_eq!(result.unwrap_err(), LibraryError::not_found("Book", 404));
    }
}
