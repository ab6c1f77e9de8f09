//! Member registry
//!
//! Queries and writes against the `members` table. Every function takes the
//! connection of the caller's transaction scope, so several of them can be
//! composed inside one unit of work.

use crate::types::{LibraryError, Member, MemberId, NewMember};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MEMBER_COLUMNS: &str = "id, name, email, national_id";

/// Map a `members` row to a Member by column name
pub fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        national_id: row.get("national_id")?,
    })
}

/// Insert a validated member and return its id
///
/// # Errors
///
/// - validation errors from [`NewMember::normalized`]
/// - `ConstraintViolation` if the national ID is already registered
pub fn insert(conn: &Connection, member: NewMember) -> Result<MemberId, LibraryError> {
    let member = member.normalized()?;

    conn.execute(
        "INSERT INTO members (name, email, national_id) VALUES (?1, ?2, ?3)",
        params![member.name, member.email, member.national_id],
    )
    .map_err(|e| duplicate_national_id(e, &member.national_id))?;

    Ok(conn.last_insert_rowid())
}

/// Look up a member, returning `None` if absent
pub fn find(conn: &Connection, id: MemberId) -> Result<Option<Member>, LibraryError> {
    let member = conn
        .query_row(
            &format!("SELECT {} FROM members WHERE id = ?1", MEMBER_COLUMNS),
            [id],
            member_from_row,
        )
        .optional()?;
    Ok(member)
}

/// Look up a member, failing with `NotFound` if absent
pub fn get(conn: &Connection, id: MemberId) -> Result<Member, LibraryError> {
    find(conn, id)?.ok_or_else(|| LibraryError::not_found("Member", id))
}

/// Look up a member by national ID (any formatting)
pub fn find_by_national_id(
    conn: &Connection,
    national_id: &str,
) -> Result<Option<Member>, LibraryError> {
    let digits = crate::types::member::normalize_national_id(national_id);
    let member = conn
        .query_row(
            &format!(
                "SELECT {} FROM members WHERE national_id = ?1",
                MEMBER_COLUMNS
            ),
            [digits],
            member_from_row,
        )
        .optional()?;
    Ok(member)
}

/// All members ordered by name
pub fn list(conn: &Connection) -> Result<Vec<Member>, LibraryError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM members ORDER BY name, id",
        MEMBER_COLUMNS
    ))?;
    let members = stmt
        .query_map([], member_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

/// Replace a member's fields with a validated set
///
/// # Errors
///
/// - `NotFound` if the member does not exist
/// - validation errors from [`NewMember::normalized`]
/// - `ConstraintViolation` if the new national ID belongs to someone else
pub fn update(conn: &Connection, id: MemberId, member: NewMember) -> Result<Member, LibraryError> {
    let member = member.normalized()?;

    let changed = conn
        .execute(
            "UPDATE members SET name = ?1, email = ?2, national_id = ?3 WHERE id = ?4",
            params![member.name, member.email, member.national_id, id],
        )
        .map_err(|e| duplicate_national_id(e, &member.national_id))?;
    if changed == 0 {
        return Err(LibraryError::not_found("Member", id));
    }

    get(conn, id)
}

/// Delete a member that has never borrowed anything
///
/// # Errors
///
/// - `NotFound` if the member does not exist
/// - `StillReferenced` if any loan (open or closed) points at the member
pub fn delete(conn: &Connection, id: MemberId) -> Result<(), LibraryError> {
    get(conn, id)?;

    let loans: u32 = conn.query_row(
        "SELECT COUNT(*) FROM loans WHERE member_id = ?1",
        [id],
        |row| row.get(0),
    )?;
    if loans > 0 {
        return Err(LibraryError::still_referenced("Member", id, loans));
    }

    conn.execute("DELETE FROM members WHERE id = ?1", [id])?;
    Ok(())
}

fn duplicate_national_id(error: rusqlite::Error, national_id: &str) -> LibraryError {
    match LibraryError::from(error) {
        LibraryError::ConstraintViolation { .. } => LibraryError::ConstraintViolation {
            message: format!("national ID {} is already registered", national_id),
        },
        other => other,
    }
}
