//! Error types for the library circulation engine
//!
//! Every public operation returns `Result<T, LibraryError>`. Variants are
//! grouped into the categories reported by [`LibraryError::kind`]:
//!
//! - **validation**: malformed member or book fields, bad CSV rows, inverted date ranges
//! - **ineligible**: a loan request rejected by one of the borrowing rules
//! - **not_found**: an unknown member, book or loan id
//! - **already_closed**: a finalize call on a loan that was already returned
//! - **constraint**: duplicate keys or deletes blocked by existing loans
//! - **storage** / **io**: failures of the SQLite store or the filesystem

use crate::types::{BookId, LoanId, MemberId};
use chrono::NaiveDate;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Reason a loan request was rejected by the eligibility rules
///
/// The variants mirror the rule order: the first failing rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IneligibleReason {
    /// The member holds at least one open loan past its due date
    #[error("member has {count} overdue loan(s) outstanding")]
    OverdueLoans {
        /// Number of overdue open loans
        count: u32,
    },

    /// The member already holds the maximum number of open loans
    #[error("member already has {active} active loans (limit {limit})")]
    LoanLimitReached {
        /// Open loans currently held
        active: u32,
        /// Maximum allowed open loans
        limit: u32,
    },

    /// The member already has an open loan of the same book
    #[error("member already has an open loan of this book")]
    AlreadyBorrowed,

    /// Every copy of the book is currently lent out
    #[error("no copies of this book are available")]
    NoCopiesAvailable,
}

/// Main error type for the circulation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LibraryError {
    /// National ID failed the check-digit validation
    #[error("Invalid national ID '{value}'")]
    InvalidNationalId {
        /// The rejected value as supplied
        value: String,
    },

    /// E-mail address does not look like `local@domain.tld`
    #[error("Invalid e-mail address '{value}'")]
    InvalidEmail {
        /// The rejected value as supplied
        value: String,
    },

    /// A required field is missing or a field has the wrong shape
    #[error("Invalid {field}: {message}")]
    InvalidField {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// A catalog CSV row could not be read or converted
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// The loan request was rejected by the eligibility rules
    #[error("Member {member} cannot borrow book {book}: {reason}")]
    IneligibleLoan {
        /// Requesting member
        member: MemberId,
        /// Requested book
        book: BookId,
        /// First rule that failed
        reason: IneligibleReason,
    },

    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity ("Member", "Book", "Loan")
        entity: String,
        /// Identifier that was looked up
        id: i64,
    },

    /// Finalize was called on a loan that is already closed
    #[error("Loan {loan} was already returned on {returned_on}")]
    AlreadyClosed {
        /// The closed loan
        loan: LoanId,
        /// Date recorded when it was returned
        returned_on: NaiveDate,
    },

    /// Write rejected by a uniqueness or integrity constraint
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// Message reported by the store
        message: String,
    },

    /// Delete rejected because loans still reference the entity
    #[error("{entity} {id} is referenced by {loans} loan(s) and cannot be deleted")]
    StillReferenced {
        /// Kind of entity ("Member", "Book")
        entity: String,
        /// Identifier of the entity
        id: i64,
        /// Number of loans pointing at it
        loans: u32,
    },

    /// The store failed; the enclosing transaction was rolled back
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the failure
        message: String,
    },

    /// I/O error while reading input or writing output
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },
}

impl From<rusqlite::Error> for LibraryError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                LibraryError::ConstraintViolation {
                    message: message.clone().unwrap_or_else(|| failure.to_string()),
                }
            }
            _ => LibraryError::Storage {
                message: error.to_string(),
            },
        }
    }
}

impl From<r2d2::Error> for LibraryError {
    fn from(error: r2d2::Error) -> Self {
        LibraryError::Storage {
            message: format!("connection pool: {}", error),
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(error: std::io::Error) -> Self {
        LibraryError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LibraryError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            return LibraryError::IoError {
                message: error.to_string(),
            };
        }

        let line = error.position().map(|pos| pos.line());

        LibraryError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LibraryError {
    /// Stable category name for the error, suitable for exit reporting
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidNationalId { .. }
            | Self::InvalidEmail { .. }
            | Self::InvalidField { .. }
            | Self::ParseError { .. } => "validation",
            Self::IneligibleLoan { .. } => "ineligible",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyClosed { .. } => "already_closed",
            Self::ConstraintViolation { .. } | Self::StillReferenced { .. } => "constraint",
            Self::Storage { .. } => "storage",
            Self::IoError { .. } => "io",
        }
    }

    /// Create an InvalidField error
    pub fn invalid_field(field: &str, message: &str) -> Self {
        LibraryError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an IneligibleLoan error
    pub fn ineligible(member: MemberId, book: BookId, reason: IneligibleReason) -> Self {
        LibraryError::IneligibleLoan {
            member,
            book,
            reason,
        }
    }

    /// Create a NotFound error
    pub fn not_found(entity: &str, id: i64) -> Self {
        LibraryError::NotFound {
            entity: entity.to_string(),
            id,
        }
    }

    /// Create a StillReferenced error
    pub fn still_referenced(entity: &str, id: i64, loans: u32) -> Self {
        LibraryError::StillReferenced {
            entity: entity.to_string(),
            id,
            loans,
        }
    }

    /// Create a Storage error
    pub fn storage(message: &str) -> Self {
        LibraryError::Storage {
            message: message.to_string(),
        }
    }
}
