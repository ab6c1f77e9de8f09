//! Types module
//!
//! Contains the entity model shared by every layer:
//! - `member`: Member records and national-ID / e-mail validation
//! - `book`: Book records and copy availability
//! - `loan`: Loan records, due dates and overdue status
//! - `error`: Error types for the circulation engine

pub mod book;
pub mod error;
pub mod loan;
pub mod member;

pub use book::{Book, BookId, BookUpdate, NewBook};
pub use error::{IneligibleReason, LibraryError};
pub use loan::{Loan, LoanDetail, LoanId, LoanStatus, LOAN_PERIOD_DAYS};
pub use member::{Member, MemberId, MemberUpdate, NewMember};
