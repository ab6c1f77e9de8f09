//! Library Circulation Engine
//! # Overview
//!
//! This library manages the members, book catalog and loans of a lending
//! library on top of SQLite. It enforces the borrowing rules, keeps the copy
//! counters consistent with the open loans, and answers the circulation
//! reports.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Member, Book, Loan, LibraryError)
//! - [`cli`] - CLI arguments parsing and command dispatch
//! - [`core`] - Business logic components:
//!   - [`core::store`] - Connection pool and per-operation transactions
//!   - [`core::eligibility`] - Borrowing rules
//!   - [`core::circulation`] - Loan creation and completion
//!   - [`core::reports`] - Read-only derived views
//!   - [`core::library`] - Facade used by callers
//! - [`io`] - Catalog CSV import and CSV output
//!
//! # Borrowing Rules
//!
//! A loan is granted only if, in this order:
//!
//! - **No overdue loans**: the member holds no open loan past its due date
//! - **Loan limit**: the member holds fewer than three open loans
//! - **No duplicates**: the member has no open loan of the same book
//! - **Availability**: at least one copy of the book is on the shelf
//!
//! # Loan Lifecycle
//!
//! Each loan is due 14 days after it is made. Creating a loan takes one copy
//! off the shelf; finalizing it records the return date and puts the copy
//! back. A loan can only be finalized once.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use core::{AsyncLibrary, Clock, Eligibility, Library, Store, StoreConfig};
pub use io::CatalogReader;
pub use types::{
    Book, BookId, IneligibleReason, LibraryError, Loan, LoanDetail, LoanId, Member, MemberId,
    NewBook, NewMember,
};
