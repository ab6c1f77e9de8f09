//! Core business logic module
//!
//! This module contains the circulation components:
//! - `traits` - The `Clock` seam used for every "today" comparison
//! - `store` - SQLite pool and per-operation transaction scopes
//! - `members` / `catalog` - Member and book records
//! - `eligibility` - Borrowing rules
//! - `circulation` - Loan creation and completion
//! - `reports` - Read-only derived views
//! - `library` - Facade tying the above together for callers
//! - `async` - The same facade for async callers

pub mod r#async;
pub mod catalog;
pub mod circulation;
pub mod eligibility;
pub mod library;
pub mod members;
pub mod reports;
pub mod store;
pub mod traits;

pub use eligibility::{Eligibility, MAX_ACTIVE_LOANS};
pub use library::{ImportSummary, Library};
pub use r#async::AsyncLibrary;
pub use store::{Store, StoreConfig};
pub use traits::{Clock, FixedClock, SystemClock};
