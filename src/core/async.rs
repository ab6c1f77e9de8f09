//! Async facade over the circulation engine
//!
//! SQLite calls block, so async presentation layers should not call
//! [`Library`] directly from a runtime worker. `AsyncLibrary` moves each call
//! onto tokio's blocking pool and awaits it. Semantics are identical to the
//! synchronous API: one transaction per call, same errors.
//!
//! # Architecture
//!
//! ```text
//! AsyncLibrary
//!     └── Arc<Library>  (shared by every spawned blocking task)
//!         ├── Store     (r2d2 pool, one connection per task)
//!         └── Clock
//! ```

use crate::core::eligibility::Eligibility;
use crate::core::library::Library;
use crate::types::{
    Book, BookId, LibraryError, Loan, LoanDetail, LoanId, Member, MemberId, NewBook, NewMember,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::task::spawn_blocking;

/// Cloneable async handle to a [`Library`]
#[derive(Clone)]
pub struct AsyncLibrary {
    library: Arc<Library>,
}

impl AsyncLibrary {
    pub fn new(library: Library) -> Self {
        AsyncLibrary {
            library: Arc::new(library),
        }
    }

    /// Borrow the synchronous engine
    pub fn blocking(&self) -> &Library {
        &self.library
    }

    async fn run<T, F>(&self, work: F) -> Result<T, LibraryError>
    where
        F: FnOnce(&Library) -> Result<T, LibraryError> + Send + 'static,
        T: Send + 'static,
    {
        let library = Arc::clone(&self.library);
        spawn_blocking(move || work(&library))
            .await
            .map_err(|e| LibraryError::storage(&format!("blocking task failed: {}", e)))?
    }

    pub async fn create_member(&self, member: NewMember) -> Result<Member, LibraryError> {
        self.run(move |library| library.create_member(member)).await
    }

    pub async fn create_book(&self, book: NewBook) -> Result<Book, LibraryError> {
        self.run(move |library| library.create_book(book)).await
    }

    pub async fn list_books(&self, available_only: bool) -> Result<Vec<Book>, LibraryError> {
        self.run(move |library| library.list_books(available_only))
            .await
    }

    pub async fn check_eligibility(
        &self,
        member_id: MemberId,
        book_id: BookId,
    ) -> Result<Eligibility, LibraryError> {
        self.run(move |library| library.check_eligibility(member_id, book_id))
            .await
    }

    pub async fn create_loan(
        &self,
        member_id: MemberId,
        book_id: BookId,
    ) -> Result<LoanId, LibraryError> {
        self.run(move |library| library.create_loan(member_id, book_id))
            .await
    }

    pub async fn finalize_loan(&self, loan_id: LoanId) -> Result<Loan, LibraryError> {
        self.run(move |library| library.finalize_loan(loan_id)).await
    }

    pub async fn get_loan(&self, loan_id: LoanId) -> Result<Loan, LibraryError> {
        self.run(move |library| library.get_loan(loan_id)).await
    }

    pub async fn list_active_loans(
        &self,
        member_id: Option<MemberId>,
    ) -> Result<Vec<Loan>, LibraryError> {
        self.run(move |library| library.list_active_loans(member_id))
            .await
    }

    pub async fn active_loan_details(
        &self,
        member_id: Option<MemberId>,
    ) -> Result<Vec<LoanDetail>, LibraryError> {
        self.run(move |library| library.active_loan_details(member_id))
            .await
    }

    pub async fn books_on_loan_by_member(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<Book>, LibraryError> {
        self.run(move |library| library.books_on_loan_by_member(member_id))
            .await
    }

    pub async fn overdue_members(&self) -> Result<Vec<Member>, LibraryError> {
        self.run(|library| library.overdue_members()).await
    }

    pub async fn loans_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LoanDetail>, LibraryError> {
        self.run(move |library| library.loans_in_period(start, end))
            .await
    }

    pub async fn average_loans_per_month(&self) -> Result<f64, LibraryError> {
        self.run(|library| library.average_loans_per_month()).await
    }
}
