//! Library facade
//!
//! `Library` is the surface the presentation layer talks to. Each method is
//! one self-contained unit of work: it opens a transaction on the store,
//! runs the member/catalog/circulation/report functions it needs, and
//! commits (or rolls back and returns the error).
//!
//! The facade also owns the [`Clock`], so every date the engine records or
//! compares against ("today") comes from a single place.

use crate::core::eligibility::{self, Eligibility};
use crate::core::store::{Store, StoreConfig};
use crate::core::traits::{Clock, SystemClock};
use crate::core::{catalog, circulation, members, reports};
use crate::types::{
    Book, BookId, BookUpdate, LibraryError, Loan, LoanDetail, LoanId, Member, MemberId,
    MemberUpdate, NewBook, NewMember,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a bulk catalog import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Rows written to the catalog
    pub imported: usize,
    /// Rows skipped because they were malformed or rejected by the store
    pub rejected: usize,
}

/// Circulation engine bound to a store and a clock
#[derive(Clone)]
pub struct Library {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl Library {
    /// Wrap an open store, reading dates from the system clock
    pub fn new(store: Store) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Wrap an open store with a custom clock
    pub fn with_clock(store: Store, clock: Arc<dyn Clock>) -> Self {
        Library { store, clock }
    }

    /// Open the configured database with the system clock
    pub fn open(config: &StoreConfig) -> Result<Self, LibraryError> {
        Ok(Self::new(Store::open(config)?))
    }

    /// Today's date according to the library's clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ---- members ----

    pub fn create_member(&self, member: NewMember) -> Result<Member, LibraryError> {
        let member = self.store.write(|conn| {
            let id = members::insert(conn, member)?;
            members::get(conn, id)
        })?;
        info!(member = member.id, name = %member.name, "member registered");
        Ok(member)
    }

    pub fn get_member(&self, id: MemberId) -> Result<Member, LibraryError> {
        self.store.read(|conn| members::get(conn, id))
    }

    pub fn find_member_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<Member>, LibraryError> {
        self.store
            .read(|conn| members::find_by_national_id(conn, national_id))
    }

    pub fn update_member(&self, id: MemberId, update: MemberUpdate) -> Result<Member, LibraryError> {
        self.store.write(|conn| {
            let current = members::get(conn, id)?;
            members::update(conn, id, update.apply_to(&current))
        })
    }

    /// Delete a member; refused while any loan references them
    pub fn delete_member(&self, id: MemberId) -> Result<(), LibraryError> {
        self.store.write(|conn| members::delete(conn, id))?;
        info!(member = id, "member deleted");
        Ok(())
    }

    pub fn list_members(&self) -> Result<Vec<Member>, LibraryError> {
        self.store.read(members::list)
    }

    // ---- books ----

    pub fn create_book(&self, book: NewBook) -> Result<Book, LibraryError> {
        let book = self.store.write(|conn| {
            let id = catalog::insert(conn, book)?;
            catalog::get(conn, id)
        })?;
        info!(book = book.id, title = %book.title, copies = book.copies_available, "book catalogued");
        Ok(book)
    }

    pub fn get_book(&self, id: BookId) -> Result<Book, LibraryError> {
        self.store.read(|conn| catalog::get(conn, id))
    }

    pub fn update_book(&self, id: BookId, update: BookUpdate) -> Result<Book, LibraryError> {
        self.store.write(|conn| {
            let current = catalog::get(conn, id)?;
            catalog::update(conn, id, update.apply_to(&current))
        })
    }

    /// Delete a book; refused while any loan references it
    pub fn delete_book(&self, id: BookId) -> Result<(), LibraryError> {
        self.store.write(|conn| catalog::delete(conn, id))?;
        info!(book = id, "book deleted");
        Ok(())
    }

    pub fn list_books(&self, available_only: bool) -> Result<Vec<Book>, LibraryError> {
        self.store.read(|conn| catalog::list(conn, available_only))
    }

    /// Insert catalog rows one transaction at a time
    ///
    /// Malformed rows and rows rejected by the store are logged and counted;
    /// they never stop the import.
    pub fn import_books<I>(&self, rows: I) -> ImportSummary
    where
        I: IntoIterator<Item = Result<NewBook, LibraryError>>,
    {
        let mut summary = ImportSummary::default();

        for row in rows {
            match row.and_then(|book| self.store.write(|conn| catalog::insert(conn, book))) {
                Ok(_) => summary.imported += 1,
                Err(error) => {
                    warn!(%error, "catalog row skipped");
                    summary.rejected += 1;
                }
            }
        }

        info!(
            imported = summary.imported,
            rejected = summary.rejected,
            "catalog import finished"
        );
        summary
    }

    // ---- loans ----

    /// Decide whether a member may borrow a book today
    pub fn check_eligibility(
        &self,
        member_id: MemberId,
        book_id: BookId,
    ) -> Result<Eligibility, LibraryError> {
        let today = self.today();
        self.store
            .read(|conn| eligibility::check(conn, member_id, book_id, today))
    }

    /// True iff every borrowing rule passes
    pub fn can_loan(&self, member_id: MemberId, book_id: BookId) -> Result<bool, LibraryError> {
        Ok(self.check_eligibility(member_id, book_id)?.is_eligible())
    }

    /// Lend a copy of `book_id` to `member_id`, due in 14 days
    ///
    /// The eligibility reads, the copy decrement and the loan insert share
    /// one immediate transaction.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown member or book
    /// - `IneligibleLoan` with the first failing rule
    pub fn create_loan(&self, member_id: MemberId, book_id: BookId) -> Result<LoanId, LibraryError> {
        let today = self.today();
        let result = self
            .store
            .write(|conn| circulation::open_loan(conn, member_id, book_id, today));

        match result {
            Ok(loan) => {
                info!(
                    loan = loan.id,
                    member = member_id,
                    book = book_id,
                    due = %loan.due_date,
                    "loan created"
                );
                Ok(loan.id)
            }
            Err(error) => {
                warn!(member = member_id, book = book_id, %error, "loan rejected");
                Err(error)
            }
        }
    }

    /// Record the return of a loan today and put its copy back
    ///
    /// # Errors
    ///
    /// - `NotFound` if the loan does not exist
    /// - `AlreadyClosed` if it was already returned
    pub fn finalize_loan(&self, loan_id: LoanId) -> Result<Loan, LibraryError> {
        let today = self.today();
        let loan = self
            .store
            .write(|conn| circulation::close_loan(conn, loan_id, today))?;

        info!(
            loan = loan.id,
            book = loan.book_id,
            late = loan.is_overdue(today),
            "loan finalized"
        );
        Ok(loan)
    }

    pub fn get_loan(&self, id: LoanId) -> Result<Loan, LibraryError> {
        self.store.read(|conn| circulation::get(conn, id))
    }

    /// Open loans ordered by due date, optionally for one member
    pub fn list_active_loans(&self, member_id: Option<MemberId>) -> Result<Vec<Loan>, LibraryError> {
        self.store
            .read(|conn| reports::active_loans(conn, member_id))
    }

    /// Open loans with member name and book title
    pub fn active_loan_details(
        &self,
        member_id: Option<MemberId>,
    ) -> Result<Vec<LoanDetail>, LibraryError> {
        self.store
            .read(|conn| reports::active_loan_details(conn, member_id))
    }

    // ---- reports ----

    pub fn books_on_loan_by_member(&self, member_id: MemberId) -> Result<Vec<Book>, LibraryError> {
        self.store
            .read(|conn| reports::books_on_loan_by_member(conn, member_id))
    }

    pub fn overdue_members(&self) -> Result<Vec<Member>, LibraryError> {
        let today = self.today();
        self.store
            .read(|conn| reports::overdue_members(conn, today))
    }

    pub fn loans_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LoanDetail>, LibraryError> {
        self.store
            .read(|conn| reports::loans_in_period(conn, start, end))
    }

    pub fn average_loans_per_month(&self) -> Result<f64, LibraryError> {
        self.store.read(reports::average_loans_per_month)
    }
}
