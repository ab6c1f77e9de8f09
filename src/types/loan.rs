//! Loan-related types
//!
//! A loan is OPEN while `return_date` is `None` and CLOSED once it is set.
//! The only transition is OPEN -> CLOSED.

use super::book::BookId;
use super::member::MemberId;
use chrono::{Days, NaiveDate};

/// Loan identifier (SQLite rowid)
pub type LoanId = i64;

/// Length of a loan in days; `due_date = loan_date + LOAN_PERIOD_DAYS`
pub const LOAN_PERIOD_DAYS: u64 = 14;

/// Lifecycle state of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Open,
    Closed,
}

/// One copy of a book lent to one member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: LoanId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl Loan {
    pub fn status(&self) -> LoanStatus {
        match self.return_date {
            Some(_) => LoanStatus::Closed,
            None => LoanStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Whether the loan is (or was) late
    ///
    /// For a closed loan the answer is frozen at return time: it was overdue
    /// iff it came back after the due date. An open loan is overdue once
    /// `today` has passed the due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.return_date {
            Some(returned) => returned > self.due_date,
            None => today > self.due_date,
        }
    }
}

/// Due date for a loan starting on `loan_date`
pub fn due_date_for(loan_date: NaiveDate) -> NaiveDate {
    loan_date
        .checked_add_days(Days::new(LOAN_PERIOD_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// A loan joined with the names shown in listings and reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDetail {
    pub loan: Loan,
    pub member_name: String,
    pub book_title: String,
}
