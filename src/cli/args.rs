use crate::core::store::{StoreConfig, DEFAULT_DATABASE, DEFAULT_POOL_SIZE};
use crate::types::{BookId, BookUpdate, LoanId, MemberId, MemberUpdate};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Log filter applied when neither `--log-level` nor `RUST_LOG` is given
pub const DEFAULT_LOG_FILTER: &str = "library_circulation=info";

/// Manage library members, books and loans
#[derive(Parser, Debug)]
#[command(name = "library")]
#[command(about = "Manage library members, books and loans", long_about = None)]
pub struct CliArgs {
    /// SQLite database file
    #[arg(
        long = "database",
        value_name = "PATH",
        env = "LIBRARY_DATABASE",
        default_value = DEFAULT_DATABASE,
        global = true,
        help = "Path to the SQLite database file"
    )]
    pub database: PathBuf,

    /// Maximum number of pooled connections
    #[arg(
        long = "pool-size",
        value_name = "N",
        default_value_t = DEFAULT_POOL_SIZE,
        global = true,
        help = "Maximum number of pooled database connections (default: 4)"
    )]
    pub pool_size: u32,

    /// Log filter used when RUST_LOG is unset
    #[arg(
        long = "log-level",
        value_name = "FILTER",
        default_value = DEFAULT_LOG_FILTER,
        global = true,
        help = "Log level or filter directive, e.g. 'info' or 'library_circulation=debug'"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register, inspect and maintain members
    #[command(subcommand)]
    Member(MemberCommand),
    /// Maintain the book catalog
    #[command(subcommand)]
    Book(BookCommand),
    /// Lend and return books
    #[command(subcommand)]
    Loan(LoanCommand),
    /// Circulation reports
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    /// Register a new member
    Add {
        name: String,
        #[arg(value_name = "NATIONAL_ID")]
        national_id: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// List all members
    List,
    /// Show one member
    Show { id: MemberId },
    /// Change a member's details
    Update {
        id: MemberId,
        #[command(flatten)]
        changes: MemberChanges,
    },
    /// Remove a member with no loan history
    Delete { id: MemberId },
}

#[derive(Args, Debug, Default)]
pub struct MemberChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "clear_email")]
    pub email: Option<String>,
    /// Remove the stored e-mail address
    #[arg(long)]
    pub clear_email: bool,
    #[arg(long = "national-id")]
    pub national_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum BookCommand {
    /// Add a book to the catalog
    Add {
        title: String,
        author: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value_t = crate::types::book::DEFAULT_COPIES)]
        copies: u32,
    },
    /// List the catalog
    List {
        /// Only books with at least one copy on the shelf
        #[arg(long)]
        available: bool,
    },
    /// Show one book
    Show { id: BookId },
    /// Change a book's details
    Update {
        id: BookId,
        #[command(flatten)]
        changes: BookChanges,
    },
    /// Remove a book with no loan history
    Delete { id: BookId },
    /// Import books from a CSV file (title,author,year,copies)
    Import {
        #[arg(value_name = "CSV")]
        file: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct BookChanges {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long, conflicts_with = "clear_year")]
    pub year: Option<i32>,
    /// Remove the stored publication year
    #[arg(long)]
    pub clear_year: bool,
}

#[derive(Subcommand, Debug)]
pub enum LoanCommand {
    /// Lend a book to a member for 14 days
    Create { member: MemberId, book: BookId },
    /// Record the return of a loan
    Return { loan: LoanId },
    /// Show one loan
    Show { loan: LoanId },
    /// List open loans, soonest due first
    Active {
        #[arg(long)]
        member: Option<MemberId>,
    },
    /// Check whether a member may borrow a book
    Check { member: MemberId, book: BookId },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Books a member currently holds
    OnLoan { member: MemberId },
    /// Members holding overdue loans
    Overdue,
    /// Loans made between two dates, inclusive
    Period { start: NaiveDate, end: NaiveDate },
    /// Average number of loans per month with activity
    MonthlyAverage,
}

impl CliArgs {
    /// Build the store configuration from the global options
    ///
    /// A pool size of zero falls back to the default with a warning.
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig::new(self.database.clone(), self.pool_size)
    }
}

impl MemberChanges {
    pub fn into_update(self) -> MemberUpdate {
        let email = if self.clear_email {
            Some(None)
        } else {
            self.email.map(Some)
        };

        MemberUpdate {
            name: self.name,
            email,
            national_id: self.national_id,
        }
    }
}

impl BookChanges {
    pub fn into_update(self) -> BookUpdate {
        let year = if self.clear_year {
            Some(None)
        } else {
            self.year.map(Some)
        };

        BookUpdate {
            title: self.title,
            author: self.author,
            year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[rstest]
    #[case::defaults(&["library", "member", "list"], "library.db", 4)]
    #[case::database(&["library", "--database", "x.db", "member", "list"], "x.db", 4)]
    #[case::global_after_subcommand(&["library", "member", "list", "--pool-size", "8"], "library.db", 8)]
    fn test_global_options(
        #[case] args: &[&str],
        #[case] database: &str,
        #[case] pool_size: u32,
    ) {
        let parsed = parse(args);
        assert_eq!(parsed.database, PathBuf::from(database));
        assert_eq!(parsed.pool_size, pool_size);
    }

    #[rstest]
    #[case::default(&["library", "member", "list"], "library_circulation=info")]
    #[case::level(&["library", "--log-level", "debug", "member", "list"], "debug")]
    #[case::directive(&["library", "book", "list", "--log-level", "library_circulation=warn"], "library_circulation=warn")]
    fn test_log_level(#[case] args: &[&str], #[case] expected: &str) {
        assert_eq!(parse(args).log_level, expected);
    }

    #[rstest]
    #[case::zero_falls_back(&["library", "--pool-size", "0", "member", "list"], DEFAULT_POOL_SIZE)]
    #[case::custom(&["library", "--pool-size", "2", "member", "list"], 2)]
    fn test_store_config_conversion(#[case] args: &[&str], #[case] expected: u32) {
        let config = parse(args).to_store_config();
        assert_eq!(config.pool_size, expected);
    }

    #[test]
    fn test_member_add() {
        let parsed = parse(&[
            "library",
            "member",
            "add",
            "Ana Souza",
            "529.982.247-25",
            "--email",
            "ana@example.com",
        ]);

        match parsed.command {
            Command::Member(MemberCommand::Add {
                name,
                national_id,
                email,
            }) => {
                assert_eq!(name, "Ana Souza");
                assert_eq!(national_id, "529.982.247-25");
                assert_eq!(email.as_deref(), Some("ana@example.com"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[rstest]
    #[case::keep(&[], None)]
    #[case::set(&["--email", "b@example.com"], Some(Some("b@example.com".to_string())))]
    #[case::clear(&["--clear-email"], Some(None))]
    fn test_member_update_email(
        #[case] extra: &[&str],
        #[case] expected: Option<Option<String>>,
    ) {
        let mut args = vec!["library", "member", "update", "7"];
        args.extend_from_slice(extra);

        match parse(&args).command {
            Command::Member(MemberCommand::Update { id, changes }) => {
                assert_eq!(id, 7);
                assert_eq!(changes.into_update().email, expected);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_book_add_defaults_to_one_copy() {
        match parse(&["library", "book", "add", "Iracema", "José de Alencar"]).command {
            Command::Book(BookCommand::Add { year, copies, .. }) => {
                assert_eq!(year, None);
                assert_eq!(copies, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_report_period_parses_dates() {
        match parse(&["library", "report", "period", "2024-01-01", "2024-01-31"]).command {
            Command::Report(ReportCommand::Period { start, end }) => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[rstest]
    #[case::missing_command(&["library"])]
    #[case::bad_date(&["library", "report", "period", "2024-13-01", "2024-01-31"])]
    #[case::non_numeric_id(&["library", "loan", "return", "abc"])]
    #[case::email_and_clear(&["library", "member", "update", "1", "--email", "a@b.co", "--clear-email"])]
    #[case::negative_copies(&["library", "book", "add", "T", "A", "--copies", "-1"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
