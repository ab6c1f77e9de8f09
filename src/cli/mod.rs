// CLI module
// Command-line interface, argument parsing and command dispatch

mod args;

pub use args::{
    BookChanges, BookCommand, CliArgs, Command, LoanCommand, MemberChanges, MemberCommand,
    ReportCommand,
};

use crate::core::{Eligibility, Library};
use crate::io::{
    write_books_csv, write_loan_details_csv, write_loans_csv, write_members_csv, CatalogReader,
};
use crate::types::{LibraryError, NewBook, NewMember};
use clap::Parser;
use std::io::Write;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing subcommand, or `--help`),
/// clap prints the error or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Run one command against the library, writing its result to `output`
///
/// Listings and records are written as CSV with a header row. Deletes,
/// eligibility checks and the monthly average print a single line.
///
/// # Errors
///
/// Returns the `LibraryError` of the underlying operation, or `IoError` if
/// the output cannot be written.
pub fn execute(
    command: Command,
    library: &Library,
    output: &mut dyn Write,
) -> Result<(), LibraryError> {
    match command {
        Command::Member(command) => execute_member(command, library, output),
        Command::Book(command) => execute_book(command, library, output),
        Command::Loan(command) => execute_loan(command, library, output),
        Command::Report(command) => execute_report(command, library, output),
    }
}

fn execute_member(
    command: MemberCommand,
    library: &Library,
    output: &mut dyn Write,
) -> Result<(), LibraryError> {
    match command {
        MemberCommand::Add {
            name,
            national_id,
            email,
        } => {
            let member = library.create_member(NewMember {
                name,
                email,
                national_id,
            })?;
            write_members_csv(&[member], output)
        }
        MemberCommand::List => write_members_csv(&library.list_members()?, output),
        MemberCommand::Show { id } => write_members_csv(&[library.get_member(id)?], output),
        MemberCommand::Update { id, changes } => {
            let member = library.update_member(id, changes.into_update())?;
            write_members_csv(&[member], output)
        }
        MemberCommand::Delete { id } => {
            library.delete_member(id)?;
            writeln!(output, "deleted member {}", id)?;
            Ok(())
        }
    }
}

fn execute_book(
    command: BookCommand,
    library: &Library,
    output: &mut dyn Write,
) -> Result<(), LibraryError> {
    match command {
        BookCommand::Add {
            title,
            author,
            year,
            copies,
        } => {
            let book = library.create_book(NewBook {
                title,
                author,
                year,
                copies,
            })?;
            write_books_csv(&[book], output)
        }
        BookCommand::List { available } => write_books_csv(&library.list_books(available)?, output),
        BookCommand::Show { id } => write_books_csv(&[library.get_book(id)?], output),
        BookCommand::Update { id, changes } => {
            let book = library.update_book(id, changes.into_update())?;
            write_books_csv(&[book], output)
        }
        BookCommand::Delete { id } => {
            library.delete_book(id)?;
            writeln!(output, "deleted book {}", id)?;
            Ok(())
        }
        BookCommand::Import { file } => {
            let summary = library.import_books(CatalogReader::open(&file)?);
            writeln!(output, "imported,rejected")?;
            writeln!(output, "{},{}", summary.imported, summary.rejected)?;
            Ok(())
        }
    }
}

fn execute_loan(
    command: LoanCommand,
    library: &Library,
    output: &mut dyn Write,
) -> Result<(), LibraryError> {
    let today = library.today();

    match command {
        LoanCommand::Create { member, book } => {
            let loan_id = library.create_loan(member, book)?;
            write_loans_csv(&[library.get_loan(loan_id)?], today, output)
        }
        LoanCommand::Return { loan } => {
            write_loans_csv(&[library.finalize_loan(loan)?], today, output)
        }
        LoanCommand::Show { loan } => write_loans_csv(&[library.get_loan(loan)?], today, output),
        LoanCommand::Active { member } => {
            write_loan_details_csv(&library.active_loan_details(member)?, output)
        }
        LoanCommand::Check { member, book } => {
            match library.check_eligibility(member, book)? {
                Eligibility::Eligible => writeln!(output, "eligible")?,
                Eligibility::Ineligible(reason) => writeln!(output, "ineligible: {}", reason)?,
            }
            Ok(())
        }
    }
}

fn execute_report(
    command: ReportCommand,
    library: &Library,
    output: &mut dyn Write,
) -> Result<(), LibraryError> {
    match command {
        ReportCommand::OnLoan { member } => {
            write_books_csv(&library.books_on_loan_by_member(member)?, output)
        }
        ReportCommand::Overdue => write_members_csv(&library.overdue_members()?, output),
        ReportCommand::Period { start, end } => {
            write_loan_details_csv(&library.loans_in_period(start, end)?, output)
        }
        ReportCommand::MonthlyAverage => {
            writeln!(output, "{:.2}", library.average_loans_per_month()?)?;
            Ok(())
        }
    }
}
