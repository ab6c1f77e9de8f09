//! Member-related types
//!
//! Members are identified by a national ID (CPF) that must carry valid check
//! digits. IDs are stored in their digits-only form, so `529.982.247-25` and
//! `52998224725` are the same member.

use super::error::LibraryError;
use regex::Regex;
use std::sync::LazyLock;

/// Member identifier (SQLite rowid)
pub type MemberId = i64;

/// Number of digits in a national ID
pub const NATIONAL_ID_LEN: usize = 11;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid e-mail regex")
});

/// A registered library patron
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: Option<String>,
    /// Digits-only national ID
    pub national_id: String,
}

impl Member {
    /// Check the stored national ID against its check digits
    pub fn validate_national_id(&self) -> bool {
        validate_national_id(&self.national_id)
    }

    /// Check the e-mail format; an absent e-mail is valid
    pub fn validate_email(&self) -> bool {
        validate_email(self.email.as_deref())
    }
}

/// Fields for registering a new member
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMember {
    pub name: String,
    pub email: Option<String>,
    pub national_id: String,
}

impl NewMember {
    /// Create a member registration without an e-mail address
    pub fn new(name: impl Into<String>, national_id: impl Into<String>) -> Self {
        NewMember {
            name: name.into(),
            email: None,
            national_id: national_id.into(),
        }
    }

    /// Attach an e-mail address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Validate every field and return the canonical form to persist
    ///
    /// The name is trimmed, a blank e-mail becomes `None`, and the national ID
    /// is reduced to its digits.
    ///
    /// # Errors
    ///
    /// - `InvalidField` if the name or national ID is blank
    /// - `InvalidNationalId` if the check digits do not match
    /// - `InvalidEmail` if the e-mail is present but malformed
    pub fn normalized(self) -> Result<Self, LibraryError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(LibraryError::invalid_field("name", "is required"));
        }

        if self.national_id.trim().is_empty() {
            return Err(LibraryError::invalid_field("national_id", "is required"));
        }
        if !validate_national_id(&self.national_id) {
            return Err(LibraryError::InvalidNationalId {
                value: self.national_id,
            });
        }

        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        if !validate_email(email.as_deref()) {
            return Err(LibraryError::InvalidEmail {
                value: email.unwrap_or_default(),
            });
        }

        Ok(NewMember {
            name,
            email,
            national_id: normalize_national_id(&self.national_id),
        })
    }
}

/// Partial update of a member; `None` keeps the current value
///
/// `email: Some(None)` clears the address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub national_id: Option<String>,
}

impl MemberUpdate {
    /// Merge the update over an existing member
    pub fn apply_to(self, member: &Member) -> NewMember {
        NewMember {
            name: self.name.unwrap_or_else(|| member.name.clone()),
            email: self.email.unwrap_or_else(|| member.email.clone()),
            national_id: self
                .national_id
                .unwrap_or_else(|| member.national_id.clone()),
        }
    }
}

/// Strip everything but ASCII digits
pub fn normalize_national_id(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Validate a CPF-style national ID
///
/// Non-digits are ignored. The cleaned value must have exactly 11 digits,
/// must not be one digit repeated, and both trailing check digits must match
/// the weighted-sum-mod-11 computation.
pub fn validate_national_id(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != NATIONAL_ID_LEN {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    [9usize, 10].iter().all(|&position| {
        let weighted: u32 = digits[..position]
            .iter()
            .enumerate()
            .map(|(k, &d)| d * (position as u32 + 1 - k as u32))
            .sum();
        let check = match (weighted * 10) % 11 {
            10 => 0,
            rest => rest,
        };
        check == digits[position]
    })
}

/// Validate an optional e-mail address
pub fn validate_email(email: Option<&str>) -> bool {
    email.is_none_or(|e| EMAIL_PATTERN.is_match(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Build a valid ID by appending the two computed check digits
    fn with_check_digits(base: &str) -> String {
        let mut digits: Vec<u32> = base.chars().filter_map(|c| c.to_digit(10)).collect();
        for position in [9usize, 10] {
            let weighted: u32 = digits
                .iter()
                .enumerate()
                .map(|(k, &d)| d * (position as u32 + 1 - k as u32))
                .sum();
            digits.push(((weighted * 10) % 11) % 10);
        }
        digits.iter().map(|d| d.to_string()).collect()
    }

    #[rstest]
    #[case::plain("52998224725")]
    #[case::formatted("529.982.247-25")]
    #[case::second("11144477735")]
    #[case::check_digit_zero("12345678909")]
    fn test_valid_national_ids(#[case] value: &str) {
        assert!(validate_national_id(value));
    }

    #[rstest]
    #[case::too_short("5299822472")]
    #[case::too_long("529982247250")]
    #[case::empty("")]
    #[case::wrong_first_check("52998224735")]
    #[case::wrong_second_check("52998224726")]
    #[case::letters("abcdefghijk")]
    fn test_invalid_national_ids(#[case] value: &str) {
        assert!(!validate_national_id(value));
    }

    #[rstest]
    fn test_repeated_digits_rejected(#[values(0, 1, 2, 3, 4, 5, 6, 7, 8, 9)] digit: u32) {
        let value: String = std::iter::repeat_n(char::from_digit(digit, 10).unwrap(), 11).collect();
        assert!(!validate_national_id(&value));
    }

    #[test]
    fn test_generated_ids_validate() {
        for base in ["123456789", "987654321", "000000001", "314159265", "271828182"] {
            let id = with_check_digits(base);
            assert!(validate_national_id(&id), "{} should be valid", id);
        }
    }

    #[rstest]
    fn test_single_digit_corruption_rejected(#[values("52998224725", "11144477735")] id: &str) {
        for position in 0..NATIONAL_ID_LEN {
            for replacement in '0'..='9' {
                let mut chars: Vec<char> = id.chars().collect();
                if chars[position] == replacement {
                    continue;
                }
                chars[position] = replacement;
                let corrupted: String = chars.into_iter().collect();
                assert!(
                    !validate_national_id(&corrupted),
                    "{} should be rejected",
                    corrupted
                );
            }
        }
    }

    #[rstest]
    #[case::absent(None, true)]
    #[case::simple(Some("ana@example.com"), true)]
    #[case::plus_and_dots(Some("ana.maria+lib@mail.example.org"), true)]
    #[case::no_at(Some("ana.example.com"), false)]
    #[case::short_tld(Some("ana@example.c"), false)]
    #[case::no_domain(Some("ana@.com"), false)]
    #[case::spaces(Some("ana maria@example.com"), false)]
    fn test_validate_email(#[case] email: Option<&str>, #[case] expected: bool) {
        assert_eq!(validate_email(email), expected);
    }

    #[test]
    fn test_normalized_canonicalizes_fields() {
        let member = NewMember::new("  Ana Souza ", "529.982.247-25")
            .with_email("   ")
            .normalized()
            .unwrap();

        assert_eq!(member.name, "Ana Souza");
        assert_eq!(member.national_id, "52998224725");
        assert_eq!(member.email, None);
    }

    #[rstest]
    #[case::blank_name(NewMember::new(" ", "52998224725"), "validation")]
    #[case::blank_id(NewMember::new("Ana", ""), "validation")]
    #[case::bad_id(NewMember::new("Ana", "12345678900"), "validation")]
    #[case::bad_email(NewMember::new("Ana", "52998224725").with_email("nope"), "validation")]
    fn test_normalized_rejects(#[case] member: NewMember, #[case] kind: &str) {
        assert_eq!(member.normalized().unwrap_err().kind(), kind);
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let member = Member {
            id: 1,
            name: "Ana".to_string(),
            email: Some("ana@example.com".to_string()),
            national_id: "52998224725".to_string(),
        };
        let update = MemberUpdate {
            email: Some(None),
            ..MemberUpdate::default()
        };

        let merged = update.apply_to(&member);
        assert_eq!(merged.name, "Ana");
        assert_eq!(merged.email, None);
        assert_eq!(merged.national_id, "52998224725");
    }
}
