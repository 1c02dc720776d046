//! Input validation helpers shared by DTOs and handlers.

use validator::ValidateEmail;

/// Returns `true` if the string is a plausible email address.
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.validate_email()
}

/// Returns `true` if the string contains exactly ten digits once
/// punctuation and whitespace are stripped.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    digits == 10
}
