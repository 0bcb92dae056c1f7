use regex::Regex;

pub fn is_valid_email(email: &str) -> bool {
    let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();

    email_regex.is_match(email) && email.len() <= 254
}

/// 10-15 digits with an optional leading `+`.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone_regex = Regex::new(r"^\+?[0-9]{10,15}$").unwrap();

    phone_regex.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails() {
        assert!(is_valid_email("patient@example.com"));
        assert!(is_valid_email("dr.sharma+clinic@amrutam.co.in"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn accepts_indian_phone_numbers() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+919876543210"));
    }

    #[test]
    fn rejects_short_or_alpha_phone_numbers() {
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("98765abcde"));
        assert!(!is_valid_phone("+"));
    }
}
