#[derive(Debug)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }
}

pub fn validate_email_address(email: &str) -> Validity {
    if email.chars().count() > 320 {
        return Validity::Invalid(String::from("Email address is too long."));
    }

    for c in email.chars() {
        if c == ' ' || !c.is_ascii() || c.is_ascii_control() {
            return Validity::Invalid(String::from(
                "Email address cannot contain spaces, control characters or non-ASCII characters.",
            ));
        }
    }

    if email.contains("@.") {
        return Validity::Invalid(String::from(
            "Domain name in email address cannot begin with a period.",
        ));
    }

    let email = match email.split_once('@') {
        Some(s) => s,
        None => {
            return Validity::Invalid(String::from("Email address must contain an at symbol (@)."))
        }
    };

    if email.0.is_empty() || email.1.len() < 3 {
        return Validity::Invalid(String::from("Email username or domain name is to short."));
    }

    if email.1.contains('@') || !email.1.contains('.') {
        return Validity::Invalid(String::from(
            "Email address must have only one at symbol (@) and the domain must contain a period.",
        ));
    }

    if email.1.ends_with('.') {
        return Validity::Invalid(String::from("Email address cannot end with a period."));
    }

    Validity::Valid
}

pub fn validate_not_blank(value: &str, field_name: &str) -> Validity {
    if value.trim().is_empty() {
        return Validity::Invalid(format!("{field_name} cannot be empty."));
    }

    Validity::Valid
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{distributions::Alphanumeric, Rng};

    #[test]
    fn test_validate_email_address() {
        // Valid
        const NORMAL: &str = "test@example.com";
        const WITH_DOT_IN_USERNAME: &str = "test.me@example.com";
        const MULTIPLE_DOT_DOMAIN: &str = "email@example.co.jp";
        const PLUS_IN_USERNAME: &str = "firstname+lastname@example.com";
        const IP_DOMAIN: &str = "email@123.123.123.123";
        const NUMERIC_USERNAME: &str = "1234567890@example.co.uk";
        const DASH_IN_DOMAIN: &str = "email@example-one.com";

        assert!(validate_email_address(NORMAL).is_valid());
        assert!(validate_email_address(WITH_DOT_IN_USERNAME).is_valid());
        assert!(validate_email_address(MULTIPLE_DOT_DOMAIN).is_valid());
        assert!(validate_email_address(PLUS_IN_USERNAME).is_valid());
        assert!(validate_email_address(IP_DOMAIN).is_valid());
        assert!(validate_email_address(NUMERIC_USERNAME).is_valid());
        assert!(validate_email_address(DASH_IN_DOMAIN).is_valid());

        // Invalid
        let mut too_long: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(255)
            .map(char::from)
            .collect();

        too_long.push('@');
        too_long.push_str(
            "thisisareallyreallylongdomainnamethatwillmaketheaddressinvalidbecauseitisjustlong",
        );
        too_long.push_str(".com");

        const WITH_SPACE: &str = "te st@example.com";
        const NON_ASCII_CHAR: &str = "guardián@example.com";
        const HEADER_INJECTION: &str = "test@example.com\r\nBcc: other@example.com";
        const TRAILING_NEWLINE: &str = "test@example.com\n";
        const WITH_TAB: &str = "te\tst@example.com";
        const WITH_NUL: &str = "test\0@example.com";
        const MULTIPLE_AT: &str = "test@exam.com@ple.com";
        const NO_AT: &str = "testexample.com";
        const DOMAIN_DOT_ADJACENT_TO_AT: &str = "test@.com";
        const DOT_LAST_CHAR: &str = "test@example.com.";
        const EMPTY: &str = "";

        assert!(!validate_email_address(&too_long).is_valid());
        assert!(!validate_email_address(WITH_SPACE).is_valid());
        assert!(!validate_email_address(NON_ASCII_CHAR).is_valid());
        assert!(!validate_email_address(HEADER_INJECTION).is_valid());
        assert!(!validate_email_address(TRAILING_NEWLINE).is_valid());
        assert!(!validate_email_address(WITH_TAB).is_valid());
        assert!(!validate_email_address(WITH_NUL).is_valid());
        assert!(!validate_email_address(MULTIPLE_AT).is_valid());
        assert!(!validate_email_address(NO_AT).is_valid());
        assert!(!validate_email_address(DOMAIN_DOT_ADJACENT_TO_AT).is_valid());
        assert!(!validate_email_address(DOT_LAST_CHAR).is_valid());
        assert!(!validate_email_address(EMPTY).is_valid());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Andromeda", "Name").is_valid());
        assert!(!validate_not_blank("", "Name").is_valid());
        assert!(!validate_not_blank("  \t", "Name").is_valid());

        match validate_not_blank("", "Phrase") {
            Validity::Invalid(msg) => assert_eq!(msg, "Phrase cannot be empty."),
            Validity::Valid => panic!("Blank value was accepted"),
        }
    }
}
