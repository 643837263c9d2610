use crate::errors::CoreError;

const COUNTRY_CODE: &str = "254";
/// Country code plus nine subscriber digits.
const NORMALIZED_LEN: usize = 12;

/// Normalizes a Kenyan mobile number to `254XXXXXXXXX`.
pub fn normalize_phone(raw: &str) -> Result<String, CoreError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let normalized = if let Some(rest) = digits.strip_prefix('0') {
        format!("{COUNTRY_CODE}{rest}")
    } else if digits.starts_with(COUNTRY_CODE) {
        digits
    } else {
        format!("{COUNTRY_CODE}{digits}")
    };

    if normalized.len() != NORMALIZED_LEN {
        return Err(CoreError::InvalidPhoneNumber(raw.to_string()));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_replaced() {
        assert_eq!(normalize_phone("0712345678").unwrap(), "254712345678");
    }

    #[test]
    fn test_bare_subscriber_number_prefixed() {
        assert_eq!(normalize_phone("712345678").unwrap(), "254712345678");
    }

    #[test]
    fn test_already_normalized_is_idempotent() {
        assert_eq!(normalize_phone("254712345678").unwrap(), "254712345678");
        let once = normalize_phone("0712345678").unwrap();
        assert_eq!(normalize_phone(&once).unwrap(), once);
    }

    #[test]
    fn test_strips_formatting() {
        assert_eq!(normalize_phone("+254 712-345-678").unwrap(), "254712345678");
        assert_eq!(normalize_phone("(0712) 345 678").unwrap(), "254712345678");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            normalize_phone("abc"),
            Err(CoreError::InvalidPhoneNumber(_))
        ));
        assert!(normalize_phone("").is_err());
        assert!(normalize_phone("07123").is_err());
        assert!(normalize_phone("25471234567890").is_err());
    }
}
