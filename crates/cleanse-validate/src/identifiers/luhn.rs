//! Luhn (mod-10) checksum.

/// True when `digits` is all ASCII digits and passes the Luhn check.
///
/// From the rightmost digit, every second digit is doubled (minus 9 when
/// above 9); the sum must be a multiple of 10.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(idx, b)| {
            let digit = u32::from(b - b'0');
            if idx % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

/// Plain digit sum, used by the La Poste SIRET rule.
pub fn digit_sum(digits: &str) -> u32 {
    digits
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| u32::from(b - b'0'))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_identifiers() {
        assert!(luhn_valid("513703389"));
        assert!(luhn_valid("51370338900017"));
        assert!(!luhn_valid("051370338"));
        assert!(!luhn_valid("51370338A"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn digit_sum_ignores_separators() {
        assert_eq!(digit_sum("356 000 000"), 14);
    }
}
