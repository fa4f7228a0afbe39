//! ISBN-10 / ISBN-13 syntax and checksum validation

/// Strip hyphens and spaces, upper-case a trailing `x`.
///
/// Returns `None` if anything other than digits, separators, or a final `X` is present.
pub fn normalize(value: &str) -> Option<String> {
    let mut cleaned = String::with_capacity(13);
    for ch in value.trim().chars() {
        match ch {
            '-' | ' ' => continue,
            '0'..='9' => cleaned.push(ch),
            'x' | 'X' => cleaned.push('X'),
            _ => return None,
        }
    }
    Some(cleaned)
}

/// True when `value` is a well-formed ISBN-10 or ISBN-13 with a correct check digit
pub fn is_valid(value: &str) -> bool {
    match normalize(value) {
        Some(digits) if digits.len() == 10 => is_valid_isbn10(&digits),
        Some(digits) if digits.len() == 13 => is_valid_isbn13(&digits),
        _ => false,
    }
}

fn is_valid_isbn10(digits: &str) -> bool {
    let mut sum = 0u32;
    for (index, ch) in digits.chars().enumerate() {
        let value = match ch {
            'X' if index == 9 => 10,
            _ => match ch.to_digit(10) {
                Some(d) => d,
                None => return false,
            },
        };
        sum += value * (10 - index as u32);
    }
    sum % 11 == 0
}

fn is_valid_isbn13(digits: &str) -> bool {
    let mut sum = 0u32;
    for (index, ch) in digits.chars().enumerate() {
        let Some(d) = ch.to_digit(10) else {
            return false;
        };
        sum += if index % 2 == 0 { d } else { d * 3 };
    }
    sum % 10 == 0
}
