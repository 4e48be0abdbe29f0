//! Primary Account Number checks.
//!
//! Everything here is pure: no I/O, no errors. Malformed input is simply invalid.

pub const MIN_PAN_LENGTH: usize = 8;
pub const MAX_PAN_LENGTH: usize = 19;

/// Returns `true` when `pan` is 8 to 19 ASCII digits and nothing else.
///
/// No normalization is performed; spaces and dashes make the PAN invalid.
pub fn is_valid_format(pan: &str) -> bool {
    (MIN_PAN_LENGTH..=MAX_PAN_LENGTH).contains(&pan.len())
        && pan.bytes().all(|b| b.is_ascii_digit())
}

/// Luhn checksum over the digits of `pan`.
pub fn is_valid_checksum(pan: &str) -> bool {
    let mut sum = 0u32;
    for (position, byte) in pan.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let mut digit = u32::from(byte - b'0');
        if position % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

pub fn is_valid(pan: &str) -> bool {
    is_valid_format(pan) && is_valid_checksum(pan)
}

/// Hides all but the last four characters of a card number.
pub fn mask_pan(pan: &str) -> String {
    let visible = 4;
    let len = pan.chars().count();
    if len <= visible {
        return pan.to_string();
    }
    let tail: String = pan.chars().skip(len - visible).collect();
    format!("{}{}", "*".repeat(len - visible), tail)
}
