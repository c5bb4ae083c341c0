//! Binary-coded decimal helpers.
//!
//! Every calendar and alarm register of the RV-3028-C7 stores its value as two
//! BCD digits. These conversions do not validate their input: non-BCD nibbles
//! decode to whatever the arithmetic produces, and encoding a value above 99
//! yields a byte the device will not interpret sensibly. Range checks live with
//! the callers that know the legal range of each field.

/// Decodes a BCD byte (`0x00..=0x99`) into its integer value.
#[must_use]
pub const fn bcd_to_dec(value: u8) -> u8 {
    (value / 0x10) * 10 + (value % 0x10)
}

/// Encodes an integer in `0..=99` as a BCD byte.
#[must_use]
pub const fn dec_to_bcd(value: u8) -> u8 {
    (value / 10) * 0x10 + (value % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_two_digit_values() {
        for value in 0..=99u8 {
            assert_eq!(bcd_to_dec(dec_to_bcd(value)), value, "value {value}");
        }
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(dec_to_bcd(0), 0x00);
        assert_eq!(dec_to_bcd(9), 0x09);
        assert_eq!(dec_to_bcd(10), 0x10);
        assert_eq!(dec_to_bcd(59), 0x59);
        assert_eq!(dec_to_bcd(99), 0x99);

        assert_eq!(bcd_to_dec(0x23), 23);
        assert_eq!(bcd_to_dec(0x31), 31);
        assert_eq!(bcd_to_dec(0x99), 99);
    }

    #[test]
    fn test_non_bcd_nibbles_are_not_rejected() {
        // 0x1A is not BCD; the arithmetic still produces a number.
        assert_eq!(bcd_to_dec(0x1A), 20);
    }
}
