//! Short-lived numeric code generation for verification/reset flows.

use rand::Rng;

/// Generate a uniformly random six-digit code (100000..=999999).
///
/// Collisions are acceptable: codes are scoped by their record id, never
/// looked up globally.
pub fn generate_six_digit_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every generated code is exactly six ascii digits.
        #[test]
        fn always_six_digits(_seed in 0u8..255) {
            let code = generate_six_digit_code();
            prop_assert_eq!(code.len(), 6);
            prop_assert!(code.chars().all(|c| c.is_ascii_digit()));
            prop_assert_ne!(code.chars().next(), Some('0'));
        }
    }
}
