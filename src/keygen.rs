//! Secret-key material
//!
//! Loan keys are 12 alphanumeric characters. Uniqueness against the
//! store is enforced by the service layer with a bounded retry loop.

use rand::Rng;

const KEY_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const KEY_LEN: usize = 12;

/// Generate one candidate secret key.
pub fn random_key() -> String {
    let mut rng = rand::thread_rng();
    (0..KEY_LEN)
        .map(|_| KEY_CHARS[rng.gen_range(0..KEY_CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_twelve_alphanumeric_chars() {
        for _ in 0..100 {
            let key = random_key();
            assert_eq!(key.len(), 12);
            assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn keys_vary() {
        let a = random_key();
        let b = random_key();
        // Collisions over a 62^12 space are effectively impossible.
        assert_ne!(a, b);
    }
}
