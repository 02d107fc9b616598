//! Uniform random password generation via rejection sampling (spec §2 C9,
//! §4.8).
//!
//! The 86-character alphabet is lowercase + uppercase + digits + a fixed
//! punctuation set. Modulo-biased generation (`byte % 86` on every byte) is
//! forbidden by spec: 256 is not a multiple of 86, so naively reducing mod
//! 86 would make the low 256 % 86 = 2 characters of the alphabet slightly
//! more likely than the rest. Rejection sampling removes the bias: only
//! bytes below the largest multiple of 86 that fits in a byte (86 * 2 =
//! 172) are accepted; anything else is discarded and redrawn.

use rand::RngCore;
use rand::rngs::OsRng;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = "!@#$%^&*()-_=+[]{}<>?/\\|";

/// The full 86-character alphabet, in the fixed order the classes above are
/// concatenated in.
pub fn alphabet() -> Vec<char> {
    LOWERCASE
        .chars()
        .chain(UPPERCASE.chars())
        .chain(DIGITS.chars())
        .chain(PUNCTUATION.chars())
        .collect()
}

fn rejection_threshold(alphabet_len: usize) -> u8 {
    let max_multiple = (256 / alphabet_len) * alphabet_len;
    max_multiple as u8
}

/// Draw one uniformly-random character from `alphabet` using rejection
/// sampling against the CSPRNG.
fn sample_char<R: RngCore + ?Sized>(rng: &mut R, alphabet: &[char]) -> char {
    let threshold = rejection_threshold(alphabet.len());
    let mut byte_buf = [0u8; 1];
    loop {
        rng.fill_bytes(&mut byte_buf);
        let byte = byte_buf[0];
        if threshold != 0 && byte >= threshold {
            continue;
        }
        return alphabet[(byte as usize) % alphabet.len()];
    }
}

/// Generate a uniform-random password of `length` characters over the
/// 86-character alphabet.
pub fn generate(length: usize) -> String {
    let alphabet = alphabet();
    let mut rng = OsRng;
    (0..length).map(|_| sample_char(&mut rng, &alphabet)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn alphabet_has_86_characters() {
        assert_eq!(alphabet().len(), 86);
    }

    #[test]
    fn rejection_threshold_is_largest_fitting_multiple() {
        assert_eq!(rejection_threshold(86), 172);
    }

    #[test]
    fn generated_password_has_requested_length() {
        let password = generate(32);
        assert_eq!(password.chars().count(), 32);
    }

    #[test]
    fn every_character_is_in_alphabet() {
        let alphabet = alphabet();
        let password = generate(256);
        assert!(password.chars().all(|c| alphabet.contains(&c)));
    }

    #[test]
    fn accepted_bytes_below_threshold_map_through_modulo() {
        let alphabet = alphabet();
        let mut rng = StepRng::new(170, 1);
        // Sequence of low bytes starting at 170, incrementing by 1:
        // 170 (< 172, accepted), 171 (< 172, accepted).
        let first = sample_char(&mut rng, &alphabet);
        assert_eq!(first, alphabet[170 % 86]);
        let second = sample_char(&mut rng, &alphabet);
        assert_eq!(second, alphabet[171 % 86]);
    }

    #[test]
    fn chi_squared_does_not_reject_uniformity() {
        let alphabet = alphabet();
        let n = alphabet.len();
        let samples = 1_000_000usize;
        let mut counts = vec![0u64; n];
        let mut rng = OsRng;
        for _ in 0..samples {
            let c = sample_char(&mut rng, &alphabet);
            let idx = alphabet.iter().position(|&a| a == c).unwrap();
            counts[idx] += 1;
        }

        let expected = samples as f64 / n as f64;
        let chi_sq: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();

        // alpha = 0.001 critical value for 85 degrees of freedom is ~143.1.
        assert!(
            chi_sq < 143.1,
            "chi-squared statistic {chi_sq} rejects uniformity at alpha=0.001"
        );
    }
}
