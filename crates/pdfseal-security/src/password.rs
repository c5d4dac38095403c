// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-document password generation.
//
// Every password carries at least one uppercase letter, one lowercase letter,
// one digit and one symbol; the remaining characters are drawn uniformly from
// the union of the four classes and the result is shuffled. All randomness,
// including the shuffle, comes from the operating system CSPRNG.

use pdfseal_core::config::MIN_PASSWORD_LENGTH;
use pdfseal_core::error::{Result, SealError};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};

pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &[u8] = b"0123456789";
/// Symbols allowed in generated passwords. Contains neither `"` nor `\`, so
/// a password can be written between double quotes in the log unescaped.
pub const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:',.<>?/`~";

/// Generates fixed-length passwords from the four character classes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordGenerator {
    length: usize,
}

impl PasswordGenerator {
    pub const DEFAULT_LENGTH: usize = 24;

    /// Create a generator for passwords of `length` characters.
    ///
    /// Fails for lengths below 4, where class coverage cannot be guaranteed.
    pub fn new(length: usize) -> Result<Self> {
        if length < MIN_PASSWORD_LENGTH {
            return Err(SealError::InvalidPasswordLength(length));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a password using the OS random source.
    pub fn generate(&self) -> String {
        self.generate_with(&mut OsRng)
    }

    /// Generate a password from a caller-supplied cryptographic RNG.
    pub fn generate_with<R: Rng + CryptoRng>(&self, rng: &mut R) -> String {
        let mut chars: Vec<u8> = Vec::with_capacity(self.length);
        for class in [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS] {
            chars.push(pick(class, rng));
        }

        let union = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS].concat();
        while chars.len() < self.length {
            chars.push(pick(&union, rng));
        }

        chars.shuffle(rng);
        // Every class is ASCII.
        chars.into_iter().map(char::from).collect()
    }
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
        }
    }
}

fn pick<R: Rng + ?Sized>(set: &[u8], rng: &mut R) -> u8 {
    set[rng.gen_range(0..set.len())]
}

/// Whether `password` contains one character of every class.
pub fn covers_all_classes(password: &str) -> bool {
    let has = |set: &[u8]| password.bytes().any(|b| set.contains(&b));
    has(UPPERCASE) && has(LOWERCASE) && has(DIGITS) && has(SYMBOLS)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_length_is_24() {
        let password = PasswordGenerator::default().generate();
        assert_eq!(password.len(), 24);
    }

    #[test]
    fn every_class_present() {
        for length in [4, 5, 8, 24, 64] {
            let generator = PasswordGenerator::new(length).unwrap();
            for _ in 0..200 {
                let password = generator.generate();
                assert_eq!(password.chars().count(), length);
                assert!(covers_all_classes(&password), "missing class in {password:?}");
            }
        }
    }

    #[test]
    fn only_allowed_characters() {
        let allowed: HashSet<u8> = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS]
            .concat()
            .into_iter()
            .collect();
        let password = PasswordGenerator::new(256).unwrap().generate();
        assert!(password.bytes().all(|b| allowed.contains(&b)));
        assert!(!password.contains('"'));
        assert!(!password.contains('\\'));
    }

    #[test]
    fn too_short_rejected() {
        for length in 0..4 {
            assert!(matches!(
                PasswordGenerator::new(length),
                Err(SealError::InvalidPasswordLength(l)) if l == length
            ));
        }
    }

    #[test]
    fn consecutive_passwords_differ() {
        let generator = PasswordGenerator::default();
        let seen: HashSet<String> = (0..100).map(|_| generator.generate()).collect();
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn minimum_length_is_one_of_each() {
        let password = PasswordGenerator::new(4).unwrap().generate();
        let bytes = password.as_bytes();
        for class in [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS] {
            assert_eq!(bytes.iter().filter(|b| class.contains(*b)).count(), 1);
        }
    }
}
