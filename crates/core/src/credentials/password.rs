//! Random initial passwords without easily confused glyphs.
//!
//! Alphabets follow https://www.grc.com/ppp.htm: `0`, `O`, `Q`, `I`, `1`
//! and `l` never appear. Randomness comes from the operating system's CSPRNG.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;

pub const UPPERCASE: &[u8] = b"ABCDEFGHJKLMNPRSTUVWXYZ";
pub const LOWERCASE: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
pub const DIGITS: &[u8] = b"23456789";
/// No delimiter or quote characters, so passwords survive every export.
pub const SYMBOLS: &[u8] = b"!#$%&*+-=?@";

/// Characters that must never be generated.
pub const AMBIGUOUS: &[char] = &['0', 'O', 'I', '1', 'l'];

const CLASSES: [&[u8]; 4] = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS];

/// Generate a password of exactly `length` characters.
///
/// One character from each class is drawn first, the rest uniformly from the
/// union, then the whole sequence is shuffled. `length` values below the
/// number of classes are raised to it.
pub fn generate_password(length: usize) -> String {
    let mut rng = OsRng;
    let length = length.max(CLASSES.len());

    let union: Vec<u8> = CLASSES.iter().flat_map(|c| c.iter().copied()).collect();

    let mut chars: Vec<u8> = CLASSES
        .iter()
        .filter_map(|class| class.choose(&mut rng).copied())
        .collect();
    while chars.len() < length {
        if let Some(c) = union.choose(&mut rng) {
            chars.push(*c);
        }
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_class(password: &str, class: &[u8]) -> bool {
        password.bytes().any(|b| class.contains(&b))
    }

    #[test]
    fn test_alphabets_are_disjoint_and_unambiguous() {
        for (i, a) in CLASSES.iter().enumerate() {
            for b in CLASSES.iter().skip(i + 1) {
                assert!(a.iter().all(|c| !b.contains(c)));
            }
            assert!(a.iter().all(|c| !AMBIGUOUS.contains(&char::from(*c))));
        }
    }

    #[test]
    fn test_thousand_generations_meet_composition_rules() {
        for _ in 0..1000 {
            let pw = generate_password(8);
            assert_eq!(pw.chars().count(), 8);
            assert!(has_class(&pw, UPPERCASE), "no uppercase in {pw}");
            assert!(has_class(&pw, LOWERCASE), "no lowercase in {pw}");
            assert!(has_class(&pw, DIGITS), "no digit in {pw}");
            assert!(has_class(&pw, SYMBOLS), "no symbol in {pw}");
            assert!(!pw.chars().any(|c| AMBIGUOUS.contains(&c)));
        }
    }

    #[test]
    fn test_minimum_length_is_class_count() {
        assert_eq!(generate_password(0).len(), 4);
        assert_eq!(generate_password(4).len(), 4);
        assert_eq!(generate_password(20).len(), 20);
    }

    #[test]
    fn test_passwords_differ() {
        let a = generate_password(16);
        let b = generate_password(16);
        assert_ne!(a, b);
    }
}
