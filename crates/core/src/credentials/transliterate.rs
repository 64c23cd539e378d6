//! Character table mapping name characters to login-safe ASCII.

/// Replacement for each character that may not appear in a login name or
/// mailbox. Characters not listed pass through unchanged.
const CHAR_MAP: &[(char, &str)] = &[
    ('ä', "ae"),
    ('à', "a"),
    ('á', "a"),
    ('â', "a"),
    ('ã', "a"),
    ('Ä', "Ae"),
    ('À', "A"),
    ('Á', "A"),
    ('Â', "A"),
    ('Ã', "A"),
    ('è', "e"),
    ('é', "e"),
    ('ê', "e"),
    ('È', "E"),
    ('É', "E"),
    ('Ê', "E"),
    ('ö', "oe"),
    ('ò', "o"),
    ('ó', "o"),
    ('ô', "o"),
    ('õ', "o"),
    ('Ö', "Oe"),
    ('Ò', "O"),
    ('Ó', "O"),
    ('Ô', "O"),
    ('Õ', "O"),
    ('ü', "ue"),
    ('ù', "u"),
    ('ú', "u"),
    ('û', "u"),
    ('Ü', "Ue"),
    ('Ù', "U"),
    ('Ú', "U"),
    ('Û', "U"),
    ('í', "i"),
    ('ß', "ss"),
    ('Ç', "C"),
    ('ç', "c"),
    ('č', "c"),
    ('ć', "c"),
    ('´', ""),
    ('-', ""),
    (' ', ""),
];

fn replacement(c: char) -> Option<&'static str> {
    CHAR_MAP
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Replace every mapped character of `input`; unmapped characters are kept.
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match replacement(c) {
            Some(to) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// Every character the table knows about.
pub fn mapped_chars() -> impl Iterator<Item = char> {
    CHAR_MAP.iter().map(|(from, _)| *from)
}
