//! Folding of extended-Latin transliteration letters onto plain ASCII. Both
//! index keys go through [`fold_char`] so titles and first lines land in the
//! same 26 buckets.

/// Uppercase transliteration letters and the ASCII letter they are filed
/// under.
pub const FOLDING_TABLE: &[(char, char)] = &[
    ('Ś', 'S'),
    ('Ṣ', 'S'),
    ('Ṥ', 'S'),
    ('Ŝ', 'S'),
    ('Ṛ', 'R'),
    ('Ṝ', 'R'),
    ('Ṟ', 'R'),
    ('Ŗ', 'R'),
    ('Ř', 'R'),
    ('Ṇ', 'N'),
    ('Ṅ', 'N'),
    ('Ñ', 'N'),
    ('Ṉ', 'N'),
    ('Ṭ', 'T'),
    ('Ṫ', 'T'),
    ('Ḍ', 'D'),
    ('Ḑ', 'D'),
    ('Ṁ', 'M'),
    ('Ṃ', 'M'),
    ('Ḥ', 'H'),
    ('Ḷ', 'L'),
    ('Ḹ', 'L'),
    ('Ĵ', 'J'),
    ('Ā', 'A'),
    ('Á', 'A'),
    ('À', 'A'),
    ('Ä', 'A'),
    ('Â', 'A'),
    ('Ī', 'I'),
    ('Í', 'I'),
    ('Ì', 'I'),
    ('Ï', 'I'),
    ('Î', 'I'),
    ('Ū', 'U'),
    ('Ú', 'U'),
    ('Ù', 'U'),
    ('Ü', 'U'),
    ('Û', 'U'),
    ('Ē', 'E'),
    ('É', 'E'),
    ('È', 'E'),
    ('Ë', 'E'),
    ('Ê', 'E'),
    ('Ō', 'O'),
    ('Ó', 'O'),
    ('Ò', 'O'),
    ('Ö', 'O'),
    ('Ô', 'O'),
];

/// Look a single character up in the table, returning it unchanged when it
/// has no entry.
pub fn fold_char(ch: char) -> char {
    FOLDING_TABLE
        .iter()
        .find(|(from, _)| *from == ch)
        .map(|(_, to)| *to)
        .unwrap_or(ch)
}

/// Uppercase `ch` and fold it. Returns the ASCII letter the character is
/// indexed under, or `None` when the result is not an ASCII letter.
pub fn index_letter(ch: char) -> Option<char> {
    let upper = ch.to_uppercase().next().unwrap_or(ch);
    let folded = fold_char(upper);
    folded.is_ascii_alphabetic().then_some(folded)
}
