use unicode_normalization::UnicodeNormalization;

/// Presentation-form ligatures and their letter sequences.
const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Characters dropped outright: replacement char, zero-width space, BOM.
const INVISIBLE: [char; 3] = ['\u{FFFD}', '\u{200B}', '\u{FEFF}'];

/// Clean up extracted PDF text.
///
/// Expands ligatures, drops invisible and replacement characters, maps
/// non-breaking spaces to plain spaces, then composes to NFC.
pub fn cleanup_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        if INVISIBLE.contains(&ch) {
            continue;
        }
        if let Some((_, expanded)) = LIGATURES.iter().find(|(lig, _)| *lig == ch) {
            result.push_str(expanded);
            continue;
        }
        result.push(match ch {
            '\u{00A0}' | '\u{202F}' => ' ',
            other => other,
        });
    }

    result.nfc().collect()
}

/// [`cleanup_text`] over every cell of a grid.
pub fn cleanup_grid(grid: Vec<Vec<String>>) -> Vec<Vec<String>> {
    grid.into_iter()
        .map(|row| row.iter().map(|cell| cleanup_text(cell)).collect())
        .collect()
}
