const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const REPLACEMENT: &str = "****";

/// Replace profane words in a chirp body with `****`
///
/// Words are separated by single spaces and compared case-insensitively.
/// Punctuation attached to a word keeps it from matching.
pub fn clean_chirp_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS
                .iter()
                .any(|profane| word.eq_ignore_ascii_case(profane))
            {
                REPLACEMENT
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
