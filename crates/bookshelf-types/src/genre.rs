use phf::phf_ordered_set;
use unicode_normalization::UnicodeNormalization;

/// Genres a book can be filed under, lowercase and NFC normalized.
pub static ALLOWED_GENRES: phf::OrderedSet<&'static str> = phf_ordered_set! {
    "ficção",
    "romance",
    "mistério",
};

fn normalize(genre: &str) -> String {
    genre.trim().nfc().collect::<String>().to_lowercase()
}

/// Case insensitive match against [`ALLOWED_GENRES`], surrounding whitespace is ignored.
pub fn is_allowed_genre(genre: &str) -> bool {
    ALLOWED_GENRES.contains(normalize(genre).as_str())
}

/// Human readable list of allowed genres, e.g. for error messages.
pub fn allowed_genres_list() -> String {
    ALLOWED_GENRES
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}
