//! Finish vocabulary translation.
//!
//! Buyers may state finishes in German; suppliers describe them in English.

/// Known finish terms and their English equivalents.
pub const FINISH_TRANSLATIONS: &[(&str, &str)] = &[
    ("gebeizt", "pickled"),
    ("gebeizt und geglüht", "pickled and annealed"),
    ("ungebeizt", "unpickled"),
];

/// Translate a finish term. Unknown terms pass through unchanged.
pub fn translate_finish(term: &str) -> &str {
    FINISH_TRANSLATIONS
        .iter()
        .find(|(from, _)| *from == term)
        .map(|(_, to)| *to)
        .unwrap_or(term)
}
