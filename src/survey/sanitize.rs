//! Field cleaning and length capping shared by every record builder

/// Maximum length of identifier columns (`id`, `survey_id`, `response_id`)
pub const ID_MAX: usize = 12;

/// Maximum length of free-text columns (`title`, `question`, `answer`)
pub const TEXT_MAX: usize = 255;

/// Maximum length of status columns
pub const STATUS_MAX: usize = 16;

const ENTITIES: [(&str, &str); 2] = [("&amp;", "&"), ("&nbsp;", " ")];

/// Strip line breaks, decode `&amp;` and `&nbsp;`, and trim surrounding whitespace.
///
/// Entity decoding runs to a fixpoint so input like `&amp;nbsp;` cannot leave a
/// fresh entity behind, which keeps `clean(clean(s)) == clean(s)`.
pub fn clean(s: &str) -> String {
    let mut out: String = s.chars().filter(|c| *c != '\n' && *c != '\r').collect();

    while ENTITIES.iter().any(|(entity, _)| out.contains(entity)) {
        for (entity, decoded) in ENTITIES {
            out = out.replace(entity, decoded);
        }
    }

    out.trim().to_string()
}

/// Cap `s` at `max` characters. Counts chars, never splits a code point.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}
