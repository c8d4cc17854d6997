//! Node name handling: sanitizing, note extensions, safe-name candidates.

use crate::error::ApiError;
use crate::types::NOTE_EXTENSION;

const FORBIDDEN: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace path separators and reserved characters with `_` and trim.
pub fn sanitize_name(name: &str) -> Result<String, ApiError> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(ApiError::InvalidOperation(format!(
            "invalid node name '{}'",
            name
        )));
    }
    Ok(cleaned)
}

/// Append the note extension unless the name already carries it
pub fn ensure_note_extension(name: &str) -> String {
    if has_note_extension(name) {
        name.to_string()
    } else {
        format!("{}{}", name, NOTE_EXTENSION)
    }
}

/// Case-insensitive check for a trailing note extension
pub fn has_note_extension(name: &str) -> bool {
    let Some(at) = name.len().checked_sub(NOTE_EXTENSION.len()) else {
        return false;
    };
    name.is_char_boundary(at) && name[at..].eq_ignore_ascii_case(NOTE_EXTENSION)
}

/// Split `name.md` into (`name`, `.md`); names without the note extension keep an empty suffix
pub fn split_extension(name: &str) -> (&str, &str) {
    if name.len() > NOTE_EXTENSION.len() && has_note_extension(name) {
        name.split_at(name.len() - NOTE_EXTENSION.len())
    } else {
        (name, "")
    }
}

/// The `n`th candidate for a safe name: `name`, `name (1)`, `name (2)`, ...
pub fn candidate_name(name: &str, n: usize) -> String {
    if n == 0 {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    format!("{} ({}){}", stem, n, ext)
}

/// First candidate not rejected by `taken`
pub fn first_free_name<F>(name: &str, mut taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    let mut n = 0;
    loop {
        let candidate = candidate_name(name, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
