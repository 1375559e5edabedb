//! Positional splicing of resolved terms back into definition text
//!
//! Markers are replaced left to right, each one consuming the next unused
//! replacement. A replacement list shorter than the marker list is reported as
//! `SubstitutionError`; nothing wraps around or gets reused.

use crate::errors::NomenError;
use crate::markers::{extract_markers, Delimiters, Marker};

pub fn substitute(
    text: &str,
    delimiters: &Delimiters,
    replacements: &[String],
) -> Result<String, NomenError> {
    let markers = extract_markers(text, delimiters);
    substitute_markers(text, &markers, replacements)
}

/// Splice `replacements` over already-located `markers`.
///
/// `markers` must come from [`extract_markers`] on the same `text`.
pub fn substitute_markers(
    text: &str,
    markers: &[Marker],
    replacements: &[String],
) -> Result<String, NomenError> {
    if replacements.len() < markers.len() {
        return Err(NomenError::SubstitutionError {
            markers: markers.len(),
            replacements: replacements.len(),
        });
    }
    if replacements.len() > markers.len() {
        log::debug!(
            "Ignoring {} surplus replacements",
            replacements.len() - markers.len()
        );
    }

    let mut resolved = String::with_capacity(text.len());
    let mut cursor = 0;
    for (marker, replacement) in markers.iter().zip(replacements) {
        resolved.push_str(&text[cursor..marker.start]);
        resolved.push_str(replacement);
        cursor = marker.end;
    }
    resolved.push_str(&text[cursor..]);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_left_to_right() {
        let result = substitute(
            "Replace @this@ and @that@.",
            &Delimiters::default(),
            &strings(&["X", "Y"]),
        )
        .unwrap();
        assert_eq!(result, "Replace X and Y.");
    }

    #[test]
    fn test_zero_markers_is_identity() {
        let text = "A definition without any cross-reference.";
        assert_eq!(substitute(text, &Delimiters::default(), &[]).unwrap(), text);
    }

    #[test]
    fn test_duplicate_payloads_consume_separate_replacements() {
        let result = substitute(
            "@a@ @a@ @a@",
            &Delimiters::default(),
            &strings(&["one", "two", "three"]),
        )
        .unwrap();
        assert_eq!(result, "one two three");
    }

    #[test]
    fn test_short_replacement_list_is_reported() {
        let err = substitute(
            "@a@ and @b@ and @c@",
            &Delimiters::default(),
            &strings(&["X"]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            NomenError::SubstitutionError {
                markers: 3,
                replacements: 1
            }
        );
    }

    #[test]
    fn test_surplus_replacements_are_ignored() {
        let result = substitute("@a@.", &Delimiters::default(), &strings(&["X", "Y"])).unwrap();
        assert_eq!(result, "X.");
    }

    #[test]
    fn test_replacement_containing_delimiter_is_not_rescanned() {
        let result = substitute(
            "@a@ then @b@",
            &Delimiters::default(),
            &strings(&["user@host", "Z"]),
        )
        .unwrap();
        assert_eq!(result, "user@host then Z");
    }
}
