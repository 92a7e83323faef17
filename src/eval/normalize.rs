//! Card name normalization for bucket matching.

/// Normalize a card name for comparison.
///
/// Case-insensitive, typographic punctuation folded to its ASCII form,
/// runs of whitespace collapsed to one space, ends trimmed.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for ch in name.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match fold(ch) {
            Some(ascii) => out.push_str(ascii),
            None => out.extend(ch.to_lowercase()),
        }
    }
    out
}

fn fold(ch: char) -> Option<&'static str> {
    Some(match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{FF07}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{FF02}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' | '\u{FF0D}' => "-",
        '\u{2026}' => "...",
        '\u{00B7}' | '\u{30FB}' | '\u{2022}' => ".",
        '\u{FF01}' => "!",
        '\u{FF1A}' => ":",
        '\u{FF0C}' => ",",
        _ => return None,
    })
}

/// True when `name` normalizes to the same text as `other`.
#[must_use]
pub fn names_match(name: &str, other: &str) -> bool {
    normalize_name(name) == normalize_name(other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize_name("  Cinder   SOVEREIGN "), "cinder sovereign");
        assert_eq!(normalize_name("Cinder\tRite\n"), "cinder rite");
    }

    #[test]
    fn test_punctuation_folding() {
        assert_eq!(normalize_name("Herald\u{2019}s Call"), "herald's call");
        assert_eq!(normalize_name("Ash\u{2014}Born"), "ash-born");
        assert_eq!(normalize_name("\u{201C}Vigil\u{201D}"), "\"vigil\"");
        assert!(names_match("Requiem \u{2026}", "requiem ..."));
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize_name("   "), "");
    }
}
