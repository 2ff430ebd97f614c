//! String helpers for matching loose asset files against catalog titles.
//!
//! Asset files are named after game titles by convention only, so matching
//! is heuristic: each transform here is a small pure function, composed by
//! the asset matcher in a fixed order.

/// Characters LaunchBox replaces when deriving a filesystem-safe file name
/// from a game title.
const INVALID_FILENAME_CHARS: [char; 10] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*', '\''];

/// Escapes a game title the way LaunchBox does when naming image and music
/// files after it.
pub fn escape_title(title: &str) -> String {
    title.replace(INVALID_FILENAME_CHARS, "_")
}

/// Strips the `-NN` numeric disambiguation tag from an image file stem
/// (e.g. `Some Game-02`). Stems without the tag are returned unchanged.
pub fn strip_numeric_suffix(stem: &str) -> &str {
    match stem.as_bytes() {
        [rest @ .., b'-', a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            // the stripped tail is ASCII, so this is a char boundary
            &stem[..rest.len()]
        }
        _ => stem,
    }
}

/// Strips a trailing parenthesized disambiguator, e.g. a region or version
/// tag: `Title (USA)` becomes `Title`. Stems without one are returned
/// unchanged.
pub fn strip_trailing_parenthetical(stem: &str) -> &str {
    if !stem.ends_with(')') {
        return stem;
    }
    match stem[..stem.len() - 1].rfind('(') {
        Some(idx) if idx > 0 => stem[..idx].trim(),
        _ => stem,
    }
}

/// Rewrites ` - ` subtitle separators to `: `, for catalog titles that use a
/// colon where the file name uses a dash.
pub fn dashes_to_colons(title: &str) -> String {
    title.replace(" - ", ": ")
}

/// Moves a trailing `, The` article to the front: `Legend, The` becomes
/// `The Legend`.
pub fn move_article_to_front(title: &str) -> String {
    match title.strip_suffix(", The") {
        Some(rest) => format!("The {rest}"),
        None => title.to_owned(),
    }
}

#[cfg(test)]
pub mod test {
    use test_case::test_case;

    use super::*;

    #[test_case("Title: The Sequel", "Title_ The Sequel")]
    #[test_case("What? Where\\When*", "What_ Where_When_")]
    #[test_case("Plain Title", "Plain Title")]
    fn test_escape_title(raw: &str, escaped: &str) {
        assert_eq!(escape_title(raw), String::from(escaped));
    }

    #[test_case("Some Game-02", "Some Game")]
    #[test_case("Some Game-2", "Some Game-2"; "single digit kept")]
    #[test_case("Spider-Man", "Spider-Man"; "word after dash kept")]
    #[test_case("-01", ""; "tag only")]
    #[test_case("Some Game", "Some Game")]
    fn test_strip_numeric_suffix(stem: &str, expected: &str) {
        assert_eq!(strip_numeric_suffix(stem), expected);
    }

    #[test_case("Metroid Prime, The (USA)", "Metroid Prime, The")]
    #[test_case("Title (Europe) (Rev A)", "Title (Europe)"; "only last group stripped")]
    #[test_case("Title", "Title"; "no parenthetical")]
    #[test_case("(whole stem)", "(whole stem)"; "leading paren kept")]
    fn test_strip_trailing_parenthetical(stem: &str, expected: &str) {
        assert_eq!(strip_trailing_parenthetical(stem), expected);
    }

    #[test_case("Title - Subtitle", "Title: Subtitle")]
    #[test_case("A - B - C", "A: B: C")]
    #[test_case("Dashed-Name", "Dashed-Name"; "tight dash kept")]
    fn test_dashes_to_colons(raw: &str, expected: &str) {
        assert_eq!(dashes_to_colons(raw), String::from(expected));
    }

    #[test_case("Metroid Prime, The", "The Metroid Prime")]
    #[test_case("The Metroid Prime", "The Metroid Prime"; "already leading")]
    #[test_case("Something, A", "Something, A"; "other articles untouched")]
    fn test_move_article_to_front(raw: &str, expected: &str) {
        assert_eq!(move_article_to_front(raw), String::from(expected));
    }
}
