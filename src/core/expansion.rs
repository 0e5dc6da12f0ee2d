//! Word expansion applied to a parsed pipeline before it runs.

use std::path::Path;

/// Removes one pair of matching surrounding quotes (`'...'` or `"..."`).
pub fn strip_quotes(word: &str) -> &str {
    let bytes = word.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'\'' || first == b'"') && first == last {
            return &word[1..word.len() - 1];
        }
    }
    word
}

/// Expands a leading `~` (alone or followed by `/`) to `home`.
pub fn expand_tilde(word: &str, home: Option<&Path>) -> String {
    let home = match home {
        Some(home) => home,
        None => return word.to_string(),
    };

    if word == "~" {
        home.display().to_string()
    } else if word.starts_with("~/") {
        home.join(&word[2..]).display().to_string()
    } else {
        word.to_string()
    }
}

/// Quote stripping followed by tilde expansion against the user's home directory.
pub fn expand_word(word: &str) -> String {
    let home = dirs::home_dir();
    let unquoted = strip_quotes(word);
    if unquoted.len() != word.len() {
        // quoted words are taken literally
        return unquoted.to_string();
    }
    expand_tilde(word, home.as_deref())
}
