use serde::Serialize;

/// Strip every `.` and lowercase the rest.
pub fn normalize(text: &str) -> String {
    text.replace('.', "").to_lowercase()
}

/// Word characters are ASCII letters, digits, `_`, plus the apostrophe so
/// contractions stay whole.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\''
}

/// Normalize `text` and split it on runs of non-word characters.
///
/// Splitting behaves like a regex split on `[^\w']+`: a separator run at the
/// very start or end produces an empty leading or trailing token, and empty
/// input yields a single empty token. Non-ASCII letters count as separators.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_separator = false;

    for c in normalized.chars() {
        if is_word_char(c) {
            in_separator = false;
            current.push(c);
        } else if !in_separator {
            tokens.push(std::mem::take(&mut current));
            in_separator = true;
        }
    }
    tokens.push(current);
    tokens
}

/// Indices of every token equal to `term`. An empty term matches nothing,
/// including the empty tokens left by edge separators.
pub fn occurrences(tokens: &[String], term: &str) -> Vec<usize> {
    if term.is_empty() {
        return Vec::new();
    }
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.as_str() == term)
        .map(|(i, _)| i)
        .collect()
}

/// Height for the token at `index` of `len`: `(100 / len) * index * factor`.
pub fn placement_height(index: usize, len: usize, factor: f32) -> f32 {
    (100.0 / len as f32) * index as f32 * factor
}

/// A located term occurrence and the height it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Occurrence {
    pub index: usize,
    pub height: f32,
}

/// Find `term` in `tokens` and compute each occurrence's height.
pub fn locate(tokens: &[String], term: &str, factor: f32) -> Vec<Occurrence> {
    occurrences(tokens, term)
        .into_iter()
        .map(|index| Occurrence {
            index,
            height: placement_height(index, tokens.len(), factor),
        })
        .collect()
}
