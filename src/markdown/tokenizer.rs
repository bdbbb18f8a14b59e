//! Whitespace tokenization with the `±` glyph split into its own token.

/// The uncertainty glyph.
pub const PLUS_MINUS: &str = "±";

/// Split field-data text into tokens.
///
/// Tokens are whitespace-delimited. A token that contains `±` but is not the
/// glyph alone is split around every glyph occurrence, keeping order and
/// dropping empty pieces: `"±5"` → `["±", "5"]`, `"0.3±0.1"` →
/// `["0.3", "±", "0.1"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for raw in text.split_whitespace() {
        if raw == PLUS_MINUS || !raw.contains(PLUS_MINUS) {
            tokens.push(raw.to_string());
            continue;
        }
        let mut first = true;
        for piece in raw.split(PLUS_MINUS) {
            if !first {
                tokens.push(PLUS_MINUS.to_string());
            }
            first = false;
            if !piece.is_empty() {
                tokens.push(piece.to_string());
            }
        }
    }
    tokens
}
