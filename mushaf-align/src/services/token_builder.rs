//! Canonical token sequence construction
//!
//! Playback order is (ayah number, word creation order). Indices are assigned
//! once, here, and every later stage relies on them.

use crate::models::Token;

/// A word row as read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRow {
    pub word_id: i64,
    pub ayah_id: i64,
    pub ayah_number: i64,
    pub text: String,
}

/// Order rows canonically and assign 0-based indices
pub fn build_tokens(mut rows: Vec<WordRow>) -> Vec<Token> {
    rows.sort_by_key(|row| (row.ayah_number, row.word_id));

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| Token {
            index,
            word_id: row.word_id,
            ayah_id: row.ayah_id,
            text: row.text,
        })
        .collect()
}

/// Space-joined token text, in order, as sent to the alignment service
pub fn joined_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(word_id: i64, ayah_number: i64, text: &str) -> WordRow {
        WordRow {
            word_id,
            ayah_id: 1000 + ayah_number,
            ayah_number,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_orders_by_ayah_then_creation() {
        let rows = vec![
            row(7, 2, "c"),
            row(3, 1, "b"),
            row(9, 2, "d"),
            row(1, 1, "a"),
        ];

        let tokens = build_tokens(rows);

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
        let indices: Vec<usize> = tokens.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(tokens[2].ayah_id, 1002);
    }

    #[test]
    fn test_ayah_number_beats_word_id() {
        // A word created later in an earlier ayah still comes first
        let tokens = build_tokens(vec![row(1, 2, "second"), row(50, 1, "first")]);
        assert_eq!(tokens[0].text, "first");
        assert_eq!(tokens[1].text, "second");
    }

    #[test]
    fn test_joined_text() {
        let tokens = build_tokens(vec![row(1, 1, "بِسْمِ"), row(2, 1, "ٱللَّهِ")]);
        assert_eq!(joined_text(&tokens), "بِسْمِ ٱللَّهِ");
    }

    #[test]
    fn test_empty_sequence() {
        let tokens = build_tokens(Vec::new());
        assert!(tokens.is_empty());
        assert_eq!(joined_text(&tokens), "");
    }
}
