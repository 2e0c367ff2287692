//! # Highlighting (§4.4)
//!
//! Sentence-level snippet extraction. Deliberately simple: the chunk sizes
//! this system deals with are a handful of paragraphs, not whole books, so
//! there is no need for a real sentence tokenizer.

const MAX_HIGHLIGHTS: usize = 3;
const MAX_HIGHLIGHT_LEN: usize = 200;

/// Splits `content` into sentences and returns up to three that contain
/// any whitespace-separated term from `query`, case-insensitively. Each
/// returned sentence is truncated to 200 characters with an ellipsis.
pub fn highlight(content: &str, query: &str) -> Vec<String> {
    let terms: Vec<String> = query.split_whitespace().map(|t| t.to_lowercase()).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for sentence in split_sentences(content) {
        let lower = sentence.to_lowercase();
        if terms.iter().any(|t| lower.contains(t.as_str())) {
            hits.push(truncate(sentence, MAX_HIGHLIGHT_LEN));
            if hits.len() == MAX_HIGHLIGHTS {
                break;
            }
        }
    }
    hits
}

fn split_sentences(content: &str) -> Vec<&str> {
    content
        .split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_chars).collect();
    format!("{truncated}\u{2026}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_term_case_insensitively() {
        let content = "The Quick Fox jumps. A second sentence about dogs.";
        let hits = highlight(content, "quick");
        assert_eq!(hits, vec!["The Quick Fox jumps".to_string()]);
    }

    #[test]
    fn stops_at_three_matches() {
        let content = "cat one. cat two. cat three. cat four.";
        let hits = highlight(content, "cat");
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn no_matching_terms_yields_no_highlights() {
        let content = "nothing relevant here.";
        let hits = highlight(content, "zzz");
        assert!(hits.is_empty());
    }

    #[test]
    fn long_sentence_is_truncated_with_ellipsis() {
        let sentence = "a".repeat(250);
        let hits = highlight(&format!("{sentence} contains needle."), "needle");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].ends_with('\u{2026}'));
        assert_eq!(hits[0].chars().count(), MAX_HIGHLIGHT_LEN + 1);
    }

    #[test]
    fn splits_on_newlines_and_question_marks() {
        let content = "first line\nwhere is it?\nlast line";
        let hits = highlight(content, "where");
        assert_eq!(hits, vec!["where is it".to_string()]);
    }
}
