//! Keyword extraction for English and French coding material.

/// Words carrying no coding signal, in both working languages.
pub const STOP_WORDS: &[&str] = &[
    // English
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "has", "have", "been", "from", "this", "that", "with", "they", "will", "each",
    "which", "their", "said", "what", "its", "into", "more", "other", "there", "were", "when",
    "would", "could", "should", "about", "them", "then", "than", "some", "just", "also", "very",
    "because", "while", "where", "does", "did", "his", "she", "him", "how", "who", "why",
    // French
    "les", "des", "une", "est", "pas", "pour", "que", "qui", "dans", "par", "sur", "avec", "mais",
    "ont", "sont", "ses", "son", "aux", "leur", "leurs", "cette", "ces", "comme", "plus", "tout",
    "tous", "nous", "vous", "ils", "elles", "elle", "être", "avoir", "fait", "été", "était",
    "aussi", "donc", "alors", "quand", "très", "même", "entre", "sans", "sous", "car", "moi",
    "toi", "lui", "notre", "votre", "nos", "vos", "mes", "tes", "cela", "ça", "dont", "où",
];

/// Letters kept besides ASCII alphanumerics: lowercase Latin-1 letters and `œ`.
fn is_keyword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || (('ß'..='ÿ').contains(&c) && c != '÷') || c == 'œ'
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Lowercase, replace anything that is not a keyword character with a space,
/// split on whitespace, then drop tokens of two characters or fewer and stop words.
///
/// Repeated keywords are kept; term frequency depends on them.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_keyword_char(c) { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(
            extract_keywords("Money, MONEY... money!"),
            vec!["money", "money", "money"]
        );
    }

    #[test]
    fn drops_short_tokens_and_stop_words() {
        assert_eq!(
            extract_keywords("I am in it for the team and the mission"),
            vec!["team", "mission"]
        );
    }

    #[test]
    fn keeps_accented_letters() {
        assert_eq!(
            extract_keywords("L'équipe était très motivée à Noël"),
            vec!["équipe", "motivée", "noël"]
        );
    }

    #[test]
    fn keeps_oe_ligature() {
        assert_eq!(extract_keywords("le cœur du problème"), vec!["cœur", "problème"]);
    }

    #[test]
    fn splits_on_symbols() {
        assert_eq!(extract_keywords("stress/burnout—fatigue"), vec!["stress", "burnout", "fatigue"]);
    }

    #[test]
    fn empty_text() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("?? !! ..").is_empty());
    }
}
