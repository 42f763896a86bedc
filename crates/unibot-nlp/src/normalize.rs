//! Text normalization shared by the vocabulary and the extraction pipeline.

/// Lowercases and trims `text` into a matching key.
///
/// The Turkish dotted and dotless I (`İ`, `I`, `ı`, `i`) all fold to plain
/// `i`, so "IŞIK", "Işık" and "ışık" produce the same key. Keys are only used
/// for lookups; canonical names keep their original spelling.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars() {
        match c {
            'İ' | 'I' | 'ı' => out.push('i'),
            other => out.extend(other.to_lowercase()),
        }
    }
    out
}

/// Prepares text for fuzzy scoring: non-alphanumeric characters become
/// spaces, then the result is normalized and whitespace-collapsed.
pub fn fuzzy_process(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    normalize_text(&replaced)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize_text("  CS101 Intro  "), "cs101 intro");
    }

    #[test]
    fn test_turkish_i_folding() {
        assert_eq!(normalize_text("İSTANBUL"), "istanbul");
        assert_eq!(normalize_text("IŞIK"), normalize_text("ışık"));
        assert_eq!(normalize_text("Salı"), normalize_text("SALI"));
        // dotted capital I must not leave a combining dot behind
        assert_eq!(normalize_text("İ").chars().count(), 1);
    }

    #[test]
    fn test_fuzzy_process() {
        assert_eq!(fuzzy_process("When is CS-101?"), "when is cs 101");
        assert_eq!(fuzzy_process("Doç. Dr.  Ayşe"), "doç dr ayşe");
        assert_eq!(fuzzy_process("?!"), "");
    }
}
