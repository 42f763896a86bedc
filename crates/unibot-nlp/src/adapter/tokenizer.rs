//! Whitespace-and-punctuation tokenizer used by the built-in backends.
//!
//! Offsets are byte offsets into the original text. Edge punctuation is split
//! off into its own tokens, except for the period of a known abbreviation
//! ("Dr.", "Prof."). Apostrophe suffixes ("CS101'in") become separate tokens.

use super::Token;
use crate::normalize::normalize_text;

const ABBREVIATIONS: &[&str] = &[
    "Dr", "Doç", "Prof", "Öğr", "Gör", "Yrd", "Arş", "Mr", "Mrs", "Ms", "St",
];

pub fn tokenize(text: &str, lemmatize: fn(&str) -> String) -> Vec<Token> {
    let mut spans = Vec::new();
    let mut chunk_start = None;

    for (i, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        if c.is_whitespace() {
            if let Some(start) = chunk_start.take() {
                split_chunk(text, start, i, &mut spans);
            }
        } else if chunk_start.is_none() {
            chunk_start = Some(i);
        }
    }

    spans
        .into_iter()
        .map(|(start, end)| {
            let surface = &text[start..end];
            Token {
                text: surface.to_string(),
                lower: normalize_text(surface),
                lemma: lemmatize(surface),
                start,
                end,
            }
        })
        .collect()
}

fn split_chunk(text: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    let mut lo = start;
    while let Some(c) = text[lo..end].chars().next() {
        if !is_edge_punct(c) {
            break;
        }
        spans.push((lo, lo + c.len_utf8()));
        lo += c.len_utf8();
    }

    let mut hi = end;
    let mut trailing = Vec::new();
    while let Some(c) = text[lo..hi].chars().next_back() {
        if !is_edge_punct(c) {
            break;
        }
        let cut = hi - c.len_utf8();
        if c == '.' && is_abbreviation(&text[lo..cut]) {
            break;
        }
        trailing.push((cut, hi));
        hi = cut;
    }

    if lo < hi {
        let core = &text[lo..hi];
        match core.find(|c: char| c == '\'' || c == '’') {
            Some(p) if p > 0 => {
                spans.push((lo, lo + p));
                spans.push((lo + p, hi));
            }
            _ => spans.push((lo, hi)),
        }
    }

    spans.extend(trailing.into_iter().rev());
}

fn is_edge_punct(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '“' | '”' | '‘' | '’' | '…' | '«' | '»')
}

fn is_abbreviation(word: &str) -> bool {
    if ABBREVIATIONS.contains(&word) {
        return true;
    }
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
}
