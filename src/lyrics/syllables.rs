//! Rule-based syllable splitting and timing estimation.
//!
//! Used to fill in `syllables` for documents whose words arrive without them.
//! The rules follow Turkish syllabification (a vowel closes a syllable unless
//! a single consonant is followed by another vowel); the vowel set also covers
//! plain Latin vowels so other Latin-script words split sensibly.

use super::model::{LyricsDocument, Syllable};

const VOWELS: &str = "aeıioöuüAEIİOÖUÜâîûÂÎÛ";

fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

/// Split a word into syllables. Punctuation is stripped first; a word with no
/// letters yields nothing.
pub fn split_word(word: &str) -> Vec<String> {
    let clean: Vec<char> = word.chars().filter(|c| c.is_alphanumeric()).collect();
    if clean.is_empty() {
        return Vec::new();
    }

    let mut syllables: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut i = 0;
    while i < clean.len() {
        let c = clean[i];
        current.push(c);
        if is_vowel(c) && i + 1 < clean.len() {
            let next = clean[i + 1];
            if is_vowel(next) {
                syllables.push(std::mem::take(&mut current));
            } else {
                match clean.get(i + 2) {
                    // V C V: the consonant opens the next syllable.
                    Some(&after) if is_vowel(after) => {
                        syllables.push(std::mem::take(&mut current));
                    }
                    // V C C: the first consonant closes this one.
                    Some(_) => {
                        current.push(next);
                        i += 1;
                        syllables.push(std::mem::take(&mut current));
                    }
                    // V C at the end of the word stays together below.
                    None => {}
                }
            }
        }
        i += 1;
    }

    if !current.is_empty() {
        match syllables.last_mut() {
            Some(last) if !current.chars().any(is_vowel) => last.push_str(&current),
            _ => syllables.push(current),
        }
    }

    syllables
}

/// Spread `[start, end]` evenly over the given syllable texts.
pub fn estimate_timings(start: f64, end: f64, syllables: &[String]) -> Vec<Syllable> {
    if syllables.is_empty() || end < start {
        return Vec::new();
    }
    let step = (end - start) / syllables.len() as f64;
    syllables
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let s = start + step * i as f64;
            let e = if i + 1 == syllables.len() { end } else { s + step };
            Syllable {
                text: text.clone(),
                start: round_ms(s),
                end: round_ms(e),
            }
        })
        .collect()
}

fn round_ms(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Fill every word that has no syllables. Returns how many words changed.
pub fn fill_missing(doc: &mut LyricsDocument) -> usize {
    let mut filled = 0;
    for word in doc.segments.iter_mut().flat_map(|s| s.words.iter_mut()) {
        if !word.syllables.is_empty() {
            continue;
        }
        let parts = split_word(&word.text);
        let timed = estimate_timings(word.start, word.end, &parts);
        if !timed.is_empty() {
            word.syllables = timed;
            filled += 1;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::model::{Segment, Word};

    #[test]
    fn test_split_turkish_words() {
        assert_eq!(split_word("Yana"), vec!["Ya", "na"]);
        assert_eq!(split_word("sevdik"), vec!["sev", "dik"]);
        assert_eq!(split_word("merhaba"), vec!["mer", "ha", "ba"]);
        assert_eq!(split_word("bazen,"), vec!["ba", "zen"]);
    }

    #[test]
    fn test_split_consonant_only_word() {
        assert_eq!(split_word("hmm"), vec!["hmm"]);
        assert!(split_word("...").is_empty());
    }

    #[test]
    fn test_estimate_even_split() {
        let parts = vec!["Sam".to_string(), "ple".to_string()];
        let timed = estimate_timings(0.5, 1.5, &parts);
        assert_eq!(timed.len(), 2);
        assert_eq!((timed[0].start, timed[0].end), (0.5, 1.0));
        assert_eq!((timed[1].start, timed[1].end), (1.0, 1.5));
    }

    #[test]
    fn test_estimate_rejects_inverted_interval() {
        assert!(estimate_timings(2.0, 1.0, &["a".to_string()]).is_empty());
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let mut doc = LyricsDocument {
            segments: vec![Segment {
                id: "s".into(),
                text: "Yana sevdik".into(),
                start: 0.0,
                end: 2.0,
                words: vec![
                    Word {
                        text: "Yana".into(),
                        start: 0.0,
                        end: 1.0,
                        confidence: 1.0,
                        syllables: Vec::new(),
                        translation: None,
                    },
                    Word {
                        text: "sevdik".into(),
                        start: 1.0,
                        end: 2.0,
                        confidence: 1.0,
                        syllables: vec![Syllable {
                            text: "sevdik".into(),
                            start: 1.0,
                            end: 2.0,
                        }],
                        translation: None,
                    },
                ],
            }],
            ..LyricsDocument::default()
        };
        assert_eq!(fill_missing(&mut doc), 1);
        assert_eq!(doc.segments[0].words[0].syllables.len(), 2);
        assert_eq!(doc.segments[0].words[1].syllables.len(), 1);
    }
}
