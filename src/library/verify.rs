//! Lyrics source agreement.
//!
//! Sources are compared after normalisation (case, punctuation and whitespace
//! removed) by token overlap, so near-duplicates from different sites agree
//! even when their formatting differs.

use super::song::LyricsSource;
use std::collections::HashSet;

/// Sources at or above this similarity belong to the same group.
pub const AGREEMENT_THRESHOLD: f64 = 0.8;
/// Agreed text must be longer than this (in characters) to count as verified.
pub const MIN_VERIFIED_CHARS: usize = 100;

pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation() && !matches!(c, '’' | '‘' | '“' | '”' | '…'))
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Jaccard similarity of the normalised word sets.
pub fn similarity(a: &str, b: &str) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);
    let ta: HashSet<&str> = na.split(' ').filter(|t| !t.is_empty()).collect();
    let tb: HashSet<&str> = nb.split(' ').filter(|t| !t.is_empty()).collect();
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    let inter = ta.intersection(&tb).count() as f64;
    let union = ta.union(&tb).count() as f64;
    inter / union
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// Sources kept: the largest agreeing group plus one representative of
    /// every other group that has at least two members.
    pub sources: Vec<LyricsSource>,
    /// Highest-confidence source of the largest group.
    pub best: Option<LyricsSource>,
    pub verified: bool,
    pub confidence: f64,
}

pub fn verify(sources: &[LyricsSource]) -> Verification {
    let mut groups: Vec<Vec<&LyricsSource>> = Vec::new();
    for source in sources {
        match groups
            .iter_mut()
            .find(|g| similarity(&source.lyrics, &g[0].lyrics) >= AGREEMENT_THRESHOLD)
        {
            Some(group) => group.push(source),
            None => groups.push(vec![source]),
        }
    }

    let max_conf = |g: &Vec<&LyricsSource>| g.iter().map(|s| s.confidence).fold(0.0, f64::max);
    groups.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then(max_conf(b).total_cmp(&max_conf(a)))
    });

    let mut kept: Vec<LyricsSource> = Vec::new();
    let mut best = None;
    if let Some((top, rest)) = groups.split_first() {
        kept.extend(top.iter().map(|s| (*s).clone()));
        best = top
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|s| (*s).clone());
        for group in rest.iter().filter(|g| g.len() >= 2) {
            if let Some(rep) = group.iter().max_by(|a, b| a.confidence.total_cmp(&b.confidence)) {
                kept.push((*rep).clone());
            }
        }
    }

    let agreeing = groups.first().map(|g| g.len()).unwrap_or(0);
    let long_enough = best
        .as_ref()
        .is_some_and(|s| normalize(&s.lyrics).chars().count() > MIN_VERIFIED_CHARS);

    Verification {
        confidence: confidence(&kept),
        verified: agreeing >= 2 && long_enough,
        sources: kept,
        best,
    }
}

/// One source is discounted; two or more are scaled by how well the first
/// two agree, capped at 0.95.
pub fn confidence(sources: &[LyricsSource]) -> f64 {
    match sources {
        [] => 0.0,
        [only] => only.confidence * 0.7,
        [first, second, ..] => {
            let mean = sources.iter().map(|s| s.confidence).sum::<f64>() / sources.len() as f64;
            (mean * similarity(&first.lyrics, &second.lyrics)).min(0.95)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSE: &str = "Yana yana sevdik bazen, çok kez unutulup gidenin ardından \
                         bir daha dönmeyecek sandık ama yine geldi bahar ve yine açtı çiçekler";

    fn src(site: &str, lyrics: &str, confidence: f64) -> LyricsSource {
        LyricsSource {
            url: format!("https://{site}/x"),
            site_name: site.to_string(),
            lyrics: lyrics.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_formatting_differences_still_agree() {
        let a = VERSE.to_string();
        let b = VERSE.to_ascii_uppercase().replace(',', "").replace(' ', "  \n");
        assert!(similarity(&a, &b) > 0.99);
    }

    #[test]
    fn test_two_agreeing_long_sources_verify() {
        let sources = vec![
            src("genius.com", VERSE, 0.9),
            src("azlyrics.com", &VERSE.replace(',', ""), 0.8),
            src("other.com", "completely different words here", 0.95),
        ];
        let v = verify(&sources);
        assert!(v.verified);
        assert_eq!(v.sources.len(), 2);
        assert_eq!(v.best.unwrap().site_name, "genius.com");
        assert!(v.confidence > 0.8 && v.confidence <= 0.95);
    }

    #[test]
    fn test_single_source_not_verified() {
        let v = verify(&[src("genius.com", VERSE, 0.9)]);
        assert!(!v.verified);
        assert!((v.confidence - 0.63).abs() < 1e-9);
    }

    #[test]
    fn test_short_agreement_not_verified() {
        let v = verify(&[src("a", "la la la", 0.9), src("b", "La la la!", 0.9)]);
        assert!(!v.verified);
    }

    #[test]
    fn test_empty_sources() {
        let v = verify(&[]);
        assert!(!v.verified);
        assert!(v.best.is_none());
        assert_eq!(v.confidence, 0.0);
    }
}
