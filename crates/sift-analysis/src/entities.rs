//! Heuristic entity tagging
//!
//! Finds runs of capitalized words and classifies each run as a person,
//! place or organization from its surroundings: corporate suffixes and
//! acronyms mark organizations, a preceding locative preposition or a
//! gazetteer hit marks places, and an honorific or a two-to-three word name
//! marks people. Single capitalized words with no such evidence are dropped
//! as noise. Concepts are the most frequent lowercase content words.

use crate::text::{clean_word, is_stopword};
use lazy_static::lazy_static;
use sift_domain::provenance::strip_citations;
use std::collections::{HashMap, HashSet};

/// Concepts kept per document
pub const MAX_CONCEPTS: usize = 10;

lazy_static! {
    static ref HONORIFICS: HashSet<&'static str> =
        ["mr", "mrs", "ms", "miss", "dr", "prof", "sir", "madam", "rev", "sen", "rep", "gov"]
            .iter()
            .copied()
            .collect();

    static ref ORG_SUFFIXES: HashSet<&'static str> = [
        "inc", "corp", "corporation", "co", "company", "ltd", "llc", "plc", "gmbh", "ag",
        "group", "holdings", "partners", "labs", "technologies", "systems", "university",
        "institute", "foundation", "agency", "association", "bank", "council", "department",
        "ministry", "committee", "society", "college", "school", "hospital",
    ]
    .iter()
    .copied()
    .collect();

    static ref LOCATIVE_PREPOSITIONS: HashSet<&'static str> = [
        "in", "at", "from", "near", "to", "across", "around", "outside", "inside",
        "throughout", "towards", "toward", "via",
    ]
    .iter()
    .copied()
    .collect();

    static ref GAZETTEER: HashSet<&'static str> = [
        "africa", "amsterdam", "asia", "atlanta", "australia", "austin", "berlin", "boston",
        "brazil", "california", "canada", "chicago", "china", "dallas", "denver", "dublin",
        "europe", "france", "germany", "india", "ireland", "italy", "japan", "london",
        "los angeles", "madrid", "mexico", "minneapolis", "minnesota", "new york", "oregon",
        "paris", "portland", "rome", "san francisco", "seattle", "singapore", "spain",
        "sydney", "texas", "tokyo", "toronto", "united kingdom", "united states", "washington",
    ]
    .iter()
    .copied()
    .collect();

    // Capitalized words that start sentences or headings but name nothing
    static ref SPAN_STOPWORDS: HashSet<&'static str> = [
        "the", "this", "that", "these", "those", "a", "an", "and", "but", "or", "if",
        "when", "where", "what", "which", "while", "with", "from", "after", "before",
        "during", "here", "there", "then", "also", "some", "many", "most", "each",
        "every", "all", "any", "our", "your", "their", "his", "her", "its", "we", "they",
        "it", "i", "he", "she", "you", "today", "yesterday", "tomorrow", "monday",
        "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january",
        "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december", "note", "notes", "summary", "update", "later",
        "however", "meanwhile", "overall", "finally", "next", "first", "last", "new",
    ]
    .iter()
    .copied()
    .collect();
}

/// Entities and concepts found in one text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedEntities {
    /// Named people, first-seen order
    pub people: Vec<String>,
    /// Named places, first-seen order
    pub places: Vec<String>,
    /// Named organizations, first-seen order
    pub organizations: Vec<String>,
    /// Most frequent lowercase content words
    pub concepts: Vec<String>,
}

impl TaggedEntities {
    /// True when nothing was found
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
            && self.places.is_empty()
            && self.organizations.is_empty()
            && self.concepts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpanKind {
    Person,
    Place,
    Organization,
}

/// Heuristic capitalized-span entity tagger
#[derive(Debug, Clone, Default)]
pub struct EntityTagger;

impl EntityTagger {
    /// Create a tagger
    pub fn new() -> Self {
        Self
    }

    /// Tag people, places, organizations and concepts in `text`
    pub fn tag(&self, text: &str) -> TaggedEntities {
        let text = strip_citations(text);
        let words: Vec<&str> = text.split_whitespace().collect();

        let mut tagged = TaggedEntities::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut in_entity = vec![false; words.len()];

        let mut i = 0;
        while i < words.len() {
            let Some(end) = span_end(&words, i) else {
                i += 1;
                continue;
            };

            if let Some((kind, name)) = classify(&words, i, end) {
                for flag in &mut in_entity[i..end] {
                    *flag = true;
                }
                if seen.insert(name.to_lowercase()) {
                    match kind {
                        SpanKind::Person => tagged.people.push(name),
                        SpanKind::Place => tagged.places.push(name),
                        SpanKind::Organization => tagged.organizations.push(name),
                    }
                }
            }
            i = end;
        }

        tagged.concepts = concepts(&words, &in_entity);
        tagged
    }
}

/// Starts with an uppercase letter
fn is_capitalized(word: &str) -> bool {
    clean_word(word)
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase())
}

/// Word ends a sentence or clause, unless it is an abbreviation like "Dr."
fn breaks_span(word: &str) -> bool {
    let cleaned = clean_word(word).to_lowercase();
    if word.ends_with('.') && (HONORIFICS.contains(cleaned.as_str()) || cleaned.chars().count() == 1) {
        return false;
    }
    word.ends_with(['.', ',', ';', ':', '!', '?', ')'])
}

/// End (exclusive) of the capitalized run starting at `start`, if any
fn span_end(words: &[&str], start: usize) -> Option<usize> {
    if !is_capitalized(words[start]) {
        return None;
    }
    let mut end = start;
    while end < words.len() && is_capitalized(words[end]) {
        end += 1;
        if breaks_span(words[end - 1]) {
            break;
        }
    }
    Some(end)
}

fn is_acronym(word: &str) -> bool {
    let len = word.chars().count();
    (2..=6).contains(&len)
        && word.chars().all(|c| c.is_ascii_uppercase() || c == '&')
        && word.chars().any(|c| c.is_ascii_alphabetic())
}

/// Classify the run `words[start..end]`
fn classify(words: &[&str], start: usize, end: usize) -> Option<(SpanKind, String)> {
    let mut parts: Vec<&str> = words[start..end].iter().map(|w| clean_word(w)).collect();
    let mut prev = start.checked_sub(1).map(|p| clean_word(words[p]).to_lowercase());

    // "Dr. Jane Smith": honorific inside the run
    let mut honorific = prev.as_deref().is_some_and(|p| HONORIFICS.contains(p));
    if parts.len() > 1 && HONORIFICS.contains(parts[0].to_lowercase().as_str()) {
        honorific = true;
        parts.remove(0);
    }

    // Drop leading sentence starters like "The" or "This"
    while parts
        .first()
        .is_some_and(|p| SPAN_STOPWORDS.contains(p.to_lowercase().as_str()))
    {
        prev = Some(parts.remove(0).to_lowercase());
    }
    if parts.is_empty() {
        return None;
    }

    let name = parts.join(" ");
    let lower = name.to_lowercase();
    let last = parts[parts.len() - 1].to_lowercase();

    if parts.len() > 1 && ORG_SUFFIXES.contains(last.as_str()) {
        return Some((SpanKind::Organization, name));
    }
    if parts.len() == 1 && is_acronym(parts[0]) {
        return Some((SpanKind::Organization, name));
    }
    if GAZETTEER.contains(lower.as_str())
        || prev
            .as_deref()
            .is_some_and(|p| LOCATIVE_PREPOSITIONS.contains(p))
    {
        return Some((SpanKind::Place, name));
    }
    if honorific || (2..=3).contains(&parts.len()) {
        return Some((SpanKind::Person, name));
    }

    // A lone capitalized word is too weak to classify
    None
}

/// Top lowercase content words outside entity spans
fn concepts(words: &[&str], in_entity: &[bool]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for (word, &inside) in words.iter().zip(in_entity) {
        if inside {
            continue;
        }
        let cleaned = clean_word(word);
        if cleaned.chars().count() <= 3
            || !cleaned.chars().all(|c| c.is_alphabetic() && c.is_lowercase())
            || is_stopword(cleaned)
        {
            continue;
        }
        *counts.entry(cleaned.to_string()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(MAX_CONCEPTS);
    ranked.into_iter().map(|(word, _)| word).collect()
}
