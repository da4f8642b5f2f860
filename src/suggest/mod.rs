//! Query suggestion engine
//!
//! Pure functions, no network access: partial query text plus a static
//! phrase corpus yield a ranked list of completions. Heuristic
//! templated suggestions rank first, then fuzzy corpus matches, then
//! plain substring matches.

use std::cmp::Ordering;
use strsim::normalized_levenshtein;

/// Maximum suggestions returned
pub const MAX_SUGGESTIONS: usize = 6;

/// Minimum normalized similarity for a fuzzy corpus match
const FUZZY_THRESHOLD: f64 = 0.6;

/// Phrase corpus for fuzzy and substring matching
const POPULAR_SEARCHES: &[&str] = &[
    "Marvel movies",
    "Netflix originals",
    "Tom Hanks movies",
    "Sci-fi from the 90s",
    "Oscar winners",
    "Action movies",
    "Comedy shows",
    "Documentaries",
];

/// Keywords that mark a query as genre-shaped
const GENRE_KEYWORDS: &[&str] = &[
    "action",
    "adventure",
    "animation",
    "comedy",
    "crime",
    "documentary",
    "drama",
    "family",
    "fantasy",
    "horror",
    "mystery",
    "romance",
    "sci-fi",
    "science fiction",
    "thriller",
    "war",
    "western",
];

/// Keywords that mark a query as decade-shaped
const DECADE_KEYWORDS: &[&str] = &[
    "80s", "90s", "2000s", "2010s", "2020s", "1980s", "1990s", "eighties", "nineties",
];

/// Generate ranked suggestions for a partial query
pub fn suggest(partial_query: &str) -> Vec<String> {
    suggest_with_limit(partial_query, MAX_SUGGESTIONS)
}

/// Generate ranked suggestions with an explicit cap
pub fn suggest_with_limit(partial_query: &str, limit: usize) -> Vec<String> {
    let query = partial_query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }
    let lower = query.to_lowercase();

    let mut suggestions: Vec<String> = Vec::new();

    // (a) keyword heuristics
    if GENRE_KEYWORDS.iter().any(|genre| lower.contains(genre)) {
        push_unique(&mut suggestions, format!("Best {} movies", query));
        push_unique(&mut suggestions, format!("Top rated {}", query));
    }
    if DECADE_KEYWORDS.iter().any(|decade| lower.contains(decade)) {
        push_unique(&mut suggestions, format!("Movies from the {}", query));
        push_unique(&mut suggestions, format!("Best of {}", query));
    }
    if lower.contains("like") {
        let subject = strip_like(query);
        if !subject.is_empty() {
            push_unique(&mut suggestions, format!("Movies similar to {}", subject));
            push_unique(&mut suggestions, format!("If you liked {}", subject));
        }
    }

    // (b) fuzzy corpus matches, best score first; stable sort keeps
    // corpus order on ties
    let mut scored: Vec<(f64, &str)> = POPULAR_SEARCHES
        .iter()
        .filter_map(|phrase| {
            let score = fuzzy_score(&lower, phrase);
            (score >= FUZZY_THRESHOLD).then_some((score, *phrase))
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    for (_, phrase) in scored {
        push_unique(&mut suggestions, phrase.to_string());
    }

    // (c) plain substring matches
    for phrase in POPULAR_SEARCHES {
        if phrase.to_lowercase().contains(&lower) {
            push_unique(&mut suggestions, phrase.to_string());
        }
    }

    suggestions.truncate(limit);
    suggestions
}

/// Best similarity between the query and a corpus phrase, considering
/// the whole phrase and each of its words
fn fuzzy_score(lower_query: &str, phrase: &str) -> f64 {
    let lower_phrase = phrase.to_lowercase();
    let mut best = normalized_levenshtein(lower_query, &lower_phrase);
    for word in lower_phrase.split_whitespace() {
        best = best.max(normalized_levenshtein(lower_query, word));
    }
    best
}

/// Remove the first case-insensitive "like" and the whitespace that
/// follows it
fn strip_like(query: &str) -> String {
    let lower = query.to_ascii_lowercase();
    let Some(start) = lower.find("like") else {
        return query.trim().to_string();
    };

    let mut end = start + "like".len();
    end += query[end..].len() - query[end..].trim_start().len();

    let mut stripped = String::with_capacity(query.len());
    stripped.push_str(&query[..start]);
    stripped.push_str(&query[end..]);
    stripped.trim().to_string()
}

fn push_unique(suggestions: &mut Vec<String>, candidate: String) {
    if !suggestions.contains(&candidate) {
        suggestions.push(candidate);
    }
}
