//! # Text Processing Utilities
//!
//! Fuzzy string matching used by autocomplete prompts.

/// Fuzzy matcher for subsequence scoring, handling space-separated tokens.
///
/// Returns `Some(score)` if all characters in each space-separated token of `needle`
/// appear in order within `hay`, otherwise returns `None`. Higher scores indicate better
/// matches. The scoring favors consecutive matches, word boundary matches, prefix matches,
/// and shorter candidates.
///
/// # Example
/// ```rust
/// use taas_util::text_processing::fuzzy_score;
///
/// assert!(fuzzy_score("portal-qa", "port").unwrap() > 0);
/// assert!(fuzzy_score("portal-qa", "pqa").is_some());
/// assert!(fuzzy_score("portal-qa", "zzz").is_none());
/// assert_eq!(fuzzy_score("portal-qa", ""), Some(0));
/// ```
pub fn fuzzy_score(hay: &str, needle: &str) -> Option<i64> {
    if hay.is_empty() && !needle.is_empty() {
        return None;
    }
    if needle.trim().is_empty() {
        return Some(0);
    }

    let hay_data = prepare_haystack(hay);
    let needle_tokens = prepare_needle_tokens(needle);
    if needle_tokens.is_empty() {
        return Some(0);
    }

    let total_score = score_all_tokens(&hay_data, &needle_tokens)?;

    // Penalty for hay length (shorter candidates preferred)
    Some(total_score - hay_data.chars.len() as i64 / 8)
}

/// Filter `candidates` by `query`, best matches first.
///
/// An empty query keeps every candidate in its original order. Ties keep
/// their original relative order.
///
/// # Example
/// ```rust
/// use taas_util::text_processing::fuzzy_filter;
///
/// let apps = vec!["portal-qa".to_string(), "billing-prod".to_string(), "portal-prod".to_string()];
/// assert_eq!(fuzzy_filter("prod", &apps), vec!["billing-prod", "portal-prod"]);
/// assert_eq!(fuzzy_filter("", &apps).len(), 3);
/// ```
pub fn fuzzy_filter(query: &str, candidates: &[String]) -> Vec<String> {
    let mut scored: Vec<(i64, usize, &String)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| fuzzy_score(candidate, query).map(|score| (score, index, candidate)))
        .collect();
    if !query.trim().is_empty() {
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    }
    scored.into_iter().map(|(_, _, candidate)| candidate.clone()).collect()
}

struct HaystackData {
    lower: String,
    chars: Vec<char>,
}

fn prepare_haystack(hay: &str) -> HaystackData {
    let lower: String = hay.chars().flat_map(|c| c.to_lowercase()).collect();
    let chars: Vec<char> = lower.chars().collect();

    HaystackData { lower, chars }
}

fn prepare_needle_tokens(needle: &str) -> Vec<Vec<char>> {
    needle
        .split_whitespace()
        .map(|token| token.chars().flat_map(|c| c.to_lowercase()).collect())
        .filter(|token: &Vec<char>| !token.is_empty())
        .collect()
}

/// Scores every needle token in order; `None` if any token fails to match.
fn score_all_tokens(hay_data: &HaystackData, needle_tokens: &[Vec<char>]) -> Option<i64> {
    let mut total_score = 0;
    let mut hay_index = 0;

    for token in needle_tokens {
        total_score += score_single_token(hay_data, token, &mut hay_index)?;
    }

    Some(total_score)
}

/// Scores a single token starting at `hay_index`, advancing it past the match.
fn score_single_token(hay_data: &HaystackData, token: &[char], hay_index: &mut usize) -> Option<i64> {
    let mut token_score = 0;
    let mut consecutive = 0;
    let mut first_match_index = None;
    let mut previous_index = None;

    for &needle_character in token {
        let (relative_index, _) = hay_data.chars[*hay_index..]
            .iter()
            .enumerate()
            .find(|(_, character)| **character == needle_character)?;
        let absolute_index = *hay_index + relative_index;

        if first_match_index.is_none() {
            first_match_index = Some(absolute_index);
        }

        token_score += score_character_match(absolute_index, previous_index, &mut consecutive, hay_data);

        *hay_index = absolute_index + 1;
        previous_index = Some(absolute_index);
    }

    token_score += calculate_token_bonuses(hay_data, token, first_match_index);

    Some(token_score)
}

fn score_character_match(absolute_index: usize, previous_index: Option<usize>, consecutive: &mut i64, hay_data: &HaystackData) -> i64 {
    let mut score = 0;

    if let Some(previous) = previous_index {
        if absolute_index == previous + 1 {
            *consecutive += 1;
        } else {
            *consecutive = 1;
        }

        // Penalize gaps
        let gap = (absolute_index - previous - 1) as i64;
        score -= gap / 2;
    }

    score += 6 * *consecutive;

    if is_word_boundary(absolute_index, hay_data) {
        score += 10;
    }

    score
}

/// Start of the string, or right after whitespace or punctuation.
fn is_word_boundary(index: usize, hay_data: &HaystackData) -> bool {
    index == 0
        || hay_data
            .chars
            .get(index - 1)
            .is_some_and(|character| character.is_whitespace() || character.is_ascii_punctuation())
}

fn calculate_token_bonuses(hay_data: &HaystackData, token: &[char], first_match_index: Option<usize>) -> i64 {
    let mut bonus = 0;

    let token_string: String = token.iter().copied().collect();
    if hay_data.lower.starts_with(&token_string) {
        bonus += 30;
    }

    if let Some(start) = first_match_index {
        bonus += i64::max(0, 20 - start as i64);
    }

    bonus
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn prefix_matches_rank_first() {
        let apps = names(&["api-portal", "portal-qa", "reporting"]);
        let ranked = fuzzy_filter("portal", &apps);
        assert_eq!(ranked.first().map(String::as_str), Some("portal-qa"));
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn matching_is_case_insensitive_subsequence() {
        assert!(fuzzy_score("Billing-Prod", "bprod").is_some());
        assert!(fuzzy_score("billing", "gb").is_none());
    }

    #[test]
    fn multiple_tokens_must_appear_in_order() {
        assert!(fuzzy_score("ui-tests-taas", "ui taas").is_some());
        assert!(fuzzy_score("ui-tests-taas", "taas ui").is_none());
    }

    #[test]
    fn no_candidates_match() {
        assert!(fuzzy_filter("xyz", &names(&["alpha", "beta"])).is_empty());
    }
}
