// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::cmp::Ordering;
use std::collections::HashSet;

use tanaste_core::entity::EntityUid;
use tanaste_core_api::config::ScoringConfig;
use unicode_normalization::UnicodeNormalization;

const STOP_WORDS: &[&str] =
    &["a", "an", "the", "of", "and", "or", "in", "on", "at", "to", "for", "by", "with"];

/// The normalised-title-plus-primary-author identity an incoming Work and
/// each candidate Hub are compared on (`spec.md` §4.I).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateIdentity {
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubCandidate {
    pub hub_id: EntityUid,
    pub identity: CandidateIdentity,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinkageDecision {
    AutoLink(EntityUid),
    NeedsReview { best_hub_id: EntityUid, score: f64 },
    CreateNewHub,
}

fn tokenize(text: &str) -> HashSet<String> {
    text.nfc()
        .collect::<String>()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty() && !STOP_WORDS.contains(token))
        .map(str::to_owned)
        .collect()
}

fn token_set_jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// ±1 year = 1.0, ±3 years = 0.7, else 0.4. An unknown year on either side
/// is treated as neutral (1.0): absence of data should not itself count
/// against a candidate.
fn year_proximity_factor(work_year: Option<i32>, hub_year: Option<i32>) -> f64 {
    match (work_year, hub_year) {
        (Some(work_year), Some(hub_year)) => match (work_year - hub_year).abs() {
            0..=1 => 1.0,
            2..=3 => 0.7,
            _ => 0.4,
        },
        _ => 1.0,
    }
}

/// Similarity in `[0, 1]` between a Work's canonical identity and a
/// candidate Hub's identity: token-set Jaccard over title + primary
/// author, scaled by year proximity.
#[must_use]
pub fn similarity(work: &CandidateIdentity, hub: &CandidateIdentity) -> f64 {
    let work_text = format!("{} {}", work.title, work.author.as_deref().unwrap_or(""));
    let hub_text = format!("{} {}", hub.title, hub.author.as_deref().unwrap_or(""));
    let jaccard = token_set_jaccard(&tokenize(&work_text), &tokenize(&hub_text));
    jaccard * year_proximity_factor(work.year, hub.year)
}

/// Decides hub linkage for a newly scored Work, per `spec.md` §4.I. No
/// Work is ever auto-linked to a Hub scoring below `auto_link_threshold`
/// (the Hub integrity invariant).
#[must_use]
pub fn decide_linkage(work: &CandidateIdentity, candidates: &[HubCandidate], config: &ScoringConfig) -> LinkageDecision {
    let best = candidates
        .iter()
        .map(|candidate| (candidate, similarity(work, &candidate.identity)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    match best {
        None => LinkageDecision::CreateNewHub,
        Some((candidate, score)) if score >= config.auto_link_threshold => LinkageDecision::AutoLink(candidate.hub_id),
        Some((candidate, score)) if score >= config.conflict_threshold => {
            LinkageDecision::NeedsReview { best_hub_id: candidate.hub_id, score }
        }
        Some(_) => LinkageDecision::CreateNewHub,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(title: &str, author: Option<&str>, year: Option<i32>) -> CandidateIdentity {
        CandidateIdentity { title: title.to_owned(), author: author.map(str::to_owned), year }
    }

    #[test]
    fn identical_titles_and_authors_score_one() {
        let work = identity("The Hobbit", Some("J. R. R. Tolkien"), Some(1937));
        let hub = identity("The Hobbit", Some("J. R. R. Tolkien"), Some(1937));
        assert!((similarity(&work, &hub) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrelated_titles_score_near_zero() {
        let work = identity("Dune", Some("Frank Herbert"), None);
        let hub = identity("The Hobbit", Some("J. R. R. Tolkien"), None);
        assert_eq!(similarity(&work, &hub), 0.0);
    }

    #[test]
    fn distant_years_reduce_an_otherwise_perfect_match() {
        let work = identity("Dune", Some("Frank Herbert"), Some(1965));
        let hub_far = identity("Dune", Some("Frank Herbert"), Some(2010));
        let hub_near = identity("Dune", Some("Frank Herbert"), Some(1965));
        assert!(similarity(&work, &hub_far) < similarity(&work, &hub_near));
    }

    #[test]
    fn never_auto_links_below_the_threshold() {
        let work = identity("Dune", Some("Frank Herbert"), Some(1965));
        let candidates =
            vec![HubCandidate { hub_id: EntityUid::new(), identity: identity("Unrelated", None, None) }];
        let decision = decide_linkage(&work, &candidates, &ScoringConfig::default());
        assert!(matches!(decision, LinkageDecision::CreateNewHub));
    }

    #[test]
    fn links_automatically_above_the_auto_link_threshold() {
        let work = identity("Dune", Some("Frank Herbert"), Some(1965));
        let hub_id = EntityUid::new();
        let candidates = vec![HubCandidate { hub_id, identity: identity("Dune", Some("Frank Herbert"), Some(1965)) }];
        let decision = decide_linkage(&work, &candidates, &ScoringConfig::default());
        assert_eq!(decision, LinkageDecision::AutoLink(hub_id));
    }

    #[test]
    fn falls_to_needs_review_in_the_conflict_band() {
        let work = identity("Dune Messiah", Some("Frank Herbert"), Some(1965));
        let hub_id = EntityUid::new();
        let candidates = vec![HubCandidate { hub_id, identity: identity("Dune", Some("Frank Herbert"), Some(1965)) }];
        let decision = decide_linkage(&work, &candidates, &ScoringConfig::default());
        assert!(matches!(decision, LinkageDecision::NeedsReview { .. }));
    }

    #[test]
    fn no_candidates_creates_a_new_hub() {
        let work = identity("Dune", Some("Frank Herbert"), Some(1965));
        let decision = decide_linkage(&work, &[], &ScoringConfig::default());
        assert!(matches!(decision, LinkageDecision::CreateNewHub));
    }
}
