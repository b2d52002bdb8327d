// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Fuzzy name search over the tree projection.

use crate::model::SelectionKey;

use super::TreeProjection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub key: SelectionKey,
    pub score: i64,
}

/// Nodes whose name fuzzily matches `query`, best first. Ties keep tree order.
///
/// Matching is case-insensitive. Grouping nodes (ApiDef categories, device roots) are never
/// returned.
pub fn search_tree(tree: &TreeProjection, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = std::collections::HashSet::new();
    let mut hits = tree
        .nodes()
        .into_iter()
        .filter(|node| node.key.entity_type.is_stored())
        .filter(|node| seen.insert(node.key))
        .enumerate()
        .filter_map(|(order, node)| {
            let score = fuzzy_score(&needle, &node.name.to_lowercase())?;
            Some((score, order, node.key))
        })
        .collect::<Vec<_>>();
    hits.sort_by(|(score_a, order_a, _), (score_b, order_b, _)| {
        score_b.cmp(score_a).then_with(|| order_a.cmp(order_b))
    });
    hits.into_iter()
        .map(|(score, _, key)| SearchHit { key, score })
        .collect()
}

/// Scores `haystack` against `needle`. `None` unless the needle is a subsequence.
pub fn fuzzy_score(needle: &str, haystack: &str) -> Option<i64> {
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }

    let subseq = subsequence_stats(needle, haystack)?;
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());
    let mut score = (ratio * 1000.0).round() as i64;
    score -= subseq.span as i64;
    score -= (subseq.first as i64) / 4;
    score += (subseq.consecutive as i64) * 40;
    if subseq.start_boundary {
        score += 150;
    }
    if haystack.contains(needle) {
        score += 2000;
    }
    if haystack == needle {
        score += 5000;
    }
    Some(score)
}

#[derive(Debug, Clone, Copy)]
struct SubsequenceStats {
    first: usize,
    span: usize,
    consecutive: usize,
    start_boundary: bool,
}

fn subsequence_stats(needle: &str, haystack: &str) -> Option<SubsequenceStats> {
    let mut wanted = needle.chars().peekable();
    let mut first = None;
    let mut last = 0usize;
    let mut prev_match: Option<usize> = None;
    let mut consecutive = 0usize;
    let mut start_boundary = false;
    let mut prev_char: Option<char> = None;

    for (idx, ch) in haystack.chars().enumerate() {
        let Some(&want) = wanted.peek() else {
            break;
        };
        if ch == want {
            wanted.next();
            if first.is_none() {
                first = Some(idx);
                start_boundary = prev_char.map_or(true, is_word_boundary);
            }
            if prev_match.is_some_and(|prev| idx == prev + 1) {
                consecutive += 1;
            }
            prev_match = Some(idx);
            last = idx;
        }
        prev_char = Some(ch);
    }

    if wanted.peek().is_some() {
        return None;
    }
    let first = first?;
    Some(SubsequenceStats {
        first,
        span: last.saturating_sub(first) + 1,
        consecutive,
        start_boundary,
    })
}

fn is_word_boundary(ch: char) -> bool {
    matches!(ch, ' ' | '_' | '-' | '.' | '/')
}
