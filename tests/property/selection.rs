//! Top-K selection against a full sort.
//!
//! The selector stops scanning early; the oracle never does. If pruning ever
//! drops a document that belongs on the page, these disagree.

use std::collections::HashMap;

use chrono::Duration;
use proptest::prelude::*;

use super::common::{factors, fixed_time, make_doc_full, oracle_top_k, FixedRelevance};
use pkgrank::{
    select_top_k, PopularityScan, RelevanceMatch, SearchDocument, SelectRequest, NOISE_FLOOR,
};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Popularity skewed the way real reference counts are: mostly tiny, a few huge.
/// Small values repeat a lot, which exercises the tie-breaks.
fn popularity_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        6 => 0u64..4,
        3 => 0u64..1_000,
        1 => 0u64..10_000_000,
    ]
}

fn relevance_strategy() -> impl Strategy<Value = RelevanceMatch> {
    prop_oneof![
        1 => Just(RelevanceMatch::NONE),
        1 => Just(RelevanceMatch { rank: 1.0, matched: true }),
        // Rank present but no match: must annihilate
        1 => (0.0f64..=1.0).prop_map(|rank| RelevanceMatch { rank, matched: false }),
        3 => (0.0f64..=1.0).prop_map(|rank| RelevanceMatch { rank, matched: true }),
    ]
}

#[derive(Debug, Clone)]
struct Case {
    docs: Vec<SearchDocument>,
    relevance: FixedRelevance,
}

fn case_strategy() -> impl Strategy<Value = Case> {
    prop::collection::vec(
        (
            popularity_strategy(),
            relevance_strategy(),
            any::<bool>(),
            any::<bool>(),
            0i64..3,
        ),
        0..60,
    )
    .prop_map(|rows| {
        let mut docs = Vec::with_capacity(rows.len());
        let mut relevance = HashMap::new();
        for (i, (popularity, rel, redist, manifest, age)) in rows.into_iter().enumerate() {
            let doc = make_doc_full(
                &format!("example.com/p{}", i),
                "",
                popularity,
                redist,
                manifest,
                fixed_time() - Duration::days(age),
            );
            relevance.insert(doc.id().clone(), rel);
            docs.push(doc);
        }
        Case {
            docs,
            relevance: FixedRelevance(relevance),
        }
    })
}

fn factor_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(1.0), Just(0.5), 0.01f64..=1.0]
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    /// Property: selection equals the full sort, paged and filtered.
    #[test]
    fn prop_select_matches_full_sort(
        case in case_strategy(),
        limit in 0usize..15,
        offset in 0usize..20,
        redist in factor_strategy(),
        manifest in factor_strategy(),
    ) {
        let request = SelectRequest::new(limit, offset).with_factors(factors(redist, manifest));
        let selection = select_top_k(
            case.docs.scan_by_popularity(),
            |doc| case.relevance.get(doc),
            &request,
            None,
        ).unwrap();
        let expected = oracle_top_k(&case.docs, |doc| case.relevance.get(doc), &request);

        prop_assert_eq!(selection.results, expected);
    }

    /// Property: an exhausted scan counts exactly the matching documents,
    /// whatever the penalties did to their scores.
    #[test]
    fn prop_exhausted_scan_counts_every_match(
        case in case_strategy(),
        limit in 1usize..15,
        offset in 0usize..80,
        redist in factor_strategy(),
    ) {
        let request = SelectRequest::new(limit, offset).with_factors(factors(redist, 1.0));
        let selection = select_top_k(
            case.docs.scan_by_popularity(),
            |doc| case.relevance.get(doc),
            &request,
            None,
        ).unwrap();

        prop_assert_eq!(selection.stats.exhausted, !selection.stats.pruned);
        if selection.stats.exhausted {
            let expected = case.docs.iter().filter(|doc| case.relevance.get(doc).matched).count();
            prop_assert_eq!(selection.stats.scanned, case.docs.len());
            prop_assert_eq!(selection.stats.matched, expected);
        }
    }

    /// Property: every document the scan skipped scores below the page's last kept entry.
    #[test]
    fn prop_pruning_never_drops_true_top_k(case in case_strategy(), limit in 1usize..10) {
        let request = SelectRequest::new(limit, 0);
        let selection = select_top_k(
            case.docs.scan_by_popularity(),
            |doc| case.relevance.get(doc),
            &request,
            None,
        ).unwrap();

        prop_assert!(selection.stats.scanned <= case.docs.len());
        if selection.stats.pruned {
            // A pruned scan had a full buffer whose worst entry beat the next
            // candidate's ln, and every ln is at least 1, above the floor.
            prop_assert_eq!(selection.results.len(), limit);
            let worst = selection.results[limit - 1].score;
            for doc in case.docs.scan_by_popularity().skip(selection.stats.scanned) {
                prop_assert!(
                    doc.ln_popularity() < worst,
                    "{} could score {} but the page ends at {}",
                    doc.id(), doc.ln_popularity(), worst
                );
            }
        }
    }

    /// Property: results are strictly ordered and above the noise floor.
    #[test]
    fn prop_results_ordered_above_floor(case in case_strategy(), limit in 0usize..30) {
        let request = SelectRequest::new(limit, 0);
        let results = select_top_k(
            case.docs.scan_by_popularity(),
            |doc| case.relevance.get(doc),
            &request,
            None,
        ).unwrap().results;

        prop_assert!(results.len() <= limit);
        for pair in results.windows(2) {
            prop_assert!(pkgrank::compare_ranked(&pair[0], &pair[1]).is_lt());
        }
        for r in &results {
            prop_assert!(r.score > NOISE_FLOOR);
            let doc = case.docs.iter().find(|d| d.id() == &r.id).unwrap();
            prop_assert!(r.score <= doc.ln_popularity());
        }
    }

    /// Property: pages tile. Page k of size n is slice [k*n, (k+1)*n) of one big page.
    #[test]
    fn prop_pages_tile(case in case_strategy(), page in 1usize..6) {
        let relevance = |doc: &SearchDocument| case.relevance.get(doc);
        let whole = select_top_k(case.docs.scan_by_popularity(), relevance, &SelectRequest::new(page * 4, 0), None)
            .unwrap()
            .results;

        let mut tiled = Vec::new();
        for k in 0..4 {
            let part = select_top_k(
                case.docs.scan_by_popularity(),
                relevance,
                &SelectRequest::new(page, k * page),
                None,
            ).unwrap().results;
            tiled.extend(part);
        }
        prop_assert_eq!(tiled, whole);
    }
}
