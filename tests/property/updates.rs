//! Store consistency under random interleavings of upserts, popularity
//! updates and takedowns.

use chrono::Duration;
use proptest::prelude::*;

use super::common::{doc_id, fixed_time, request};
use pkgrank::{
    DocumentStore, PopularityScan, Precision, RegisterLookup, SearchDocument, UpdateOutcome,
};

#[derive(Debug, Clone)]
enum Op {
    Upsert { doc: usize, popularity: u64, age: i64 },
    Popularity { doc: usize, count: u64, minute: i64 },
    Remove { doc: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..12, 0u64..100, 0i64..3)
            .prop_map(|(doc, popularity, age)| Op::Upsert { doc, popularity, age }),
        4 => (0usize..12, 0u64..10_000, 0i64..20)
            .prop_map(|(doc, count, minute)| Op::Popularity { doc, count, minute }),
        1 => (0usize..12).prop_map(|doc| Op::Remove { doc }),
    ]
}

fn id_for(doc: usize) -> String {
    format!("example.com/pkg{}", doc)
}

fn apply(store: &DocumentStore, op: &Op) {
    match *op {
        Op::Upsert { doc, popularity, age } => {
            let mut req = request(&id_for(doc), "pkg", popularity);
            req.commit_time = fixed_time() - Duration::days(age);
            req.symbols = vec!["A".into(), "B".into()];
            store.upsert(req).unwrap();
        }
        Op::Popularity { doc, count, minute } => {
            store.on_reference_graph_change_at(
                &doc_id(&id_for(doc)),
                count,
                fixed_time() + Duration::minutes(minute),
            );
        }
        Op::Remove { doc } => {
            store.remove(&doc_id(&id_for(doc)));
        }
    }
}

proptest! {
    /// Property: after any sequence of writes, both indexes agree with the documents.
    #[test]
    fn prop_indexes_consistent(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let store = DocumentStore::default();
        for op in &ops {
            apply(&store, op);
        }
        let snapshot = store.snapshot();

        // Popularity scan: every live doc once, non-increasing counts
        let scanned: Vec<&SearchDocument> = snapshot.scan_by_popularity().collect();
        prop_assert_eq!(scanned.len(), snapshot.len());
        for pair in scanned.windows(2) {
            prop_assert!(pair[0].popularity().count() >= pair[1].popularity().count());
        }

        // Register index: same maxima as brute force
        let docs: Vec<SearchDocument> = snapshot.documents().cloned().collect();
        let predicate = |doc: &SearchDocument| doc.popularity().count() % 3 != 0;
        prop_assert_eq!(
            snapshot.register_maxima(Precision::default(), &predicate),
            docs.register_maxima(Precision::default(), &predicate)
        );

        // Symbols follow the package
        for doc in &docs {
            for symbol in snapshot.symbols(doc.id()) {
                prop_assert_eq!(symbol.popularity(), doc.popularity());
            }
            let ln = doc.ln_popularity();
            prop_assert!((ln - pkgrank::ln_popularity(doc.popularity().count())).abs() < 1e-12);
        }
    }

    /// Property: applying the same popularity update twice changes nothing the second time.
    #[test]
    fn prop_popularity_update_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..40),
        doc in 0usize..12,
        count in 0u64..1_000_000,
    ) {
        let store = DocumentStore::default();
        for op in &ops {
            apply(&store, op);
        }
        let id = doc_id(&id_for(doc));
        let at = fixed_time() + Duration::hours(1);

        let first = store.on_reference_graph_change_at(&id, count, at);
        let after_first = store.snapshot();
        let second = store.on_reference_graph_change_at(&id, count, at);
        let after_second = store.snapshot();

        prop_assert_eq!(first, second);
        prop_assert_eq!(after_first.get(&id), after_second.get(&id));
        prop_assert_eq!(after_first.symbols(&id), after_second.symbols(&id));
        if first == UpdateOutcome::Applied {
            prop_assert_eq!(after_second.get(&id).unwrap().popularity().count(), count);
        }
    }

    /// Property: a document's slot never changes, whatever happens to it.
    #[test]
    fn prop_slot_stable_across_writes(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let store = DocumentStore::default();
        for op in &ops {
            apply(&store, op);
        }
        let snapshot = store.snapshot();
        for doc in snapshot.documents() {
            prop_assert_eq!(doc.slot(), pkgrank::assign(doc.id(), Precision::default()));
            prop_assert_eq!(snapshot.identity(doc.id()).map(|i| i.slot()), Some(doc.slot()));
        }
    }
}
