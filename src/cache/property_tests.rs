//! Property-Based Tests for the cache tiers
//!
//! Uses proptest to check the caching contract over generated workloads.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use crate::cache::{L2Cache, Namespace, QuerySignature};
use crate::config::Config;
use crate::datasource::{InMemoryDataSource, Mutation};
use crate::mapper::{statements, STUDENT_NAMESPACE};
use crate::models::Student;
use crate::session::SessionFactory;

// == Test Configuration ==
const MAX_ID: i64 = 20;

// == Helpers ==
fn seeded_store() -> Arc<InMemoryDataSource> {
    let store = InMemoryDataSource::new();
    for id in 1..=MAX_ID {
        store.insert_student(Student {
            id,
            name: format!("student_{}", id),
            age: 18,
            class_id: None,
        });
    }
    Arc::new(store)
}

fn factory(store: &Arc<InMemoryDataSource>) -> SessionFactory {
    SessionFactory::from_config(Config::default(), store.clone()).unwrap()
}

fn by_id(id: i64) -> QuerySignature {
    QuerySignature::new(STUDENT_NAMESPACE, statements::GET_STUDENT_BY_ID, "SELECT").param(id)
}

fn rename(id: i64, name: &str) -> Mutation {
    Mutation::new(STUDENT_NAMESPACE, statements::UPDATE_STUDENT_NAME, "UPDATE")
        .param(name)
        .param(id)
}

// == Strategies ==
fn id_strategy() -> impl Strategy<Value = i64> {
    1..=MAX_ID
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Repeated reads inside one session reach the data source once per
    // distinct signature and always return the first value seen.
    #[test]
    fn prop_repeated_reads_hit_l1(ids in prop::collection::vec(id_strategy(), 1..40)) {
        let store = seeded_store();
        let factory = factory(&store);
        let mut session = factory.open_session(true);

        let distinct: HashSet<i64> = ids.iter().copied().collect();
        tokio_test::block_on(async {
            for id in &ids {
                let row = session.query(&by_id(*id)).await.unwrap();
                assert_eq!(row["id"], json!(id));
            }
        });

        prop_assert_eq!(store.query_count(), distinct.len() as u64);
    }

    // Reads promoted by a clean close are served to later sessions from L2.
    #[test]
    fn prop_closed_reads_are_shared(ids in prop::collection::vec(id_strategy(), 1..20)) {
        let store = seeded_store();
        let factory = factory(&store);

        let mut first = factory.open_session(true);
        tokio_test::block_on(async {
            for id in &ids {
                first.query(&by_id(*id)).await.unwrap();
            }
        });
        let outcome = first.close().unwrap();
        let loaded = store.query_count();
        prop_assert_eq!(outcome.promoted as u64, loaded);
        prop_assert_eq!(outcome.invalidated, 0);

        let mut second = factory.open_session(true);
        tokio_test::block_on(async {
            for id in &ids {
                second.query(&by_id(*id)).await.unwrap();
            }
        });
        prop_assert_eq!(store.query_count(), loaded);
    }

    // A commit by another session between a read and its flush always wins:
    // nothing the reader staged becomes visible.
    #[test]
    fn prop_invalidation_precedes_pending_flush(
        ids in prop::collection::vec(id_strategy(), 1..20),
        target in id_strategy(),
        name in name_strategy()
    ) {
        let store = seeded_store();
        let factory = factory(&store);
        let cache = factory.cache_manager().resolve(&Namespace::from(STUDENT_NAMESPACE));

        let mut reader = factory.open_session(false);
        let mut writer = factory.open_session(false);
        tokio_test::block_on(async {
            for id in &ids {
                reader.query(&by_id(*id)).await.unwrap();
            }
            writer.mutate(&rename(target, &name)).await.unwrap();
        });
        writer.commit().unwrap();

        let outcome = reader.close().unwrap();
        prop_assert_eq!(outcome.promoted, 0);
        prop_assert!(cache.is_empty());
    }

    // After a mutation the same session reads its own write.
    #[test]
    fn prop_read_your_writes(
        ops in prop::collection::vec((id_strategy(), name_strategy()), 1..15),
        autocommit in any::<bool>()
    ) {
        let store = seeded_store();
        let factory = factory(&store);
        let mut session = factory.open_session(autocommit);

        tokio_test::block_on(async {
            for (id, name) in &ops {
                session.query(&by_id(*id)).await.unwrap();
                session.mutate(&rename(*id, name)).await.unwrap();
                let row = session.query(&by_id(*id)).await.unwrap();
                assert_eq!(row["name"], json!(name));
            }
        });
        prop_assert!(session.close().is_ok());
    }

    // An L2 cache never holds more entries than its capacity.
    #[test]
    fn prop_l2_capacity_enforced(
        batches in prop::collection::vec(prop::collection::vec(0i64..200, 1..30), 1..10)
    ) {
        let max_entries = 25;
        let cache = L2Cache::new(Namespace::from(STUDENT_NAMESPACE), max_entries);

        for batch in batches {
            let staged = batch
                .into_iter()
                .map(|id| cache.stage(by_id(id), json!(id)))
                .collect();
            cache.flush(staged);
            prop_assert!(
                cache.len() <= max_entries,
                "Cache size {} exceeds max {}",
                cache.len(),
                max_entries
            );
        }
    }
}
