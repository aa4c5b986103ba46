//! Scenario Tests for first-level and second-level caching
//!
//! Each test drives the student/class mappers through several sessions and
//! checks which reads reached the data source.

use std::sync::Arc;

use querycache::mapper::{ClassMapper, StudentMapper, CLASS_NAMESPACE, STUDENT_NAMESPACE};
use querycache::models::NewStudent;
use querycache::{Config, InMemoryDataSource, LocalCacheScope, Namespace, SessionFactory};

// == Helper Functions ==

fn setup(config: Config) -> (SessionFactory, Arc<InMemoryDataSource>) {
    let store = Arc::new(InMemoryDataSource::seeded());
    let factory = SessionFactory::from_config(config, store.clone()).unwrap();
    (factory, store)
}

fn with_cache_ref() -> Config {
    Config {
        cache_refs: vec![(
            Namespace::from(CLASS_NAMESPACE),
            Namespace::from(STUDENT_NAMESPACE),
        )],
        ..Config::default()
    }
}

// == First-Level Cache ==

#[tokio::test]
async fn test_local_cache() {
    let (factory, store) = setup(Config::default());
    let mut session = factory.open_session(true);
    let mut mapper = StudentMapper::new(&mut session);

    let first = mapper.get_student_by_id(1).await.unwrap();
    let second = mapper.get_student_by_id(1).await.unwrap();
    let third = mapper.get_student_by_id(1).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(store.query_count(), 1);
    session.close().unwrap();
}

#[tokio::test]
async fn test_local_cache_clear() {
    let (factory, store) = setup(Config::default());
    let mut session = factory.open_session(true);
    let mut mapper = StudentMapper::new(&mut session);

    mapper.get_student_by_id(1).await.unwrap();
    let added = mapper
        .add_student(&NewStudent {
            name: "明明".to_string(),
            age: 20,
            class_id: None,
        })
        .await
        .unwrap();
    assert_eq!(added, 1);

    mapper.get_student_by_id(1).await.unwrap();
    assert_eq!(store.query_count(), 2);
    session.close().unwrap();
}

#[tokio::test]
async fn test_local_cache_scope() {
    let (factory, store) = setup(Config::default());
    let mut session1 = factory.open_session(true);
    let mut session2 = factory.open_session(true);

    let before = StudentMapper::new(&mut session1)
        .get_student_by_id(1)
        .await
        .unwrap()
        .unwrap();
    StudentMapper::new(&mut session1)
        .get_student_by_id(1)
        .await
        .unwrap();
    assert_eq!(store.query_count(), 1);

    let updated = StudentMapper::new(&mut session2)
        .update_student_name("小岑", 1)
        .await
        .unwrap();
    assert_eq!(updated, 1);

    // session1 keeps its own first-level entry
    let stale = StudentMapper::new(&mut session1)
        .get_student_by_id(1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stale.name, before.name);
    assert_eq!(store.query_count(), 1);

    // session2 has no cached copy and reads the new name
    let fresh = StudentMapper::new(&mut session2)
        .get_student_by_id(1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh.name, "小岑");
    assert_eq!(store.query_count(), 2);
}

#[tokio::test]
async fn test_statement_scope_bypasses_local_cache() {
    let config = Config {
        local_cache_scope: LocalCacheScope::Statement,
        ..Config::default()
    };
    let (factory, store) = setup(config);
    let mut session = factory.open_session(true);
    let mut mapper = StudentMapper::new(&mut session);

    mapper.get_student_by_id(1).await.unwrap();
    mapper.get_student_by_id(1).await.unwrap();
    assert_eq!(store.query_count(), 2);
}

// == Second-Level Cache ==

#[tokio::test]
async fn test_cache_without_commit_or_close() {
    let (factory, store) = setup(Config::default());
    let mut session1 = factory.open_session(true);
    let mut session2 = factory.open_session(true);

    StudentMapper::new(&mut session1)
        .get_student_by_id(1)
        .await
        .unwrap();
    // session1 has not committed, so nothing was promoted
    StudentMapper::new(&mut session2)
        .get_student_by_id(1)
        .await
        .unwrap();

    assert_eq!(store.query_count(), 2);
}

#[tokio::test]
async fn test_cache_with_commit_or_close() {
    let (factory, store) = setup(Config::default());
    let mut session1 = factory.open_session(true);
    let mut session2 = factory.open_session(true);

    StudentMapper::new(&mut session1)
        .get_student_by_id(1)
        .await
        .unwrap();
    session1.close().unwrap();

    StudentMapper::new(&mut session2)
        .get_student_by_id(1)
        .await
        .unwrap();

    assert_eq!(store.query_count(), 1);
}

#[tokio::test]
async fn test_cache_with_update() {
    let (factory, store) = setup(Config::default());
    let mut session1 = factory.open_session(true);
    let mut session2 = factory.open_session(true);
    let mut session3 = factory.open_session(true);

    StudentMapper::new(&mut session1)
        .get_student_by_id(1)
        .await
        .unwrap();
    session1.close().unwrap();

    StudentMapper::new(&mut session2)
        .get_student_by_id(1)
        .await
        .unwrap();
    assert_eq!(store.query_count(), 1);

    StudentMapper::new(&mut session3)
        .update_student_name("方方", 1)
        .await
        .unwrap();
    session3.commit().unwrap();

    let student = StudentMapper::new(&mut session2)
        .get_student_by_id(1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.name, "方方");
    assert_eq!(store.query_count(), 2);
}

#[tokio::test]
async fn test_cache_with_different_namespace() {
    let (factory, store) = setup(Config::default());
    let mut session1 = factory.open_session(true);
    let mut session2 = factory.open_session(true);
    let mut session3 = factory.open_session(true);

    StudentMapper::new(&mut session1)
        .get_student_by_id_with_class_info(1)
        .await
        .unwrap();
    session1.close().unwrap();

    StudentMapper::new(&mut session2)
        .get_student_by_id_with_class_info(1)
        .await
        .unwrap();
    assert_eq!(store.query_count(), 1);

    ClassMapper::new(&mut session3)
        .update_class_name("特色一班", 1)
        .await
        .unwrap();
    session3.commit().unwrap();

    // The class namespace has its own cache, so the student cache serves a stale join
    let student = StudentMapper::new(&mut session2)
        .get_student_by_id_with_class_info(1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.class_name.as_deref(), Some("一班"));
    assert_eq!(store.query_count(), 1);
}

#[tokio::test]
async fn test_cache_with_different_namespace_with_cache_ref() {
    let (factory, store) = setup(with_cache_ref());
    let mut session1 = factory.open_session(true);
    let mut session2 = factory.open_session(true);
    let mut session3 = factory.open_session(true);

    StudentMapper::new(&mut session1)
        .get_student_by_id_with_class_info(1)
        .await
        .unwrap();
    session1.close().unwrap();

    StudentMapper::new(&mut session2)
        .get_student_by_id_with_class_info(1)
        .await
        .unwrap();
    assert_eq!(store.query_count(), 1);

    ClassMapper::new(&mut session3)
        .update_class_name("特色一班", 1)
        .await
        .unwrap();
    session3.commit().unwrap();

    // Both namespaces share one cache, so the class update cleared it
    let student = StudentMapper::new(&mut session2)
        .get_student_by_id_with_class_info(1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.class_name.as_deref(), Some("特色一班"));
    assert_eq!(store.query_count(), 2);
}

#[tokio::test]
async fn test_cache_disabled() {
    let config = Config {
        cache_enabled: false,
        ..Config::default()
    };
    let (factory, store) = setup(config);

    let mut session1 = factory.open_session(true);
    StudentMapper::new(&mut session1)
        .get_student_by_id(1)
        .await
        .unwrap();
    session1.close().unwrap();

    let mut session2 = factory.open_session(true);
    StudentMapper::new(&mut session2)
        .get_student_by_id(1)
        .await
        .unwrap();

    assert_eq!(store.query_count(), 2);
    assert!(factory.cache_manager().caches().is_empty());
}

#[tokio::test]
async fn test_end_to_end() {
    let (factory, store) = setup(Config::default());

    let mut session1 = factory.open_session(false);
    StudentMapper::new(&mut session1)
        .get_student_by_id(1)
        .await
        .unwrap();
    assert_eq!(store.query_count(), 1);
    session1.close().unwrap();

    let mut session2 = factory.open_session(false);
    StudentMapper::new(&mut session2)
        .get_student_by_id(1)
        .await
        .unwrap();
    assert_eq!(store.query_count(), 1);

    let mut session3 = factory.open_session(false);
    StudentMapper::new(&mut session3)
        .update_student_name("方方", 1)
        .await
        .unwrap();
    session3.commit().unwrap();
    session3.close().unwrap();

    let student = StudentMapper::new(&mut session2)
        .get_student_by_id(1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.name, "方方");
    assert_eq!(store.query_count(), 2);
    session2.close().unwrap();
}
