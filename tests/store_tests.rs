//! Progress store invariants: per-student serialization, lossless
//! round-trips, and atomic commits.

mod common;

use chrono::Utc;

use tutor_backend_rust::engine::economy;
use tutor_backend_rust::engine::EngineError;
use tutor_backend_rust::store::profile::{PerkActivation, PerkOwnership};

#[tokio::test]
async fn load_returns_zero_state_for_new_students() {
    let (store, _dir) = common::create_test_store();

    let record = store.load("newcomer").await.expect("load");
    assert_eq!(record.profile.coins, 0);
    assert_eq!(record.profile.xp, 0);
    assert_eq!(economy::level_for_xp(record.profile.xp), 1);
    assert_eq!(record.profile.streak_days, 0);
    assert!(record.profile.achievements.is_empty());
    assert!(record.attempts.is_empty());

    // Loading alone persists nothing.
    assert!(store.get("newcomer").await.expect("get").is_none());
}

#[tokio::test]
async fn concurrent_transactions_for_one_student_compose() {
    let (store, _dir) = common::create_test_store();

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .transact("alice", move |record| {
                        economy::award_coins(&mut record.profile, i + 1, 1.0, "test")?;
                        Ok::<_, EngineError>(())
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("join").expect("transact");
    }

    let record = store.get("alice").await.expect("get").expect("exists");
    // 1 + 2 + ... + 20
    assert_eq!(record.profile.coins, 210);
}

#[tokio::test]
async fn distinct_students_do_not_interfere() {
    let (store, _dir) = common::create_test_store();

    let mut tasks = Vec::new();
    for name in ["a", "b", "c", "d"] {
        for _ in 0..5 {
            let store = std::sync::Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .transact(name, |record| {
                        economy::award_coins(&mut record.profile, 10, 1.0, "test")?;
                        Ok::<_, EngineError>(())
                    })
                    .await
            }));
        }
    }
    for task in tasks {
        task.await.expect("join").expect("transact");
    }

    for name in ["a", "b", "c", "d"] {
        let record = store.get(name).await.expect("get").expect("exists");
        assert_eq!(record.profile.coins, 50);
    }
}

#[tokio::test]
async fn failed_mutation_commits_nothing() {
    let (store, _dir) = common::create_test_store();

    let result = store
        .transact("bob", |record| {
            economy::award_coins(&mut record.profile, 10, 1.0, "test")?;
            economy::spend_coins(&mut record.profile, 10_000)?;
            Ok::<_, EngineError>(())
        })
        .await;

    assert!(matches!(
        result,
        Err(EngineError::InsufficientFunds { .. })
    ));
    // The failed transaction never created the record.
    assert!(store.get("bob").await.expect("get").is_none());
}

#[tokio::test]
async fn records_round_trip_losslessly() {
    let (store, _dir) = common::create_test_store();
    let now = Utc::now();

    let written = store
        .transact("carol", move |record| {
            economy::award_coins(&mut record.profile, 500, 1.0, "seed")?;
            economy::award_xp(&mut record.profile, 250)?;
            record.profile.perks.insert(
                "double_coins".to_string(),
                PerkOwnership {
                    perk_id: "double_coins".to_string(),
                    purchased_at: now,
                    activation: PerkActivation::Timed {
                        expires_at: now + chrono::Duration::hours(24),
                    },
                },
            );
            record.policy.daily_quiz_limit = 3;
            Ok::<_, EngineError>(record.clone())
        })
        .await
        .expect("transact");

    let reloaded = store.get("carol").await.expect("get").expect("exists");

    let a = serde_json::to_value(&written).expect("serialize written");
    let b = serde_json::to_value(&reloaded).expect("serialize reloaded");
    assert_eq!(a, b);
}

#[tokio::test]
async fn commits_leave_no_temp_files() {
    let (store, dir) = common::create_test_store();

    for i in 0..5 {
        store
            .transact("dave", move |record| {
                economy::award_coins(&mut record.profile, i, 1.0, "test")?;
                Ok::<_, EngineError>(())
            })
            .await
            .expect("transact");
    }

    let students = dir.path().join("students");
    let mut found_json = false;
    for entry in std::fs::read_dir(&students).expect("read dir") {
        let name = entry.expect("entry").file_name();
        let name = name.to_string_lossy().to_string();
        assert!(!name.ends_with(".tmp"), "temp file left behind: {name}");
        found_json |= name.ends_with(".json");
    }
    assert!(found_json);
}

#[tokio::test]
async fn reset_deletes_the_record() {
    let (store, _dir) = common::create_test_store();

    store
        .transact("erin", |record| {
            economy::award_coins(&mut record.profile, 10, 1.0, "test")?;
            Ok::<_, EngineError>(())
        })
        .await
        .expect("transact");

    assert!(store.reset("erin").await.expect("reset"));
    assert!(store.get("erin").await.expect("get").is_none());
    assert!(!store.reset("erin").await.expect("second reset"));
}
