mod common;

use common::{create_test_dir, local_names, sunday_options};
use xword_sync::config::SideEffects;
use xword_sync::drive::{MemoryStore, RemoteStore};
use xword_sync::filename::DaySelector;
use xword_sync::reconciliation::{reconcile, ReconcileError, ReconcileOptions};

#[tokio::test]
async fn test_missing_sunday_file_is_downloaded() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([("02-09-25-SUN Puzzle.pdf", b"sunday".as_slice())]);

    let stats = reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile");

    assert_eq!(stats.downloaded, 1);
    assert_eq!(stats.renamed, 0);
    assert_eq!(stats.errors, 0);
    assert_eq!(local_names(temp_dir.path()), vec!["02-09-25 Puzzle.pdf"]);

    let content = std::fs::read(temp_dir.path().join("02-09-25 Puzzle.pdf")).expect("Should read");
    assert_eq!(content, b"sunday");
}

#[tokio::test]
async fn test_mirror_dir_is_created() {
    let temp_dir = create_test_dir();
    let mirror = temp_dir.path().join("icloud").join("nyt-crosswords");
    let store = MemoryStore::with_files([("02-09-25-SUN Solution.pdf", b"s".as_slice())]);

    reconcile(&store, &sunday_options(&mirror, SideEffects::Apply))
        .await
        .expect("Should reconcile");

    assert_eq!(local_names(&mirror), vec!["02-09-25 Solution.pdf"]);
}

#[tokio::test]
async fn test_legacy_names_are_renamed_then_mirrored() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([
        ("2025-02-09_Sunday_Puzzle.pdf", b"p".as_slice()),
        ("2025-02-09_Sunday_Solution.pdf", b"s".as_slice()),
        ("2025-02-10_Monday_Puzzle.pdf", b"m".as_slice()),
    ]);

    let stats = reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile");

    assert_eq!(stats.renamed, 3);
    assert_eq!(stats.downloaded, 2);
    assert_eq!(stats.errors, 0);
    assert_eq!(
        store.names().await,
        vec![
            "02-09-25-SUN Puzzle.pdf",
            "02-09-25-SUN Solution.pdf",
            "02-10-25-MON Puzzle.pdf",
        ]
    );
    // The listing is refreshed after renaming
    assert_eq!(store.list_calls().await, 2);
    assert_eq!(
        local_names(temp_dir.path()),
        vec!["02-09-25 Puzzle.pdf", "02-09-25 Solution.pdf"]
    );
}

#[tokio::test]
async fn test_no_renames_means_single_listing() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([("02-09-25-SUN Puzzle.pdf", b"p".as_slice())]);

    reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile");

    assert_eq!(store.list_calls().await, 1);
    assert_eq!(store.rename_calls().await, 0);
}

#[tokio::test]
async fn test_rename_failure_does_not_stop_the_batch() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([
        ("2025-02-02_Sunday_Puzzle.pdf", b"a".as_slice()),
        ("2025-02-09_Sunday_Puzzle.pdf", b"b".as_slice()),
    ]);
    store.fail_on("2025-02-02_Sunday_Puzzle.pdf").await;

    let stats = reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile despite a failed rename");

    assert_eq!(stats.errors, 1);
    assert_eq!(stats.renamed, 1);
    assert_eq!(stats.downloaded, 1);
    assert_eq!(
        store.names().await,
        vec!["2025-02-02_Sunday_Puzzle.pdf", "02-09-25-SUN Puzzle.pdf"]
    );
    assert_eq!(local_names(temp_dir.path()), vec!["02-09-25 Puzzle.pdf"]);
}

#[tokio::test]
async fn test_download_failure_is_counted_and_cleaned_up() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([
        ("02-02-25-SUN Puzzle.pdf", b"a".as_slice()),
        ("02-09-25-SUN Puzzle.pdf", b"b".as_slice()),
    ]);
    store.fail_on("02-02-25-SUN Puzzle.pdf").await;

    let stats = reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile despite a failed download");

    assert_eq!(stats.errors, 1);
    assert_eq!(stats.downloaded, 1);
    // No partial file is left behind
    assert_eq!(local_names(temp_dir.path()), vec!["02-09-25 Puzzle.pdf"]);
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([
        ("2025-02-09_Sunday_Puzzle.pdf", b"p".as_slice()),
        ("02-16-25-SUN Solution.pdf", b"s".as_slice()),
    ]);
    let options = sunday_options(temp_dir.path(), SideEffects::Apply);

    reconcile(&store, &options).await.expect("First run should succeed");
    let stats = reconcile(&store, &options).await.expect("Second run should succeed");

    assert_eq!(stats.renamed, 0);
    assert_eq!(stats.downloaded, 0);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.skipped, 2);
    assert_eq!(store.download_calls().await, 2);
}

#[tokio::test]
async fn test_existing_local_file_is_not_overwritten() {
    let temp_dir = create_test_dir();
    std::fs::write(temp_dir.path().join("02-09-25 Puzzle.pdf"), b"mine").expect("Should write");
    let store = MemoryStore::with_files([("02-09-25-SUN Puzzle.pdf", b"remote".as_slice())]);

    let stats = reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile");

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.downloaded, 0);
    assert_eq!(store.download_calls().await, 0);
    let content = std::fs::read(temp_dir.path().join("02-09-25 Puzzle.pdf")).expect("Should read");
    assert_eq!(content, b"mine");
}

#[tokio::test]
async fn test_files_in_subdirectories_count_as_present() {
    let temp_dir = create_test_dir();
    let archive = temp_dir.path().join("2025");
    std::fs::create_dir_all(&archive).expect("Should create subdir");
    std::fs::write(archive.join("02-09-25 Puzzle.pdf"), b"old").expect("Should write");
    let store = MemoryStore::with_files([("02-09-25-SUN Puzzle.pdf", b"p".as_slice())]);

    let stats = reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile");

    assert_eq!(stats.downloaded, 0);
    assert_eq!(stats.skipped, 1);
}

#[tokio::test]
async fn test_unrecognized_and_other_days_are_untouched() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([
        ("random.pdf", b"r".as_slice()),
        ("notes 02-09-25.txt", b"n".as_slice()),
        ("02-10-25-MON Puzzle.pdf", b"m".as_slice()),
    ]);

    let stats = reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile");

    assert_eq!(stats.renamed, 0);
    assert_eq!(stats.downloaded, 0);
    assert_eq!(store.rename_calls().await, 0);
    assert_eq!(
        store.names().await,
        vec!["random.pdf", "notes 02-09-25.txt", "02-10-25-MON Puzzle.pdf"]
    );
    assert!(local_names(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_day_selector_picks_other_weekday() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([
        ("02-09-25-SUN Puzzle.pdf", b"s".as_slice()),
        ("02-10-25-MON Puzzle.pdf", b"m".as_slice()),
    ]);
    let options = ReconcileOptions {
        mirror_dir: temp_dir.path().to_path_buf(),
        day: "0".parse::<DaySelector>().expect("Should parse index"),
        side_effects: SideEffects::Apply,
    };

    let stats = reconcile(&store, &options).await.expect("Should reconcile");

    assert_eq!(stats.downloaded, 1);
    assert_eq!(local_names(temp_dir.path()), vec!["02-10-25 Puzzle.pdf"]);
}

#[tokio::test]
async fn test_dry_run_changes_nothing() {
    let temp_dir = create_test_dir();
    let mirror = temp_dir.path().join("mirror");
    let store = MemoryStore::with_files([
        ("2025-02-09_Sunday_Puzzle.pdf", b"p".as_slice()),
        ("02-16-25-SUN Solution.pdf", b"s".as_slice()),
    ]);

    let stats = reconcile(&store, &sunday_options(&mirror, SideEffects::DryRun))
        .await
        .expect("Should reconcile");

    // Planned work is still reported
    assert_eq!(stats.renamed, 1);
    assert_eq!(stats.downloaded, 2);
    assert_eq!(stats.errors, 0);

    assert_eq!(store.rename_calls().await, 0);
    assert_eq!(store.download_calls().await, 0);
    assert_eq!(store.list_calls().await, 1);
    assert_eq!(
        store.names().await,
        vec!["2025-02-09_Sunday_Puzzle.pdf", "02-16-25-SUN Solution.pdf"]
    );
    assert!(!mirror.exists());
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let temp_dir = create_test_dir();
    let store = MemoryStore::with_files([("02-09-25-SUN Puzzle.pdf", b"p".as_slice())]);
    store.fail_listing().await;

    let result = reconcile(&store, &sunday_options(temp_dir.path(), SideEffects::Apply)).await;

    assert!(matches!(result, Err(ReconcileError::ListError(_))));
    assert_eq!(store.download_calls().await, 0);
}

#[tokio::test]
async fn test_store_is_usable_as_trait_object() {
    let temp_dir = create_test_dir();
    let store: Box<dyn RemoteStore> =
        Box::new(MemoryStore::with_files([("02-09-25-SUN Puzzle.pdf", b"p".as_slice())]));

    let stats = reconcile(store.as_ref(), &sunday_options(temp_dir.path(), SideEffects::Apply))
        .await
        .expect("Should reconcile");

    assert_eq!(stats.downloaded, 1);
}
