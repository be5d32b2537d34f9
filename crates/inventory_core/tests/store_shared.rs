use inventory_core::{ItemDraft, Store, StoreConfig, StoreError};

// The shared store is process-wide state, so its whole contract lives in
// one test: concurrent first callers, idempotent re-open, conflict
// rejection, and the bare accessor.
#[test]
fn open_shared_yields_one_instance_process_wide() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::in_dir(dir.path());

    assert!(Store::shared().is_none());

    let handles: Vec<Store> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| Store::open_shared(&config).expect("open_shared should succeed"))
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("worker should not panic"))
            .collect()
    });

    let first = &handles[0];
    for handle in &handles {
        assert!(first.same_store(handle));
    }

    // A later same-config call joins the existing instance.
    let again = Store::open_shared(&config).unwrap();
    assert!(first.same_store(&again));

    // A different path is rejected, not silently honored.
    let other = StoreConfig::new(dir.path().join("other.db"));
    let err = Store::open_shared(&other).unwrap_err();
    assert!(matches!(err, StoreError::SharedConfigConflict { .. }));

    // The bare accessor returns the same instance without opening.
    let shared = Store::shared().expect("shared store should be initialized");
    assert!(first.same_store(&shared));
    assert_eq!(shared.path(), Some(config.path()));

    // Writes through one handle are visible through another.
    let id = first.insert(&ItemDraft::new("Bolt", 0.50, 100)).unwrap();
    assert_eq!(shared.get(id).unwrap().unwrap().name, "Bolt");
}
