#[cfg(test)]
mod tests {
    use crate::{CursorError, CursorOptions, OffsetCursor, OffsetHandle, Phase};
    use connectors::MemoryCollection;
    use engine_config::CursorSettings;
    use model::{
        events::KeyNotice,
        pagination::cursor::{KeyResolution, OrderBy},
        records::row::RowSnapshot,
    };
    use serde_json::json;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tracing_test::traced_test;

    fn keyed(n: usize) -> MemoryCollection {
        MemoryCollection::from_rows((1..=n).map(|i| RowSnapshot::new(format!("k{i:02}"), json!(i))))
    }

    fn cursor(collection: &MemoryCollection, max: usize) -> OffsetHandle {
        let options = CursorOptions {
            field: OrderBy::Key,
            collection: Arc::new(collection.clone()),
            max,
        };
        OffsetCursor::spawn(options, CursorSettings::default()).unwrap()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    fn recorder() -> (
        impl FnMut(&KeyNotice) + Send + 'static,
        Arc<Mutex<Vec<KeyNotice>>>,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (move |n: &KeyNotice| sink.lock().unwrap().push(n.clone()), seen)
    }

    #[tokio::test]
    async fn rejects_zero_page_size() {
        let options = CursorOptions {
            field: OrderBy::Key,
            collection: Arc::new(keyed(3)),
            max: 0,
        };

        let err = OffsetCursor::spawn(options, CursorSettings::default()).err();
        assert!(matches!(err, Some(CursorError::InvalidPageSize(0))));
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn resolves_and_settles_on_window_load() {
        let collection = keyed(8);
        let handle = cursor(&collection, 5);

        handle.go_to(4).await.unwrap();
        settle().await;

        let status = handle.status().await.unwrap();
        assert_eq!(status.offset, 4);
        assert_eq!(status.phase, Phase::Settled);
        assert_eq!(status.cached_keys, 4);
        assert!(status.watching);
        assert_eq!(handle.get_key(4).await.unwrap().row_id(), Some("k04"));
        assert_eq!(collection.listener_count().await, 1);
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn observers_receive_current_value_on_registration() {
        let collection = keyed(8);
        let handle = cursor(&collection, 5);
        handle.go_to(2).await.unwrap();
        settle().await;

        let (observer, seen) = recorder();
        handle.observe(observer).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].row_id.as_deref(), Some("k02"));
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn offset_zero_settles_without_fetching() {
        let collection = keyed(8);
        let handle = cursor(&collection, 5);
        let (observer, seen) = recorder();
        handle.observe(observer).await.unwrap();

        handle.go_to(3).await.unwrap();
        settle().await;
        collection.clear_fetch_log().await;
        handle.go_to(0).await.unwrap();
        settle().await;

        assert!(collection.fetch_log().await.is_empty());
        assert_eq!(handle.status().await.unwrap().phase, Phase::Settled);
        assert_eq!(collection.listener_count().await, 0);

        let seen = seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last.row_id, None);
        assert!(last.reference.is_some());
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn unobserved_callbacks_are_not_invoked() {
        let collection = keyed(8);
        let handle = cursor(&collection, 5);
        let (observer, seen) = recorder();
        let id = handle.observe(observer).await.unwrap();

        assert!(handle.unobserve(id).await.unwrap());
        handle.go_to(3).await.unwrap();
        settle().await;

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn fault_sticks_to_its_offset() {
        let collection = keyed(8);
        let handle = cursor(&collection, 5);
        collection.set_unavailable(Some("offline".into())).await;

        let err = handle.go_to(3).await.unwrap_err();
        assert!(matches!(err, CursorError::Collection(_)));
        assert_eq!(handle.status().await.unwrap().phase, Phase::Faulted);

        collection.set_unavailable(None).await;
        let err = handle.go_to(3).await.unwrap_err();
        assert!(matches!(err, CursorError::Faulted(_)));

        handle.go_to(2).await.unwrap();
        settle().await;
        assert_eq!(handle.status().await.unwrap().phase, Phase::Settled);
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn destroy_resets_state_and_keeps_observers() {
        let collection = keyed(8);
        let handle = cursor(&collection, 5);
        let (observer, seen) = recorder();
        handle.observe(observer).await.unwrap();
        handle.go_to(4).await.unwrap();
        settle().await;

        handle.destroy().await.unwrap();
        settle().await;

        let status = handle.status().await.unwrap();
        assert_eq!(status.offset, 0);
        assert_eq!(status.phase, Phase::Idle);
        assert_eq!(status.cached_keys, 0);
        assert!(!status.watching);
        assert_eq!(handle.get_key(4).await.unwrap(), KeyResolution::Unknown);
        assert_eq!(collection.listener_count().await, 0);

        let before = seen.lock().unwrap().len();
        handle.go_to(1).await.unwrap();
        settle().await;
        assert_eq!(seen.lock().unwrap().len(), before + 1);
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn shutdown_detaches_subscription() {
        let collection = keyed(8);
        let handle = cursor(&collection, 5);
        handle.go_to(4).await.unwrap();
        settle().await;

        handle.shutdown().await.unwrap();
        settle().await;

        assert_eq!(collection.listener_count().await, 0);
        assert!(logs_contain("Cursor actor stopped"));
    }
}
