use std::sync::Arc;
use std::time::{Duration, Instant};

use inkwell_core::{BatchTask, FileRef, NodeId, TaskId};
use inkwell_engine::{
    EngineEvent, EngineHandle, FailureKind, ProgressSink, UploadError, UploadOptions,
    UploadReceipt, UploadTransport,
};

struct SlowTransport {
    delay: Duration,
}

#[async_trait::async_trait]
impl UploadTransport for SlowTransport {
    async fn upload(
        &self,
        task_id: TaskId,
        file: &FileRef,
        _options: &UploadOptions,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<UploadReceipt, UploadError> {
        sink.emit(EngineEvent::Progress {
            task_id,
            percent: 0,
        });
        tokio::time::sleep(self.delay).await;
        Ok(UploadReceipt {
            url: format!("https://cdn.example/{}", file.name),
            public_id: file.name.clone(),
        })
    }
}

fn engine(delay: Duration) -> EngineHandle {
    editor_logging::initialize_for_tests();
    EngineHandle::with_transport(Arc::new(SlowTransport { delay })).expect("engine starts")
}

fn task(task_id: TaskId, name: &str) -> BatchTask {
    BatchTask {
        task_id,
        file: FileRef::from_bytes(name, "image/png", vec![0_u8; 4]),
    }
}

/// Collects events until `done` matches or the deadline passes.
fn collect_until(
    engine: &EngineHandle,
    done: impl Fn(&EngineEvent) -> bool,
) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            let finished = done(&event);
            events.push(event);
            if finished {
                break;
            }
        }
    }
    events
}

#[test]
fn batch_events_arrive_through_the_handle() {
    let engine = engine(Duration::from_millis(5));
    engine.start_batch(1, None, vec![task(1, "a.png"), task(2, "b.png")]);

    let events = collect_until(&engine, |event| {
        matches!(event, EngineEvent::BatchFinished { batch_id: 1 })
    });
    let completed: Vec<TaskId> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::UploadCompleted { task_id, result } if result.is_ok() => Some(*task_id),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![1, 2]);
    assert_eq!(engine.pending_uploads(), 0);
}

#[test]
fn cancel_right_after_start_is_never_lost() {
    let engine = engine(Duration::from_secs(30));
    engine.start_batch(2, None, vec![task(5, "slow.png")]);
    assert_eq!(engine.pending_uploads(), 1);
    assert!(engine.cancel(5));

    let events = collect_until(&engine, |event| {
        matches!(event, EngineEvent::BatchFinished { batch_id: 2 })
    });
    let cancelled = events.iter().any(|event| {
        matches!(
            event,
            EngineEvent::UploadCompleted { task_id: 5, result: Err(err) }
                if err.kind == FailureKind::Cancelled
        )
    });
    assert!(cancelled);
}

#[test]
fn cancelling_unknown_task_reports_false() {
    let engine = engine(Duration::from_millis(1));
    assert!(!engine.cancel(404));
    assert!(engine.try_recv().is_none());
}

#[test]
fn dismiss_timer_fires_after_delay() {
    let engine = engine(Duration::from_millis(1));
    let started = Instant::now();
    engine.schedule_dismiss(NodeId::new("notice-1"), Duration::from_millis(20));

    let events = collect_until(&engine, |event| {
        matches!(event, EngineEvent::DismissDue { .. })
    });
    assert_eq!(
        events.last(),
        Some(&EngineEvent::DismissDue {
            node_id: NodeId::new("notice-1")
        })
    );
    assert!(started.elapsed() >= Duration::from_millis(20));
}
