use event_log_sink::*;
use pretty_assertions::assert_eq;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use test_log::test;

fn capture() -> (Scope, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let logger = Arc::new(DefaultLogger::with_sink(sink.clone()));
    (Scope::background().with_logger(logger), sink)
}

#[test]
fn concurrent_end_streams_exactly_once() {
    let (scope, sink) = capture();
    let (scope, event) = new_event(&scope, "contended");
    for i in 0..5 {
        infof(&scope, format_args!("child {i}"));
    }

    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let event = Arc::clone(&event);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                event.end();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let messages: Vec<_> = sink
        .json_records(Target::Stdout)
        .into_iter()
        .map(|r| r["message"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        messages,
        vec!["child 0", "child 1", "child 2", "child 3", "child 4", "contended"]
    );
}

#[test]
fn children_from_many_threads_all_attach() {
    let (scope, sink) = capture();
    let (scope, event) = new_event(&scope, "fan-out");

    thread::scope(|s| {
        for t in 0..8 {
            let scope = scope.clone();
            s.spawn(move || {
                for i in 0..25 {
                    let severity = if t == 3 && i == 7 { Severity::Warn } else { Severity::Debug };
                    let entry = with("thread", t).with("i", i);
                    match severity {
                        Severity::Warn => entry.warn(&scope, "worker warned"),
                        _ => entry.debug(&scope, "worker step"),
                    }
                }
            });
        }
    });

    assert_eq!(event.child_count(), 200);
    assert!(sink.is_empty());

    event.set_label("batch", "b-1");
    event.end();

    assert_eq!(event.severity(), Severity::Warn);
    let stdout = sink.json_records(Target::Stdout);
    let stderr = sink.json_records(Target::Stderr);
    assert_eq!(stdout.len(), 199);
    assert_eq!(stderr.len(), 2);
    assert!(stdout.iter().all(|r| r["batch"] == "b-1"));
}

/// Sink taking `delay` per record, flagging the first write.
struct SlowSink {
    delay: Duration,
    writing: AtomicBool,
    inner: MemorySink,
}

impl LogSink for SlowSink {
    fn write(&self, target: Target, bytes: &[u8]) -> io::Result<()> {
        self.writing.store(true, Ordering::Release);
        thread::sleep(self.delay);
        self.inner.write(target, bytes)
    }
}

#[test]
fn logging_during_slow_end_is_not_blocked() {
    let sink = Arc::new(SlowSink {
        delay: Duration::from_millis(100),
        writing: AtomicBool::new(false),
        inner: MemorySink::new(),
    });
    let logger = Arc::new(DefaultLogger::with_sink(sink.clone()));
    let (scope, event) = new_event(&Scope::background().with_logger(logger), "slow");
    for i in 0..5 {
        infof(&scope, format_args!("child {i}"));
    }

    let ender = Arc::clone(&event);
    let finalize = thread::spawn(move || ender.end());

    while !sink.writing.load(Ordering::Acquire) {
        thread::yield_now();
    }
    let started = Instant::now();
    info(&scope, "late");
    let blocked = started.elapsed();

    finalize.join().unwrap();

    // Streaming the five children and the event takes 600ms.
    assert!(blocked < Duration::from_millis(250), "late entry waited {blocked:?}");
    assert_eq!(event.child_count(), 0);

    let messages: Vec<_> = sink
        .inner
        .json_records(Target::Stdout)
        .into_iter()
        .map(|r| r["message"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        messages,
        vec!["child 0", "child 1", "child 2", "child 3", "child 4", "slow"]
    );
}

#[test]
fn concurrent_configuration_never_tears() {
    let (scope, sink) = capture();
    let logger = scope.logger();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..200 {
                let encoder: Arc<dyn Encoder> = if i % 2 == 0 {
                    Arc::new(JsonEncoder)
                } else {
                    Arc::new(CloudEncoder::with_project_id("p"))
                };
                logger.set_encoder(encoder);
            }
        });
        s.spawn(|| {
            for _ in 0..200 {
                info(&scope, "steady");
            }
        });
    });

    let records = sink.json_records(Target::Stdout);
    assert_eq!(records.len(), 200);
    assert!(records.iter().all(|r| r["message"] == "steady"));
}

#[test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn events_across_tokio_tasks() {
    let (scope, sink) = capture();

    let mut tasks = Vec::new();
    for n in 0..10 {
        let scope = scope.clone();
        tasks.push(tokio::spawn(async move {
            let (scope, event) = new_event(&scope, format!("request {n}"));
            event.set_label("request", n);
            info(&scope, "handled");
            tokio::task::yield_now().await;
            let ender = Arc::clone(&event);
            let first = tokio::spawn(async move { ender.end() });
            event.end();
            first.await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let records = sink.json_records(Target::Stdout);
    assert_eq!(records.len(), 20);
    for n in 0..10 {
        let events = records
            .iter()
            .filter(|r| r["message"] == format!("request {n}"))
            .count();
        assert_eq!(events, 1);
    }
    assert_eq!(
        records.iter().filter(|r| r["message"] == "handled").count(),
        10
    );
}
