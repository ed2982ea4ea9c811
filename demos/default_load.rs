use std::sync::Arc;
use std::time::Instant;

use event_log_sink::{new_event, with, DefaultLogger, NoopSink, Scope};

fn main() {
    let scope =
        Scope::background().with_logger(Arc::new(DefaultLogger::with_sink(Arc::new(NoopSink))));

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let (scope, event) = new_event(&scope, "load");
        event.set_label("iteration", i);
        with("iteration", i).error(&scope, "default load test error");
        event.end();
    }

    let elapsed = start.elapsed();
    println!(
        "default config: ended {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
