use std::io;
use std::sync::Arc;

use event_log_sink::{
    error, info, new_event, set_global, DefaultLogger, LogSink, Scope, Target, TerminalEncoder,
};

/// Example of integrating a completely custom destination by implementing
/// the `LogSink` trait directly. Imagine this talks to some proprietary
/// collector for which this crate does not provide a built-in sink.
struct MyCustomSink;

impl LogSink for MyCustomSink {
    fn write(&self, target: Target, bytes: &[u8]) -> io::Result<()> {
        // Here you would call your own client library.
        // For the sake of example we just print the record.
        print!("[my-custom-sink {:?}] {}", target, String::from_utf8_lossy(bytes));
        Ok(())
    }
}

fn main() {
    let logger = DefaultLogger::with_sink(Arc::new(MyCustomSink)).encoder(Arc::new(TerminalEncoder));
    set_global(Arc::new(logger));

    info(&Scope::background(), "custom sink example started");

    let (scope, event) = new_event(&Scope::background(), "import");
    event.set("db", "my-custom-db");
    error(&scope, "simulated error sent via custom sink");
    event.end();
}
