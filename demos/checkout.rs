use event_log_sink::{
    init_with_config, new_event, set_on_err, with, EventDecorator, LoggerConfig, Scope, StaticFields,
    TraceContext, TraceFields,
};
use serde_json::json;
use std::sync::Arc;

fn charge(scope: &Scope, amount: u64) -> Result<(), String> {
    set_on_err(scope, "amount", amount);
    if amount > 100 {
        with("limit", 100).errorf(scope, format_args!("amount {amount} over limit"));
        return Err("declined".into());
    }
    with("amount", amount).info(scope, "charged");
    Ok(())
}

fn main() {
    let config = LoggerConfig::from_env().unwrap_or_default();
    let logger = init_with_config(&config);
    logger.set_event_decorators(vec![
        Arc::new(StaticFields::new([("service", json!("checkout"))])) as Arc<dyn EventDecorator>,
        Arc::new(TraceFields) as Arc<dyn EventDecorator>,
    ]);

    let root = Scope::background().with_trace(TraceContext {
        trace_id: "06796866738c859f2f19b7cfb3214824".into(),
        span_id: "000000000000004a".into(),
        sampled: true,
    });

    for amount in [42, 250] {
        let (scope, event) = new_event(&root, "checkout");
        let _guard = event.guard();
        event.set_label("request_id", format!("req-{amount}"));
        with("user", "42").info(&scope, "step1");
        let _ = charge(&scope, amount);
    }
}
