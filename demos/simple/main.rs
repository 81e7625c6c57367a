use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use flaghook::{
    CallContext, ContextualEvaluator, Evaluator, LogObserver, ObservedEvaluatorConfig,
    Observation, OfflineEvaluator, User,
};

struct RequestId(String);

pub fn main() -> flaghook::Result<()> {
    // Configure env_logger to see evaluation logs.
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("flaghook=debug"))
        .init();

    // Count evaluations per flag, the way a metrics observer would.
    let counts = Arc::new(Mutex::new(HashMap::<String, u64>::new()));

    // A real application would wrap its flag client here. The offline evaluator serves defaults.
    let evaluator = ObservedEvaluatorConfig::new()
        .evaluator(OfflineEvaluator)
        .observer(LogObserver::new())
        .observer({
            let counts = counts.clone();
            move |observation: &Observation<'_, User>| {
                let request_id = observation.call_context.value::<RequestId>();
                println!(
                    "request {:?}: {} = {} ({}) in {:?}",
                    request_id.map(|id| id.0.as_str()),
                    observation.key,
                    observation.detail.value,
                    observation.detail.reason,
                    observation.elapsed,
                );
                if let Ok(mut counts) = counts.lock() {
                    *counts.entry(observation.key.to_owned()).or_default() += 1;
                }
            }
        })
        .build()?;

    for request in 1..=3 {
        let per_request = evaluator.with_call_context(
            CallContext::background().with_value(RequestId(format!("req-{request}"))),
        );
        let user = User::new(format!("user-{request}")).with_attribute("country", "NZ");

        let enabled = per_request
            .bool_variation("a-boolean-flag", &user, false)
            .unwrap_or(false);
        let greeting = per_request
            .string_variation("greeting", &user, "hello".to_owned())
            .unwrap_or_default();

        println!("enabled: {enabled}, greeting: {greeting}");
    }

    println!("evaluation counts: {:?}", counts.lock().map(|c| c.clone()));

    Ok(())
}
