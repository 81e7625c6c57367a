use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use flaghook::{
    CallContext, ContextualEvaluator, Evaluator, ObservedEvaluator, Observation, OfflineEvaluator,
    SharedObserver, User,
};

fn criterion_benchmark(c: &mut Criterion) {
    let user = User::new("subject1").with_attribute("country", "US");
    let noop: SharedObserver<User> = Arc::new(|_: &Observation<'_, User>| {});

    let bare = OfflineEvaluator;
    let observed =
        ObservedEvaluator::new(Some(Arc::new(OfflineEvaluator)), [Some(noop.clone())]).unwrap();
    let observed_many = ObservedEvaluator::new(
        Some(Arc::new(OfflineEvaluator)),
        std::iter::repeat(noop).take(8).map(Some),
    )
    .unwrap();

    {
        let mut group = c.benchmark_group("bool_variation");
        group.throughput(Throughput::Elements(1));
        group.bench_function("bare", |b| {
            b.iter(|| {
                bare.bool_variation(black_box("new-user-onboarding"), black_box(&user), false)
            })
        });
        group.bench_function("one_observer", |b| {
            b.iter(|| {
                observed.bool_variation(black_box("new-user-onboarding"), black_box(&user), false)
            })
        });
        group.bench_function("eight_observers", |b| {
            b.iter(|| {
                observed_many.bool_variation(
                    black_box("new-user-onboarding"),
                    black_box(&user),
                    false,
                )
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("json_variation_detail");
        group.throughput(Throughput::Elements(1));
        let default = serde_json::json!({"limits": {"seats": 10, "projects": [1, 2, 3]}});
        group.bench_function("one_observer", |b| {
            b.iter(|| {
                observed.json_variation_detail(
                    black_box("limits"),
                    black_box(&user),
                    default.clone(),
                )
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("with_call_context");
        group.throughput(Throughput::Elements(1));
        let call_context = CallContext::background().with_value(42_u64);
        group.bench_function("rebind", |b| {
            b.iter(|| observed.with_call_context(black_box(call_context.clone())))
        });
        group.finish();
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
