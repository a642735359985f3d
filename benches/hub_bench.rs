use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use inspection_live::live::LiveHub;
use inspection_live::types::UpdatePayload;
use serde_json::json;
use tokio::runtime::Runtime;

fn payload() -> UpdatePayload {
    UpdatePayload {
        color_detection: Some(json!({ "predicted": "Black", "expected": "Black", "confident": 97, "status": "OK" })),
        barcode_reading: Some(json!({ "predicted": "4901234567894", "status": "OK" })),
        ..Default::default()
    }
}

fn benchmark_fan_out(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("enqueue_and_drain");

    for subscribers in [1usize, 16, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(subscribers), &subscribers, |b, &n| {
            b.iter(|| {
                rt.block_on(async {
                    let hub = LiveHub::new(256);
                    let mut handles = Vec::with_capacity(n);
                    for _ in 0..n {
                        handles.push(hub.register("CAM1").await);
                    }
                    for _ in 0..64 {
                        black_box(hub.enqueue("CAM1", payload()).await);
                    }
                    for handle in handles.iter_mut() {
                        for _ in 0..64 {
                            black_box(handle.recv().await.unwrap());
                        }
                    }
                })
            })
        });
    }
    group.finish();
}

fn benchmark_register_churn(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("register_unregister", |b| {
        let hub = LiveHub::new(256);
        b.iter(|| {
            rt.block_on(async {
                let handle = hub.register("CAM1").await;
                black_box(hub.unregister("CAM1", handle.id()).await)
            })
        })
    });
}

criterion_group!(benches, benchmark_fan_out, benchmark_register_churn);
criterion_main!(benches);
