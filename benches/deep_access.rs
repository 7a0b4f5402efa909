use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Value};

use jsop::session::Jsop;

// A wide root map with one nested record per key; path-local access cost
// should not depend on how many siblings exist.
fn build_db(path: &std::path::Path, n: usize) -> Jsop {
    let mut entries = serde_json::Map::new();
    for i in 0..n {
        entries.insert(i.to_string(), json!({"value": i, "tags": [i, i + 1]}));
    }
    let db = Jsop::new(path);
    db.init(&Value::Object(entries)).unwrap();
    db
}

fn bench_deep_access(c: &mut Criterion) {
    let ns = [100usize, 10_000usize];
    let mut group = c.benchmark_group("deep_access");
    group.sample_size(20);

    for &n in &ns {
        let tmp = tempfile::tempdir().unwrap();
        let db = build_db(&tmp.path().join("bench.jsop"), n);
        let session = db.open().unwrap();
        let root = session.root().unwrap().as_map().unwrap();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("get_one", n.to_string()), &n, |b, &n| {
            let mut rng = StdRng::seed_from_u64(0xDEAD_BEEF);
            b.iter(|| {
                let key = (rng.gen::<usize>() % n).to_string();
                let nested = root.get(&key).unwrap().as_map().unwrap();
                criterion::black_box(nested.get("value").unwrap().export().unwrap());
            });
        });

        group.bench_with_input(BenchmarkId::new("put_one", n.to_string()), &n, |b, &n| {
            let mut rng = StdRng::seed_from_u64(0xBEEF_CAFE);
            b.iter(|| {
                let key = (rng.gen::<usize>() % n).to_string();
                let nested = root.get(&key).unwrap().as_map().unwrap();
                nested.put("value", &json!(rng.gen::<u32>())).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_deep_access);
criterion_main!(benches);
