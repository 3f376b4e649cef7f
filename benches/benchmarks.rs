use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use admin_store::{tasks_for_user, AppStore, Derived, Record, StoreConfig, Writable};

fn tasks(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| Record::new().with("user", format!("user{}@example.com", i % 10)))
        .collect()
}

fn writable_read_benchmark(c: &mut Criterion) {
    let cell: Writable<i32> = Writable::new(42);

    c.bench_function("writable_read", |b| {
        b.iter(|| {
            black_box(cell.get());
        });
    });
}

fn writable_write_benchmark(c: &mut Criterion) {
    let cell: Writable<i32> = Writable::new(0);

    c.bench_function("writable_write", |b| {
        let mut i = 0;
        b.iter(|| {
            cell.set(black_box(i));
            i += 1;
        });
    });
}

fn writable_subscribe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("writable_notify");

    for subscriber_count in [1, 10, 100].iter() {
        let cell = Writable::new(0usize);
        let subs: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                cell.subscribe(|_| {
                    // Empty subscriber
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    cell.set(black_box(i));
                    i += 1;
                });
            },
        );
        drop(subs);
    }
    group.finish();
}

fn derived_recompute_benchmark(c: &mut Criterion) {
    let a: Writable<i32> = Writable::new(5);
    let b: Writable<i32> = Writable::new(10);
    let sum = Derived::new((a.clone(), b.clone()), |(a, b)| a + b);

    c.bench_function("derived_recompute", |bench| {
        let mut i = 0;
        bench.iter(|| {
            a.set(black_box(i));
            black_box(sum.get());
            i += 1;
        });
    });
}

fn user_tasks_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tasks_for_user");
    let config = StoreConfig::default();
    let user = Record::new().with("email", "user3@example.com");

    for task_count in [10, 100, 1000].iter() {
        let tasks = tasks(*task_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(task_count),
            task_count,
            |b, _| {
                b.iter(|| black_box(tasks_for_user(&tasks, Some(&user), &config)));
            },
        );
    }
    group.finish();
}

fn store_tasks_write_benchmark(c: &mut Criterion) {
    let store = AppStore::new();
    store
        .user
        .set(Some(Record::new().with("email", "user3@example.com")));
    let tasks = tasks(100);

    c.bench_function("store_tasks_write", |b| {
        b.iter(|| {
            store.tasks.set(black_box(tasks.clone()));
        });
    });
}

criterion_group!(
    benches,
    writable_read_benchmark,
    writable_write_benchmark,
    writable_subscribe_benchmark,
    derived_recompute_benchmark,
    user_tasks_benchmark,
    store_tasks_write_benchmark,
);
criterion_main!(benches);
