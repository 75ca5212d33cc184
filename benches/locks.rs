// Criterion benchmark: the crate's locks against the standard library's
// under the same contention.

use criterion::{Criterion, criterion_group, criterion_main};
use ownership::{Arc, Mutex, SharedMutex};
use std::hint::black_box;
use std::thread;

const THREADS: usize = 4;
const ITERATIONS: usize = 10_000;

fn contended_mutex() -> usize {
    let mutex = Arc::new(Mutex::new(0usize));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let m = mutex.clone();
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    *m.lock() += 1;
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let total = *mutex.lock();
    total
}

fn contended_std_mutex() -> usize {
    let mutex = std::sync::Arc::new(std::sync::Mutex::new(0usize));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let m = mutex.clone();
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    *m.lock().unwrap() += 1;
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let total = *mutex.lock().unwrap();
    total
}

fn read_mostly_shared_mutex() -> usize {
    let lock = Arc::new(SharedMutex::new(0usize));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let l = lock.clone();
            thread::spawn(move || {
                let mut seen = 0;
                for n in 0..ITERATIONS {
                    if i == 0 && n % 100 == 0 {
                        *l.lock() += 1;
                    } else {
                        seen += *l.lock_shared();
                    }
                }
                seen
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).sum()
}

fn read_mostly_std_rwlock() -> usize {
    let lock = std::sync::Arc::new(std::sync::RwLock::new(0usize));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let l = lock.clone();
            thread::spawn(move || {
                let mut seen = 0;
                for n in 0..ITERATIONS {
                    if i == 0 && n % 100 == 0 {
                        *l.write().unwrap() += 1;
                    } else {
                        seen += *l.read().unwrap();
                    }
                }
                seen
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).sum()
}

fn bench_locks(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_mutex");
    group.sample_size(20);
    group.bench_function("ownership::Mutex", |b| b.iter(|| black_box(contended_mutex())));
    group.bench_function("std::sync::Mutex", |b| {
        b.iter(|| black_box(contended_std_mutex()))
    });
    group.finish();

    let mut group = c.benchmark_group("read_mostly");
    group.sample_size(20);
    group.bench_function("ownership::SharedMutex", |b| {
        b.iter(|| black_box(read_mostly_shared_mutex()))
    });
    group.bench_function("std::sync::RwLock", |b| {
        b.iter(|| black_box(read_mostly_std_rwlock()))
    });
    group.finish();
}

criterion_group!(benches, bench_locks);
criterion_main!(benches);
