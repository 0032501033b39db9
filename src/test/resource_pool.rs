use crate::pool::ResourcePool;
use crate::proc::ProcessId;
use std::sync::Arc;
use std::thread;

fn assert_balanced(pool: &ResourcePool) {
    assert!(pool.free() >= 0.0);
    assert_eq!(pool.free() + pool.reserved_total(), pool.total());
}

#[test]
fn reserve_debits_free_only_when_capacity_allows() {
    let pool = ResourcePool::new(300.0);
    assert!(pool.reserve(ProcessId(0), 100.0));
    assert!(pool.reserve(ProcessId(1), 200.0));
    assert_eq!(pool.free(), 0.0);

    assert!(!pool.reserve(ProcessId(2), 1.0));
    assert_eq!(pool.free(), 0.0);
    assert_eq!(pool.reserved(ProcessId(2)), None);
    assert_eq!(pool.reservation_count(), 2);
    assert_balanced(&pool);
}

#[test]
fn capacity_invariant_holds_across_mixed_sequence() {
    let pool = ResourcePool::new(1_000.0);
    let ops: [(u64, Option<f64>); 9] = [
        (0, Some(250.0)),
        (1, Some(500.0)),
        (2, Some(400.0)),
        (0, None),
        (2, Some(400.0)),
        (1, None),
        (1, None),
        (3, Some(350.0)),
        (2, None),
    ];
    for (owner, op) in ops {
        match op {
            Some(amount) => {
                pool.reserve(ProcessId(owner), amount);
            }
            None => {
                pool.release(ProcessId(owner));
            }
        }
        assert_balanced(&pool);
    }
    assert_eq!(pool.reserved(ProcessId(3)), Some(350.0));
    assert_eq!(pool.free(), 650.0);
}

#[test]
fn release_returns_exact_amount_and_second_release_is_noop() {
    let pool = ResourcePool::new(300.0);
    assert!(pool.reserve(ProcessId(7), 120.0));
    assert!(pool.reserve(ProcessId(8), 30.0));

    assert!(pool.release(ProcessId(7)));
    assert_eq!(pool.free(), 270.0);

    assert!(!pool.release(ProcessId(7)));
    assert_eq!(pool.free(), 270.0);
    assert_eq!(pool.reservation_count(), 1);
    assert!(!pool.release(ProcessId(99)));
    assert_balanced(&pool);
}

#[test]
fn repeated_reserve_accumulates_for_same_owner() {
    let pool = ResourcePool::new(100.0);
    assert!(pool.reserve(ProcessId(1), 40.0));
    assert!(pool.reserve(ProcessId(1), 20.0));
    assert_eq!(pool.reserved(ProcessId(1)), Some(60.0));
    assert_eq!(pool.free(), 40.0);

    assert!(pool.release(ProcessId(1)));
    assert_eq!(pool.free(), 100.0);
}

#[test]
fn reserve_rejects_negative_and_non_finite_amounts() {
    let pool = ResourcePool::new(100.0);
    assert!(!pool.reserve(ProcessId(1), -5.0));
    assert!(!pool.reserve(ProcessId(1), f64::NAN));
    assert!(!pool.reserve(ProcessId(1), f64::INFINITY));
    assert_eq!(pool.free(), 100.0);
    assert_eq!(pool.reservation_count(), 0);
}

#[test]
fn usage_fraction_tracks_reservations() {
    let pool = ResourcePool::new(400.0);
    assert_eq!(pool.usage_fraction(), 0.0);
    pool.reserve(ProcessId(0), 100.0);
    assert_eq!(pool.usage_fraction(), 0.25);
    pool.reserve(ProcessId(1), 300.0);
    assert_eq!(pool.usage_fraction(), 1.0);
    pool.release(ProcessId(0));
    pool.release(ProcessId(1));
    assert_eq!(pool.usage_fraction(), 0.0);
}

#[test]
fn last_release_restores_exact_total() {
    let pool = ResourcePool::new(1.0);
    for i in 0..3 {
        assert!(pool.reserve(ProcessId(i), 0.1));
    }
    for i in 0..3 {
        assert!(pool.release(ProcessId(i)));
    }
    assert_eq!(pool.free(), 1.0);
}

#[test]
fn concurrent_reserve_and_release_keep_pool_balanced() {
    let pool = Arc::new(ResourcePool::new(1_000.0));
    let workers: Vec<_> = (0..8_u64)
        .map(|w| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for round in 0..500_u64 {
                    let owner = ProcessId(w * 1_000 + round % 4);
                    if round % 3 == 2 {
                        pool.release(owner);
                    } else {
                        pool.reserve(owner, (w + 1) as f64 * 10.0);
                    }
                    let usage = pool.usage_fraction();
                    assert!((0.0..=1.0).contains(&usage));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().expect("worker panicked");
    }

    assert_balanced(&pool);
    for w in 0..8_u64 {
        for slot in 0..4 {
            pool.release(ProcessId(w * 1_000 + slot));
        }
    }
    assert_eq!(pool.free(), pool.total());
    assert_eq!(pool.reservation_count(), 0);
}
