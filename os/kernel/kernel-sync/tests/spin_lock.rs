use kernel_sync::SpinLock;
use std::{sync::Arc, thread};

#[test]
fn guard_releases_on_drop() {
    let lock = SpinLock::new([0u8; 4]);
    {
        let mut line = lock.lock();
        line[0] = b'x';
    }
    assert_eq!(lock.lock()[0], b'x');
}

#[test]
fn try_lock_fails_while_held() {
    let lock = SpinLock::new(0usize);
    let held = lock.try_lock().unwrap();
    assert!(lock.try_lock().is_none());
    drop(held);
    assert!(lock.try_lock().is_some());
}

#[test]
fn with_lock_returns_closure_result() {
    let lock = SpinLock::new(Vec::<u8>::new());
    let len = lock.with_lock(|buf| {
        buf.extend_from_slice(b"EXIT");
        buf.len()
    });
    assert_eq!(len, 4);
    assert_eq!(lock.with_lock(|buf| buf.clone()), b"EXIT");
}

#[test]
fn excludes_concurrent_writers() {
    let lock = Arc::new(SpinLock::new(0u64));
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    lock.with_lock(|n| *n += 1);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(*lock.lock(), 40_000);
}
