//! ThreadPool execution, failure isolation, and shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use taskline::pool::PoolState;
use taskline::{PoolError, ThreadPool};

#[test]
fn test_failing_task_does_not_affect_others() {
    let pool = ThreadPool::new(2, "isolation").unwrap();

    let bad = pool
        .submit(|| -> u32 { panic!("task exploded") })
        .unwrap();
    let good = pool.submit(|| 40 + 2).unwrap();

    assert_eq!(good.get(), Ok(42));
    assert_eq!(
        bad.get(),
        Err(PoolError::TaskPanicked("task exploded".into()))
    );

    // The worker that ran the panicking task is still serving.
    let after: Vec<_> = (0..8).map(|i| pool.submit(move || i * 2).unwrap()).collect();
    let results: Vec<_> = after.into_iter().map(|h| h.get().unwrap()).collect();
    assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14]);
}

#[test]
fn test_shutdown_drains_queued_tasks() {
    let pool = ThreadPool::new(2, "drain").unwrap();
    let ran = Arc::new(AtomicUsize::new(0));
    let k = 50;

    let handles: Vec<_> = (0..k)
        .map(|i| {
            let ran = Arc::clone(&ran);
            pool.submit(move || {
                thread::sleep(Duration::from_millis(2));
                ran.fetch_add(1, Ordering::SeqCst);
                i
            })
            .unwrap()
        })
        .collect();

    pool.shutdown();

    // Every task ran before shutdown returned.
    assert_eq!(ran.load(Ordering::SeqCst), k);
    assert_eq!(pool.state(), PoolState::Stopped);
    assert_eq!(pool.pending_count(), 0);

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.get(), Ok(i));
    }
}

#[test]
fn test_tasks_run_concurrently_on_all_workers() {
    let workers = 4;
    let pool = ThreadPool::new(workers, "parallel").unwrap();
    // Only passes if `workers` tasks are running at the same time.
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            pool.submit(move || barrier.wait().is_leader()).unwrap()
        })
        .collect();

    let leaders = handles
        .into_iter()
        .map(|h| h.get().unwrap())
        .filter(|is_leader| *is_leader)
        .count();
    assert_eq!(leaders, 1);
}

#[test]
fn test_submit_after_shutdown_fails_synchronously() {
    let pool = ThreadPool::new(1, "stopped").unwrap();
    pool.shutdown();

    let err = pool.submit(|| 1).unwrap_err();
    assert_eq!(err, PoolError::Stopped);
}

#[test]
fn test_concurrent_submitters_and_shutdown() {
    let pool = Arc::new(ThreadPool::new(3, "race").unwrap());
    let ran = Arc::new(AtomicUsize::new(0));

    let submitters: Vec<_> = (0..4)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let ran = Arc::clone(&ran);
            thread::spawn(move || {
                let mut accepted = Vec::new();
                for _ in 0..200 {
                    let ran = Arc::clone(&ran);
                    match pool.submit(move || {
                        ran.fetch_add(1, Ordering::SeqCst);
                    }) {
                        Ok(handle) => accepted.push(handle),
                        Err(e) => {
                            assert!(e.is_stopped());
                            break;
                        }
                    }
                }
                accepted
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(1));
    pool.shutdown();

    let mut accepted = 0;
    for submitter in submitters {
        for handle in submitter.join().unwrap() {
            // Accepted work always runs; nothing is stranded behind shutdown.
            assert_eq!(handle.get(), Ok(()));
            accepted += 1;
        }
    }
    assert_eq!(ran.load(Ordering::SeqCst), accepted);
    assert_eq!(pool.stats().submitted as usize, accepted);
}

#[test]
fn test_drop_joins_workers() {
    let ran = Arc::new(AtomicUsize::new(0));
    {
        let pool = ThreadPool::new(2, "dropped").unwrap();
        for _ in 0..10 {
            let ran = Arc::clone(&ran);
            pool.submit(move || {
                thread::sleep(Duration::from_millis(1));
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    }
    assert_eq!(ran.load(Ordering::SeqCst), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_await_handles_from_async_code() {
    let pool = ThreadPool::new(2, "async").unwrap();

    let sum = pool.execute(|| (1..=10).sum::<u32>()).await;
    assert_eq!(sum, Ok(55));

    let handles: Vec<_> = (0..5).map(|i| pool.submit(move || i * i).unwrap()).collect();
    let squares: Vec<_> = futures_util::future::join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(squares, vec![0, 1, 4, 9, 16]);
}

#[test]
fn test_block_on_handle_with_tokio_test() {
    let pool = ThreadPool::new(1, "block-on").unwrap();
    let handle = pool.submit(|| "done").unwrap();
    assert_eq!(tokio_test::block_on(handle), Ok("done"));
}
