//! ConcurrentQueue behavior across threads.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use taskline::ConcurrentQueue;

const PRODUCERS: usize = 4;
const PER_PRODUCER: usize = 2_500;

#[test]
fn test_fifo_for_completed_pushes() {
    let queue = ConcurrentQueue::new();
    let items: Vec<u32> = (0..1_000).collect();
    for &item in &items {
        queue.push(item);
    }

    let mut popped = Vec::with_capacity(items.len());
    while let Some(item) = queue.try_pop() {
        popped.push(item);
    }
    assert_eq!(popped, items);
}

#[test]
fn test_per_producer_order_is_preserved() {
    let queue = Arc::new(ConcurrentQueue::new());

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push((p, i));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let mut last_seen = vec![None; PRODUCERS];
    while let Some((p, i)) = queue.try_pop() {
        if let Some(prev) = last_seen[p] {
            assert!(i > prev, "producer {} went backwards: {} after {}", p, i, prev);
        }
        last_seen[p] = Some(i);
    }
    assert!(last_seen.iter().all(|l| *l == Some(PER_PRODUCER - 1)));
}

#[test]
fn test_no_loss_or_duplication_with_mixed_consumers() {
    let queue = Arc::new(ConcurrentQueue::new());
    let producers_done = Arc::new(AtomicBool::new(false));
    let total = PRODUCERS * PER_PRODUCER;

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push(p * PER_PRODUCER + i);
                }
            })
        })
        .collect();

    // One consumer per pop flavor; each stops once producers are done and
    // the queue is empty.
    let consumers: Vec<_> = (0..3)
        .map(|kind| {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&producers_done);
            thread::spawn(move || {
                let mut seen = Vec::new();
                loop {
                    let item = match kind {
                        0 => queue.try_pop(),
                        1 => queue.try_pop_timed(Duration::from_millis(5)),
                        _ => {
                            if queue.is_empty() {
                                None
                            } else {
                                queue.try_pop_timed(Duration::from_millis(1))
                            }
                        }
                    };
                    match item {
                        Some(item) => seen.push(item),
                        None if done.load(Ordering::SeqCst) && queue.is_empty() => break,
                        None => thread::yield_now(),
                    }
                }
                seen
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    producers_done.store(true, Ordering::SeqCst);

    let mut all = HashSet::with_capacity(total);
    let mut count = 0;
    for consumer in consumers {
        for item in consumer.join().unwrap() {
            count += 1;
            assert!(all.insert(item), "item {} popped twice", item);
        }
    }
    assert_eq!(count, total);
    assert_eq!(all.len(), total);
}

#[test]
fn test_blocking_consumers_receive_everything() {
    let queue = Arc::new(ConcurrentQueue::new());
    let total = 1_000;

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut seen = Vec::new();
                // None is the end-of-stream marker, one per consumer.
                while let Some(item) = queue.pop_blocking() {
                    seen.push(item);
                }
                seen
            })
        })
        .collect();

    for i in 0..total {
        queue.push(Some(i));
    }
    for _ in 0..4 {
        queue.push(None);
    }

    let mut all: Vec<_> = consumers
        .into_iter()
        .flat_map(|c| c.join().unwrap())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..total).collect::<Vec<_>>());
}

#[test]
fn test_try_pop_on_empty_queue_does_not_block() {
    let queue: ConcurrentQueue<u64> = ConcurrentQueue::new();

    let start = Instant::now();
    for _ in 0..100 {
        assert!(queue.try_pop().is_none());
    }
    // 100 uncontended lock round-trips; generous bound for loaded CI hosts.
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[test]
fn test_timed_pop_respects_deadline() {
    let queue: ConcurrentQueue<u64> = ConcurrentQueue::new();
    let timeout = Duration::from_millis(100);

    let start = Instant::now();
    assert!(queue.try_pop_timed(timeout).is_none());
    let elapsed = start.elapsed();

    assert!(elapsed >= timeout, "returned early after {:?}", elapsed);
    assert!(
        elapsed < timeout + Duration::from_millis(250),
        "overslept: {:?}",
        elapsed
    );
}
