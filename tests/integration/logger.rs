//! AsyncLogger ordering and shutdown behavior, end to end.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use taskline::logger::{AsyncLogger, LineFormat, LoggerState, DEFAULT_POLL_INTERVAL};
use taskline::{log_fn, Level};

use crate::helpers::{read_lines, SlowSink};

const RECORDS: usize = 1_000;

#[test]
fn test_ordering_with_slow_sink() {
    let sink = SlowSink::new(Duration::from_millis(20));
    let logger = AsyncLogger::with_sink(sink.clone(), LineFormat::Text, DEFAULT_POLL_INTERVAL)
        .unwrap();

    logger.info("A");
    logger.info("B");
    logger.info("C");
    logger.stop();

    let lines = sink.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("INFO: A"));
    assert!(lines[1].ends_with("INFO: B"));
    assert!(lines[2].ends_with("INFO: C"));
}

#[test]
fn test_stop_writes_every_record_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stop.log");

    let logger = AsyncLogger::new(&path).unwrap();
    for i in 0..RECORDS {
        logger.info(i);
    }
    logger.stop();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), RECORDS);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.ends_with(&format!("INFO: {}", i)), "line {}: {}", i, line);
    }
    assert_eq!(logger.written(), RECORDS as u64);
}

#[test]
fn test_drop_drains_like_stop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drop.log");

    {
        let logger = AsyncLogger::new(&path).unwrap();
        for i in 0..RECORDS {
            logger.debug(i);
        }
    }

    assert_eq!(read_lines(&path).len(), RECORDS);
}

#[test]
fn test_kill_may_abandon_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kill.log");

    let logger = AsyncLogger::new(&path).unwrap();
    for i in 0..RECORDS {
        logger.warn(i);
    }
    logger.kill();
    logger.error("after kill");
    logger.stop();

    let lines = read_lines(&path);
    assert!(lines.len() <= RECORDS);
    assert!(lines.iter().all(|l| !l.contains("after kill")));
    assert_eq!(logger.dropped(), 1);
    assert_eq!(logger.state(), LoggerState::Stopped);
}

#[test]
fn test_concurrent_producers_keep_their_own_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("producers.log");
    let logger = Arc::new(AsyncLogger::new(&path).unwrap());
    let producers = 4;
    let per_producer = 250;

    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..per_producer {
                    logger.log(Level::Info, format_args!("{}:{}", p, i), Some("producer"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.stop();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), producers * per_producer);

    let mut next = vec![0; producers];
    for line in &lines {
        let payload = line.rsplit("producer: ").next().unwrap();
        let (p, i) = payload.split_once(':').unwrap();
        let (p, i): (usize, usize) = (p.parse().unwrap(), i.parse().unwrap());
        assert_eq!(i, next[p], "producer {} out of order", p);
        next[p] += 1;
    }
}

#[test]
fn test_truncate_and_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("json.log");
    std::fs::write(&path, "stale line from an earlier run\n").unwrap();

    let logger = AsyncLogger::builder(&path)
        .truncate(true)
        .format(LineFormat::Json)
        .poll_interval(Duration::from_millis(5))
        .build()
        .unwrap();

    log_fn!(logger, Level::Fatal, "disk {} full", "/dev/sda1");
    logger.stop();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["level"], "FATAL");
    assert_eq!(value["msg"], "disk /dev/sda1 full");
    assert!(value["function"]
        .as_str()
        .unwrap()
        .ends_with("test_truncate_and_json_lines"));
}

#[test]
fn test_unwritable_sink_never_crashes_logger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("app.log");

    let logger = AsyncLogger::new(&path).unwrap();
    for i in 0..10 {
        logger.error(i);
    }
    logger.stop();

    assert_eq!(logger.written(), 0);
    assert_eq!(logger.write_failures(), 10);
}
