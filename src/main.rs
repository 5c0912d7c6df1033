use std::sync::Arc;

use tracing::{error, info, warn};

use taskline::config::parse::env_parse;
use taskline::config::Config;
use taskline::logger::{AsyncLogger, Level};
use taskline::{log_fn, ThreadPool};

/// Number of demo tasks when DEMO_TASKS is unset.
const DEFAULT_DEMO_TASKS: u64 = 32;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    taskline::logging::init(&config.logging)?;

    info!("Starting taskline {}", taskline::version());
    config.log_summary();

    let tasks: u64 = env_parse("DEMO_TASKS", DEFAULT_DEMO_TASKS)?;

    let logger = Arc::new(AsyncLogger::from_config(&config.logger)?);
    let pool = ThreadPool::from_config(&config.pool)?;

    log_fn!(logger, Level::Info, "submitting {} tasks to {} workers", tasks, pool.worker_count());

    let handles = (1..=tasks)
        .map(|n| {
            let logger = Arc::clone(&logger);
            pool.submit(move || {
                // One task fails on purpose to show that failures stay isolated.
                if n == tasks / 2 {
                    panic!("task {} refused to run", n);
                }
                let value = collatz_steps(n);
                logger.debug(format_args!("task {} finished: {} steps", n, value));
                value
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut total = 0;
    for (n, handle) in (1..=tasks).zip(handles) {
        match handle.get() {
            Ok(steps) => total += steps,
            Err(e) => {
                warn!(task = n, error = %e, "task failed");
                logger.log(Level::Error, format_args!("task {} failed: {}", n, e), Some("main"));
            }
        }
    }

    pool.shutdown();
    let stats = pool.stats();
    info!(
        submitted = stats.submitted,
        completed = stats.completed,
        panicked = stats.panicked,
        avg_exec_us = stats.avg_exec_time_us,
        "pool drained"
    );

    logger.info(format_args!("total collatz steps: {}", total));
    logger.stop();

    if logger.write_failures() > 0 {
        error!(
            failures = logger.write_failures(),
            file = %config.logger.file.display(),
            "some log records could not be written"
        );
    }
    info!(
        written = logger.written(),
        file = %config.logger.file.display(),
        "logger stopped"
    );

    Ok(())
}

/// Steps for `n` to reach 1 under the Collatz map.
fn collatz_steps(mut n: u64) -> u64 {
    let mut steps = 0;
    while n > 1 {
        n = if n % 2 == 0 { n / 2 } else { 3 * n + 1 };
        steps += 1;
    }
    steps
}
