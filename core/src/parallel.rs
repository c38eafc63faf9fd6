use lazy_static::lazy_static;
use rayon::{ThreadPool, ThreadPoolBuilder};

lazy_static! {
    static ref POOL: Option<ThreadPool> = {
        match ThreadPoolBuilder::new()
            .num_threads(worker_count())
            .thread_name(|i| format!("search-worker-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(err) => {
                tracing::warn!(%err, "failed to build search worker pool, using rayon global pool");
                None
            }
        }
    };
}

/// Hardware concurrency, never less than two.
pub fn worker_count() -> usize { num_cpus::get().max(2) }

/// Run `op` inside the search worker pool and block until it returns.
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match POOL.as_ref() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Shard count for the relevance map of one parallel ranking call.
pub fn relevance_shard_count() -> usize { worker_count() * 8 }

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn pool_runs_parallel_work_to_completion() {
        let sum: u64 = install(|| (1..=1000u64).into_par_iter().sum());
        assert_eq!(sum, 500_500);
        assert!(worker_count() >= 2);
    }
}
