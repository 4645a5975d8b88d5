//! Concurrency helper: limit the number of datasets processed in parallel.

use anyhow::Result;
use rayon::prelude::*;

/// Process work items with at most `limit` in flight. `limit <= 1` runs
/// fully sequentially, completing each item's I/O before the next starts.
/// On error no further items are started; items already running finish.
pub fn for_each_limited<T, F>(items: &[T], limit: usize, f: F) -> Result<()>
where
    T: Sync,
    F: Sync + Fn(&T) -> Result<()>,
{
    if limit <= 1 {
        for item in items {
            f(item)?;
        }
        return Ok(());
    }
    for chunk in items.chunks(limit) {
        chunk.par_iter().try_for_each(|item| f(item))?;
    }
    Ok(())
}
