//! Conditional parallel iteration.
//!
//! Uses rayon when the `parallel` feature is enabled and the caller asks for
//! it; otherwise runs sequentially. Results are always gathered in input
//! order.

use crate::error::CurveResult;

/// Maps a fallible function over items, conditionally in parallel.
///
/// Returns the first error in input order.
#[allow(unused_variables)]
pub(crate) fn maybe_parallel_try_map<T, U, F>(items: &[T], parallel: bool, f: F) -> CurveResult<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> CurveResult<U> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if parallel && items.len() > 1 {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}
