//! Per-item evaluation for point and cell accumulations.
//!
//! Items are evaluated independently (in parallel with the `parallel`
//! feature) and collected in index order; callers then fold the results
//! sequentially, so sums are bit-identical with and without the feature.

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        use rayon::prelude::*;

        pub(crate) fn map_indices<T, F>(count: usize, f: F) -> Vec<T>
        where
            T: Send,
            F: Fn(usize) -> T + Sync + Send,
        {
            (0..count).into_par_iter().map(f).collect()
        }
    } else {
        pub(crate) fn map_indices<T, F>(count: usize, f: F) -> Vec<T>
        where
            T: Send,
            F: Fn(usize) -> T + Sync + Send,
        {
            (0..count).map(f).collect()
        }
    }
}
