use crate::dataset::{Dataset, DatasetRow};
use rand::{seq::index, Rng};

/// Draw up to `k` distinct rows uniformly at random, without replacement.
/// Asking for more rows than the dataset holds returns every row, shuffled.
pub fn sample_rows<'a, R: Rng + ?Sized>(
    dataset: &'a Dataset,
    k: usize,
    rng: &mut R,
) -> Vec<&'a DatasetRow> {
    let rows = dataset.rows();
    let amount = k.min(rows.len());
    index::sample(rng, rows.len(), amount)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}
