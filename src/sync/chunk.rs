//! Bounded, ordered partitioning of an id list.

/// One group of items processed by a single remote call.
#[derive(Debug, PartialEq, Eq)]
pub struct Chunk<'a, T> {
    /// 1-based position of this chunk.
    pub index: usize,
    pub total_chunks: usize,
    pub items: &'a [T],
}

/// Iterator over consecutive, non-overlapping chunks of at most `size` items.
#[derive(Debug, Clone)]
pub struct Chunks<'a, T> {
    inner: std::iter::Enumerate<std::slice::Chunks<'a, T>>,
    total_chunks: usize,
}

/// Split `items` into chunks of at most `size` items. A size of zero is treated as one.
pub fn chunks<T>(items: &[T], size: usize) -> Chunks<'_, T> {
    let size = size.max(1);
    Chunks {
        inner: items.chunks(size).enumerate(),
        total_chunks: items.len().div_ceil(size),
    }
}

impl<'a, T> Chunks<'a, T> {
    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }
}

impl<'a, T> Iterator for Chunks<'a, T> {
    type Item = Chunk<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (pos, items) = self.inner.next()?;
        Some(Chunk {
            index: pos + 1,
            total_chunks: self.total_chunks,
            items,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Chunks<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_bounded_chunks() {
        let ids: Vec<u64> = (1..=45).collect();
        let sizes: Vec<usize> = chunks(&ids, 20).map(|c| c.items.len()).collect();
        assert_eq!(sizes, vec![20, 20, 5]);
    }

    #[test]
    fn chunks_are_ordered_and_cover_every_item() {
        let ids: Vec<u64> = (1..=7).collect();
        let all: Vec<u64> = chunks(&ids, 3).flat_map(|c| c.items.iter().copied()).collect();
        assert_eq!(all, ids);
    }

    #[test]
    fn reports_index_and_total() {
        let ids = [1, 2, 3];
        let collected: Vec<(usize, usize)> = chunks(&ids, 2)
            .map(|c| (c.index, c.total_chunks))
            .collect();
        assert_eq!(collected, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let ids: [u64; 0] = [];
        let iter = chunks(&ids, 20);
        assert_eq!(iter.total_chunks(), 0);
        assert_eq!(iter.count(), 0);
    }

    #[test]
    fn zero_size_is_treated_as_one() {
        let ids = [1, 2];
        assert_eq!(chunks(&ids, 0).len(), 2);
    }
}
