use alloc::vec::Vec;
use core::iter::FusedIterator;

/// Lockstep walk over every slice orthogonal to one axis of `K` strided buffers.
///
/// Each item holds the element offset of the slice's first element in each buffer. The
/// buffers share the extents of every axis except the filtered one, which is skipped. Items
/// are produced in row-major order over the remaining axes.
#[derive(Debug, Clone)]
pub(crate) struct SliceIter<const K: usize> {
    extents: Vec<usize>,
    strides: [Vec<isize>; K],
    origins: [usize; K],
    index: Vec<usize>,
    offsets: [isize; K],
    total: usize,
    remaining: usize,
}

impl<const K: usize> SliceIter<K> {
    /// `shape` is the shape of the filtered input; `strides[k]` and `origins[k]` describe
    /// buffer `k` in elements.
    pub(crate) fn new(
        shape: &[usize],
        axis: usize,
        strides: [&[isize]; K],
        origins: [usize; K],
    ) -> Self {
        let extents: Vec<usize> = shape
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != axis)
            .map(|(_, &n)| n)
            .collect();
        let strides = strides.map(|s| {
            s.iter()
                .enumerate()
                .filter(|(k, _)| *k != axis)
                .map(|(_, &st)| st)
                .collect::<Vec<_>>()
        });
        let total = extents.iter().product();
        let index = alloc::vec![0; extents.len()];
        Self {
            extents,
            strides,
            origins,
            index,
            offsets: origins.map(|o| o as isize),
            total,
            remaining: total,
        }
    }

    /// Restart from the first slice.
    pub(crate) fn reset(&mut self) {
        self.index.fill(0);
        self.offsets = self.origins.map(|o| o as isize);
        self.remaining = self.total;
    }

    fn advance(&mut self) {
        for d in (0..self.extents.len()).rev() {
            self.index[d] += 1;
            for k in 0..K {
                self.offsets[k] += self.strides[k][d];
            }
            if self.index[d] < self.extents[d] {
                return;
            }
            let span = self.extents[d] as isize;
            for k in 0..K {
                self.offsets[k] -= self.strides[k][d] * span;
            }
            self.index[d] = 0;
        }
    }
}

impl<const K: usize> Iterator for SliceIter<K> {
    type Item = [usize; K];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.offsets.map(|o| o as usize);
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const K: usize> ExactSizeIterator for SliceIter<K> {}

impl<const K: usize> FusedIterator for SliceIter<K> {}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::{vec, vec::Vec};

    #[test]
    fn visits_every_slice_once() {
        // C-order (2, 3, 4), filtering axis 1
        let strides: &[isize] = &[12, 4, 1];
        let it = SliceIter::new(&[2, 3, 4], 1, [strides], [0]);
        assert_eq!(it.len(), 8);
        let bases: Vec<usize> = it.map(|[o]| o).collect();
        assert_eq!(bases, vec![0, 1, 2, 3, 12, 13, 14, 15]);
    }

    #[test]
    fn buffers_advance_in_lockstep() {
        // x is Fortran-ordered (3, 2), y is C-ordered, filtering axis 0
        let xs: &[isize] = &[1, 3];
        let ys: &[isize] = &[2, 1];
        let items: Vec<[usize; 2]> = SliceIter::new(&[3, 2], 0, [xs, ys], [0, 0]).collect();
        assert_eq!(items, vec![[0, 0], [3, 1]]);
    }

    #[test]
    fn negative_strides_walk_down_from_origin() {
        // (2, 3) view reversed on axis 0 over a C-order buffer, filtering axis 1
        let s: &[isize] = &[-3, 1];
        let items: Vec<[usize; 1]> = SliceIter::new(&[2, 3], 1, [s], [3]).collect();
        assert_eq!(items, vec![[3], [0]]);
    }

    #[test]
    fn zero_strides_revisit_the_same_slice() {
        let xs: &[isize] = &[4, 1];
        let zs: &[isize] = &[0, 1];
        let items: Vec<[usize; 2]> = SliceIter::new(&[3, 4], 1, [xs, zs], [0, 0]).collect();
        assert_eq!(items, vec![[0, 0], [4, 0], [8, 0]]);
    }

    #[test]
    fn one_dimensional_input_has_a_single_slice() {
        let s: &[isize] = &[1];
        let mut it = SliceIter::new(&[10], 0, [s], [0]);
        assert_eq!(it.next(), Some([0]));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn empty_extent_yields_nothing_and_reset_restarts() {
        let s: &[isize] = &[0, 1];
        assert_eq!(SliceIter::new(&[0, 5], 1, [s], [0]).count(), 0);

        let s: &[isize] = &[3, 1];
        let mut it = SliceIter::new(&[2, 3], 1, [s], [0]);
        let first: Vec<_> = it.by_ref().collect();
        assert_eq!(it.len(), 0);
        it.reset();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![[0], [3]]);
    }
}
