/// Square matrix indexed by `[observer][target]` slot pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairMatrix<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone + Default> PairMatrix<T> {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![T::default(); size * size],
        }
    }

    /// Number of slots along each side.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.size && j < self.size {
            self.cells.get(i * self.size + j)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut T> {
        if i < self.size && j < self.size {
            self.cells.get_mut(i * self.size + j)
        } else {
            None
        }
    }

    /// Grow to `size` slots per side, keeping existing entries in place.
    /// Never shrinks.
    pub fn grow(&mut self, size: usize) {
        if size <= self.size {
            return;
        }
        let mut cells = vec![T::default(); size * size];
        for i in 0..self.size {
            let old = &self.cells[i * self.size..(i + 1) * self.size];
            cells[i * size..i * size + self.size].clone_from_slice(old);
        }
        self.size = size;
        self.cells = cells;
    }

    /// Iterate `(observer, target, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(k, v)| (k / size, k % size, v))
    }

    /// Every cell, in row order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_none() {
        let mut m: PairMatrix<u32> = PairMatrix::new(2);
        assert!(m.get(2, 0).is_none());
        assert!(m.get_mut(0, 5).is_none());
    }

    #[test]
    fn grow_preserves_entries() {
        let mut m: PairMatrix<u32> = PairMatrix::new(2);
        *m.get_mut(0, 1).unwrap() = 7;
        *m.get_mut(1, 0).unwrap() = 9;
        m.grow(4);
        assert_eq!(m.size(), 4);
        assert_eq!(m.get(0, 1), Some(&7));
        assert_eq!(m.get(1, 0), Some(&9));
        assert_eq!(m.get(3, 3), Some(&0));
        m.grow(1);
        assert_eq!(m.size(), 4);
    }

    #[test]
    fn iter_yields_coordinates() {
        let mut m: PairMatrix<u32> = PairMatrix::new(3);
        *m.get_mut(2, 1).unwrap() = 1;
        let hits: Vec<_> = m.iter().filter(|(_, _, v)| **v > 0).map(|(i, j, _)| (i, j)).collect();
        assert_eq!(hits, vec![(2, 1)]);
    }
}
