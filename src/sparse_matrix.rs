use std::collections::BTreeMap;

use crate::graph::{VInt, Weight};

/// Sparse square weight matrix keyed by a packed `(x, y)` pair.
///
/// Zero entries are kept until iteration is requested, then dropped in one
/// pass. Keys are ordered, so iteration is row-major and deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseWeightMatrix {
    map: BTreeMap<u64, Weight>, // Packed key -> weight.
    size: u64, // Dimension used for key packing, larger than any id.
    compressed: bool, // No zero entries since the last compression.
}

impl SparseWeightMatrix {
    /// Create an empty matrix able to hold ids in `0..size`.
    pub fn new(size: usize) -> Self {
        Self {
            map: BTreeMap::new(),
            size: size as u64,
            compressed: true,
        }
    }

    /// Row stride of the packed keys, at least 1 so an empty matrix still
    /// packs and unpacks.
    #[inline]
    fn stride(&self) -> u64 {
        self.size.max(1)
    }

    #[inline]
    fn key(&self, x: VInt, y: VInt) -> u64 {
        x as u64 * self.stride() + y as u64
    }

    #[inline]
    fn unpack(&self, key: u64) -> (VInt, VInt) {
        let stride = self.stride();
        ((key / stride) as VInt, (key % stride) as VInt)
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Weight stored at `(x, y)`, zero when absent.
    pub fn get(&self, x: VInt, y: VInt) -> Weight {
        self.map.get(&self.key(x, y)).copied().unwrap_or(0)
    }

    /// Whether an entry (possibly zero) has been written at `(x, y)`.
    pub fn contains(&self, x: VInt, y: VInt) -> bool {
        self.map.contains_key(&self.key(x, y))
    }

    pub fn set(&mut self, x: VInt, y: VInt, weight: Weight) {
        let key = self.key(x, y);
        self.map.insert(key, weight);
        self.compressed = false;
    }

    pub fn add(&mut self, x: VInt, y: VInt, delta: Weight) {
        let key = self.key(x, y);
        *self.map.entry(key).or_insert(0) += delta;
        self.compressed = false;
    }

    /// Number of stored entries, zeros included until the next compression.
    pub fn stored_len(&self) -> usize {
        self.map.len()
    }

    fn compress(&mut self) {
        if !self.compressed {
            self.map.retain(|_, weight| *weight != 0);
            self.compressed = true;
        }
    }

    /// Drop zero entries, then iterate the remaining `(x, y, weight)` triples.
    pub fn compress_and_iter(&mut self) -> impl Iterator<Item = (VInt, VInt, Weight)> + '_ {
        self.compress();
        let stride = self.stride();
        self.map
            .iter()
            .map(move |(key, weight)| ((key / stride) as VInt, (key % stride) as VInt, *weight))
    }

    /// Check `get(x, y) == get(y, x)` for every stored entry.
    pub fn is_symmetric(&self) -> bool {
        self.map.iter().all(|(key, weight)| {
            let (x, y) = self.unpack(*key);
            self.get(y, x) == *weight
        })
    }
}
