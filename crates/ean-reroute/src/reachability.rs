//! All-pairs reachability over the collapsed network.
//!
//! Rows are packed into `u64` words, so one Warshall step ORs whole rows:
//!
//! ```text
//! for k in nodes:
//!     for i in nodes with R[i][k]:
//!         R[i] |= R[k]
//! ```
//!
//! The matrix only answers whether *some* walk exists; the router uses it
//! to cut dead branches of its path search.

use crate::CollapsedNetwork;

const WORD: usize = u64::BITS as usize;

/// Square bit matrix, row-major, `words` words per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reachability {
    nodes: usize,
    words: usize,
    bits:  Vec<u64>,
}

impl Reachability {
    /// Empty `nodes × nodes` matrix.
    pub fn new(nodes: usize) -> Self {
        let words = nodes.div_ceil(WORD);
        Self { nodes, words, bits: vec![0; nodes * words] }
    }

    /// Adjacency matrix of `edges`, not yet closed.
    pub fn from_edges<I>(nodes: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut m = Self::new(nodes);
        for (i, j) in edges {
            m.set(i, j);
        }
        m
    }

    /// Transitive closure of the collapsed edges.
    pub fn closure(collapsed: &CollapsedNetwork) -> Self {
        let mut m = Self::from_edges(
            collapsed.node_count(),
            collapsed.edges().iter().map(|e| (e.source, e.target)),
        );
        m.close();
        m
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes == 0
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize) {
        self.bits[i * self.words + j / WORD] |= 1u64 << (j % WORD);
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.bits[i * self.words + j / WORD] & (1u64 << (j % WORD)) != 0
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[u64] {
        &self.bits[i * self.words..(i + 1) * self.words]
    }

    /// Empty row-sized mask for [`reaches_any`](Self::reaches_any).
    pub fn mask(&self) -> Vec<u64> {
        vec![0; self.words]
    }

    /// `true` if row `i` shares a bit with `mask`.
    #[inline]
    pub fn reaches_any(&self, i: usize, mask: &[u64]) -> bool {
        self.row(i).iter().zip(mask).any(|(r, m)| r & m != 0)
    }

    /// Warshall closure in place.
    pub fn close(&mut self) {
        let w = self.words;
        for k in 0..self.nodes {
            for i in 0..self.nodes {
                if i == k || !self.get(i, k) {
                    continue;
                }
                for word in 0..w {
                    let from_k = self.bits[k * w + word];
                    self.bits[i * w + word] |= from_k;
                }
            }
        }
    }

    /// Number of set entries.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}

/// Set bit `j` of a row-sized mask.
#[inline]
pub fn mark(mask: &mut [u64], j: usize) {
    mask[j / WORD] |= 1u64 << (j % WORD);
}

/// `true` if bit `j` of a row-sized mask is set.
#[inline]
pub fn marked(mask: &[u64], j: usize) -> bool {
    mask[j / WORD] & (1u64 << (j % WORD)) != 0
}
