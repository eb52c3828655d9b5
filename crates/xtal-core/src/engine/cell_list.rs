//! Linked-cell list over a periodic grid of fractional positions.

use nalgebra::{Point3, Vector3};

/// The smallest number of cells per axis for which the half-space stencil visits every
/// pair exactly once.
pub const MINIMUM_CELLS_PER_AXIS: usize = 3;

/// Zero offset followed by the 13 offsets of one half of the 26-neighbourhood.
const STENCIL: [[i64; 3]; 14] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [-1, 0, 1],
    [0, 0, 1],
    [1, 0, 1],
    [-1, 1, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// A spatial hash bucketing atoms into cells no thinner than the interaction cutoff.
///
/// Buckets are singly linked lists threaded through `next`, with `head` holding the
/// most recently inserted atom of each cell.
#[derive(Debug, Clone)]
pub struct CellList {
    number_of_cells: [usize; 3],
    head: Vec<Option<usize>>,
    next: Vec<Option<usize>>,
    home: Vec<usize>,
}

impl CellList {
    /// Buckets positions given in wrapped fractional coordinates.
    ///
    /// # Arguments
    ///
    /// * `fractional` - Positions in `[0, 1)` of the grid frame.
    /// * `widths` - Perpendicular widths of the grid frame along each axis.
    /// * `cutoff` - Interaction cutoff; cells are at least this thick.
    ///
    /// # Return
    ///
    /// `None` if any axis would have fewer than [`MINIMUM_CELLS_PER_AXIS`] cells, in which
    /// case callers fall back to a pairwise scan.
    pub fn build(fractional: &[Point3<f64>], widths: &Vector3<f64>, cutoff: f64) -> Option<Self> {
        if cutoff.is_nan() || cutoff <= 0.0 {
            return None;
        }
        let mut number_of_cells = [0usize; 3];
        for axis in 0..3 {
            let count = (widths[axis] / cutoff).floor();
            if !count.is_finite() || count < MINIMUM_CELLS_PER_AXIS as f64 {
                return None;
            }
            number_of_cells[axis] = count as usize;
        }

        let total = number_of_cells.iter().product();
        let mut list = Self {
            number_of_cells,
            head: vec![None; total],
            next: vec![None; fractional.len()],
            home: vec![0; fractional.len()],
        };
        for (atom, position) in fractional.iter().enumerate() {
            let cell = list.cell_of(position);
            list.home[atom] = cell;
            list.next[atom] = list.head[cell];
            list.head[cell] = Some(atom);
        }
        Some(list)
    }

    pub fn number_of_cells(&self) -> [usize; 3] {
        self.number_of_cells
    }

    pub fn total_cells(&self) -> usize {
        self.head.len()
    }

    /// The cell an atom was bucketed into.
    pub fn home_cell(&self, atom: usize) -> usize {
        self.home[atom]
    }

    fn cell_of(&self, fractional: &Point3<f64>) -> usize {
        let mut index = [0usize; 3];
        for axis in 0..3 {
            let n = self.number_of_cells[axis];
            let k = (fractional[axis] * n as f64).floor();
            index[axis] = (k.max(0.0) as usize).min(n - 1);
        }
        self.flatten(index)
    }

    fn flatten(&self, [i, j, k]: [usize; 3]) -> usize {
        let [nx, ny, _] = self.number_of_cells;
        (k * ny + j) * nx + i
    }

    fn unflatten(&self, cell: usize) -> [usize; 3] {
        let [nx, ny, _] = self.number_of_cells;
        [cell % nx, (cell / nx) % ny, cell / (nx * ny)]
    }

    fn members(&self, cell: usize) -> CellMembers<'_> {
        CellMembers {
            next: &self.next,
            cursor: self.head[cell],
        }
    }

    /// Visits every candidate pair whose first atom lives in `cell`.
    ///
    /// Across all cells each unordered pair of atoms in neighbouring cells is visited
    /// exactly once, as `(min, max)`.
    pub fn visit_cell<F: FnMut(usize, usize)>(&self, cell: usize, mut visit: F) {
        let origin = self.unflatten(cell);
        for offset in STENCIL {
            let mut neighbour = [0usize; 3];
            for axis in 0..3 {
                let n = self.number_of_cells[axis] as i64;
                neighbour[axis] = ((origin[axis] as i64 + offset[axis] + n) % n) as usize;
            }
            let neighbour = self.flatten(neighbour);

            for i in self.members(cell) {
                for j in self.members(neighbour) {
                    if i == j {
                        continue;
                    }
                    if i < j || self.home[i] != self.home[j] {
                        visit(i.min(j), i.max(j));
                    }
                }
            }
        }
    }
}

struct CellMembers<'a> {
    next: &'a [Option<usize>],
    cursor: Option<usize>,
}

impl Iterator for CellMembers<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.cursor?;
        self.cursor = self.next[current];
        Some(current)
    }
}
