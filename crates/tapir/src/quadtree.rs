//! Barnes-Hut quadtree stored as a flat arena of cells.
//!
//! The tree is rebuilt from scratch every tick. Cells refer to each other through `u32` handles
//! into `QuadTree::cells`, and points that share a leaf are chained through `QuadTree::next`, so
//! a rebuild reuses the previous tick's allocations instead of growing a pointer tree.

use crate::graph::Node;

pub type CellId = u32;

const NONE: u32 = u32::MAX;

/// Leaves stop splitting below this depth; nearly coincident points share a bucket instead.
const MAX_DEPTH: u32 = 32;

#[derive(Debug, Clone, Copy)]
pub struct Cell {
    x0: f64,
    y0: f64,
    size: f64,
    children: [CellId; 4],
    // First point of a leaf bucket; `NONE` for internal cells and the empty root.
    head: u32,
    charge: f64,
    cx: f64,
    cy: f64,
}

impl Cell {
    fn new(x0: f64, y0: f64, size: f64) -> Self {
        Self {
            x0,
            y0,
            size,
            children: [NONE; 4],
            head: NONE,
            charge: 0.0,
            cx: 0.0,
            cy: 0.0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|&c| c == NONE)
    }

    /// Side length of the (square) cell.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Sum of the charges of every point below this cell.
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Charge-weighted centre of mass.
    pub fn centroid(&self) -> (f64, f64) {
        (self.cx, self.cy)
    }

    pub fn children(&self) -> impl Iterator<Item = CellId> + '_ {
        self.children.iter().copied().filter(|&c| c != NONE)
    }

    fn quadrant(&self, x: f64, y: f64) -> usize {
        let half = self.size / 2.0;
        let right = x >= self.x0 + half;
        let bottom = y >= self.y0 + half;
        (right as usize) | ((bottom as usize) << 1)
    }

    fn child_bounds(&self, quadrant: usize) -> (f64, f64, f64) {
        let half = self.size / 2.0;
        (
            self.x0 + (quadrant & 1) as f64 * half,
            self.y0 + (quadrant >> 1) as f64 * half,
            half,
        )
    }
}

#[derive(Debug, Default, Clone)]
pub struct QuadTree {
    cells: Vec<Cell>,
    next: Vec<u32>,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl QuadTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn root(&self) -> Option<&Cell> {
        self.cells.first()
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id as usize]
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn point(&self, idx: usize) -> (f64, f64) {
        (self.xs[idx], self.ys[idx])
    }

    /// Point indices stored in a leaf, in insertion order.
    pub fn bucket(&self, id: CellId) -> Bucket<'_> {
        Bucket {
            tree: self,
            cur: self.cells[id as usize].head,
        }
    }

    /// Rebuilds the tree over the current node positions. `charges[i]` belongs to `nodes[i]`.
    pub fn rebuild(&mut self, nodes: &[Node], charges: &[f64]) {
        debug_assert_eq!(nodes.len(), charges.len());
        self.cells.clear();
        self.next.clear();
        self.xs.clear();
        self.ys.clear();
        if nodes.is_empty() {
            return;
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for n in nodes {
            min_x = min_x.min(n.x);
            min_y = min_y.min(n.y);
            max_x = max_x.max(n.x);
            max_y = max_y.max(n.y);
            self.xs.push(n.x);
            self.ys.push(n.y);
        }
        let extent = (max_x - min_x).max(max_y - min_y);
        let size = if extent > 0.0 { extent } else { 1.0 };

        self.cells.push(Cell::new(min_x, min_y, size));
        self.next.resize(nodes.len(), NONE);
        for idx in 0..nodes.len() {
            self.insert(idx as u32);
        }
        self.accumulate(charges);
    }

    fn push_child(&mut self, parent: usize, quadrant: usize, head: u32) -> usize {
        let (x0, y0, size) = self.cells[parent].child_bounds(quadrant);
        let mut child = Cell::new(x0, y0, size);
        child.head = head;
        let id = self.cells.len();
        self.cells.push(child);
        self.cells[parent].children[quadrant] = id as CellId;
        id
    }

    fn insert(&mut self, idx: u32) {
        let (x, y) = (self.xs[idx as usize], self.ys[idx as usize]);
        let mut cur = 0usize;
        let mut depth = 0u32;
        loop {
            let cell = self.cells[cur];
            if cell.is_leaf() {
                if cell.head == NONE {
                    self.cells[cur].head = idx;
                    return;
                }
                let other = cell.head as usize;
                let (ox, oy) = (self.xs[other], self.ys[other]);
                if (ox == x && oy == y) || depth >= MAX_DEPTH {
                    let mut tail = other;
                    while self.next[tail] != NONE {
                        tail = self.next[tail] as usize;
                    }
                    self.next[tail] = idx;
                    return;
                }
                // Push the existing bucket one level down, then keep descending.
                let q = cell.quadrant(ox, oy);
                self.push_child(cur, q, cell.head);
                self.cells[cur].head = NONE;
            }

            let q = self.cells[cur].quadrant(x, y);
            match self.cells[cur].children[q] {
                NONE => {
                    self.push_child(cur, q, idx);
                    return;
                }
                child => {
                    cur = child as usize;
                    depth += 1;
                }
            }
        }
    }

    // Children always live at higher indices than their parent, so a reverse sweep is a
    // post-order traversal.
    fn accumulate(&mut self, charges: &[f64]) {
        for id in (0..self.cells.len()).rev() {
            let cell = self.cells[id];
            let mut charge = 0.0;
            let mut weight = 0.0;
            let (mut wx, mut wy) = (0.0, 0.0);
            let (mut sx, mut sy, mut count) = (0.0, 0.0, 0usize);

            if cell.is_leaf() {
                let mut cur = cell.head;
                while cur != NONE {
                    let p = cur as usize;
                    let w = charges[p].abs();
                    charge += charges[p];
                    weight += w;
                    wx += w * self.xs[p];
                    wy += w * self.ys[p];
                    sx += self.xs[p];
                    sy += self.ys[p];
                    count += 1;
                    cur = self.next[p];
                }
            } else {
                for child in cell.children() {
                    let c = &self.cells[child as usize];
                    let w = c.charge.abs();
                    charge += c.charge;
                    weight += w;
                    wx += w * c.cx;
                    wy += w * c.cy;
                    sx += c.cx;
                    sy += c.cy;
                    count += 1;
                }
            }

            let (cx, cy) = if weight > 0.0 {
                (wx / weight, wy / weight)
            } else if count > 0 {
                (sx / count as f64, sy / count as f64)
            } else {
                (cell.x0 + cell.size / 2.0, cell.y0 + cell.size / 2.0)
            };
            let c = &mut self.cells[id];
            c.charge = charge;
            c.cx = cx;
            c.cy = cy;
        }
    }

    /// Pre-order walk from the root. `f` returns whether to descend into the cell's children.
    ///
    /// `stack` is scratch space owned by the caller so repeated walks do not allocate.
    pub fn visit(&self, stack: &mut Vec<CellId>, mut f: impl FnMut(CellId, &Cell) -> bool) {
        stack.clear();
        if self.cells.is_empty() {
            return;
        }
        stack.push(0);
        while let Some(id) = stack.pop() {
            let cell = &self.cells[id as usize];
            if f(id, cell) && !cell.is_leaf() {
                for &child in cell.children.iter().rev() {
                    if child != NONE {
                        stack.push(child);
                    }
                }
            }
        }
    }
}

pub struct Bucket<'a> {
    tree: &'a QuadTree,
    cur: u32,
}

impl Iterator for Bucket<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cur == NONE {
            return None;
        }
        let idx = self.cur as usize;
        self.cur = self.tree.next[idx];
        Some(idx)
    }
}
