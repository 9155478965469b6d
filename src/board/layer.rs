//! Pyramid layer geometry.
//!
//! The board is four stacked square grids: 4x4, 3x3, 2x2 and the single
//! apex cell. Cells are numbered layer by layer, row-major within a layer,
//! so a cell at `(row, col)` of layer `l` has index
//! `LAYERS[l].offset + row * LAYERS[l].side + col`.

/// Total number of cells on the board (16 + 9 + 4 + 1).
pub const CELL_COUNT: usize = 30;

/// Number of pyramid layers.
pub const LAYER_COUNT: usize = 4;

/// One square layer of the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    /// Index of the layer's first cell.
    pub offset: usize,
    /// Width (and height) of the layer grid.
    pub side: usize,
}

impl Layer {
    /// Number of cells in this layer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.side * self.side
    }

    /// True when the layer has side 0. None of the pyramid's layers does.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.side == 0
    }

    /// Range of board indices covered by this layer.
    #[inline]
    pub const fn cells(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len()
    }

    /// Board index of the cell at `(row, col)` within this layer.
    #[inline]
    pub const fn index(&self, row: usize, col: usize) -> usize {
        self.offset + row * self.side + col
    }

    /// Number of axis-aligned 2x2 windows in this layer.
    ///
    /// The apex has none; the 2x2 layer has exactly one (the whole grid).
    #[inline]
    pub const fn window_count(&self) -> usize {
        if self.side < 2 {
            0
        } else {
            (self.side - 1) * (self.side - 1)
        }
    }

    /// Board indices of every 2x2 window, ordered row-major by top-left corner.
    pub fn windows(&self) -> impl Iterator<Item = [usize; 4]> + '_ {
        let span = self.side.saturating_sub(1);
        (0..span).flat_map(move |row| {
            (0..span).map(move |col| {
                [
                    self.index(row, col),
                    self.index(row, col + 1),
                    self.index(row + 1, col),
                    self.index(row + 1, col + 1),
                ]
            })
        })
    }
}

/// The four layers, bottom to apex.
pub const LAYERS: [Layer; LAYER_COUNT] = [
    Layer { offset: 0, side: 4 },
    Layer { offset: 16, side: 3 },
    Layer { offset: 25, side: 2 },
    Layer { offset: 29, side: 1 },
];

/// Total number of 2x2 windows across all layers (9 + 4 + 1).
pub const WINDOW_COUNT: usize = 14;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_partition_the_board() {
        let mut seen = [false; CELL_COUNT];
        for layer in LAYERS.iter() {
            for i in layer.cells() {
                assert!(!seen[i], "cell {} covered twice", i);
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "every cell belongs to a layer");
    }

    #[test]
    fn layer_boundaries() {
        assert_eq!(LAYERS[0].cells(), 0..16);
        assert_eq!(LAYERS[1].cells(), 16..25);
        assert_eq!(LAYERS[2].cells(), 25..29);
        assert_eq!(LAYERS[3].cells(), 29..30);
    }

    #[test]
    fn window_counts() {
        assert_eq!(LAYERS[0].window_count(), 9);
        assert_eq!(LAYERS[1].window_count(), 4);
        assert_eq!(LAYERS[2].window_count(), 1);
        assert_eq!(LAYERS[3].window_count(), 0);
        let total: usize = LAYERS.iter().map(|l| l.window_count()).sum();
        assert_eq!(total, WINDOW_COUNT);
    }

    #[test]
    fn windows_are_row_major() {
        let windows: Vec<[usize; 4]> = LAYERS[0].windows().collect();
        assert_eq!(windows.len(), 9);
        assert_eq!(windows[0], [0, 1, 4, 5]);
        assert_eq!(windows[1], [1, 2, 5, 6]);
        assert_eq!(windows[3], [4, 5, 8, 9]);
        assert_eq!(windows[8], [10, 11, 14, 15]);

        let mid: Vec<[usize; 4]> = LAYERS[1].windows().collect();
        assert_eq!(mid[0], [16, 17, 19, 20]);
        assert_eq!(mid[3], [20, 21, 23, 24]);

        let top: Vec<[usize; 4]> = LAYERS[2].windows().collect();
        assert_eq!(top, vec![[25, 26, 27, 28]]);

        assert_eq!(LAYERS[3].windows().count(), 0);
    }

    #[test]
    fn is_empty_follows_side() {
        assert!(LAYERS.iter().all(|l| !l.is_empty()));
        assert!(Layer { offset: 0, side: 0 }.is_empty());
    }
}
