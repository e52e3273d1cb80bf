use serde::{Deserialize, Serialize};

/// An owned copy of the grid's state codes at a point in time.
///
/// Stored row-major (`codes[x * size + y]`) using the external encoding
/// (Deceased=-1, Empty=0, Susceptible=1, Infected=2, Recovered=3). Safe to
/// retain independently of any later grid mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Side length of the square grid.
    pub size: usize,
    /// Flat row-major matrix of state codes, length `size * size`.
    pub codes: Vec<i8>,
}

impl Snapshot {
    /// State code at grid position `(x, y)`.
    ///
    /// Panics if either coordinate is outside the grid.
    pub fn get(&self, x: usize, y: usize) -> i8 {
        debug_assert!(
            x < self.size && y < self.size,
            "coordinate ({}, {}) out of bounds for a {}x{} snapshot",
            x,
            y,
            self.size,
            self.size
        );
        self.codes[x * self.size + y]
    }
}

/// Per-day population tally by state.
///
/// `Empty` is deliberately excluded: wall cells are void positions, not
/// deceased or living individuals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub deceased: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
}

impl StateCounts {
    /// Total tracked population (living plus deceased, Empty excluded).
    pub fn total(&self) -> usize {
        self.deceased + self.susceptible + self.infected + self.recovered
    }
}
