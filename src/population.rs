use crate::cell::{self, Rates, State};
use crate::snapshot::{Snapshot, StateCounts};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::fmt;

/// The only engine-level failure: malformed construction input. Raised
/// synchronously by [`Population::new`]; once a population is validly
/// constructed, every per-cell operation is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidConfiguration {
    ZeroGridSize,
    CoordOutOfBounds { x: usize, y: usize, size: usize },
    TooManySeeds { requested: usize, available: usize },
}

impl fmt::Display for InvalidConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidConfiguration::ZeroGridSize => write!(f, "grid size must be positive"),
            InvalidConfiguration::CoordOutOfBounds { x, y, size } => write!(
                f,
                "seed coordinate ({}, {}) out of bounds for a {}x{} grid",
                x, y, size, size
            ),
            InvalidConfiguration::TooManySeeds {
                requested,
                available,
            } => write!(
                f,
                "{} initial infections requested but only {} cells are available",
                requested, available
            ),
        }
    }
}

impl std::error::Error for InvalidConfiguration {}

/// Initial-infection configuration: either an explicit list of seed
/// coordinates or a count of randomly placed infections.
#[derive(Debug, Clone)]
pub enum Seeding {
    /// Exactly these cells start Infected; duplicates collapse silently.
    Coords(Vec<(usize, usize)>),
    /// This many distinct non-Empty cells, chosen uniformly at random.
    Random(usize),
}

/// A population of people on a fixed N x N grid.
///
/// Storage is a flat row-major array of states indexed by `x * size + y`,
/// with a parallel next-state buffer for the two-phase update. The grid is
/// never resized after construction.
#[derive(Debug)]
pub struct Population {
    size: usize,
    states: Vec<State>,
    next_states: Vec<State>,
    /// Base seed for the per-cell RNG streams used during `update`.
    seed: u64,
    day: u32,
}

impl Population {
    /// Allocates a `size` x `size` grid of Susceptible cells and applies the
    /// initial-infection seeding.
    pub fn new(size: usize, seeding: Seeding, seed: u64) -> Result<Self, InvalidConfiguration> {
        if size == 0 {
            return Err(InvalidConfiguration::ZeroGridSize);
        }

        let mut states = vec![State::Susceptible; size * size];

        match seeding {
            Seeding::Coords(coords) => {
                for &(x, y) in &coords {
                    if x >= size || y >= size {
                        return Err(InvalidConfiguration::CoordOutOfBounds { x, y, size });
                    }
                    // Duplicates collapse: last write wins.
                    states[x * size + y] = State::Infected;
                }
            }
            Seeding::Random(count) => {
                // Checked up front so the rejection loop below always
                // terminates, even if Empty cells ever pre-exist seeding.
                let available = states.iter().filter(|s| **s != State::Empty).count();
                if count > available {
                    return Err(InvalidConfiguration::TooManySeeds {
                        requested: count,
                        available,
                    });
                }

                // Host-side RNG for initial placement; rejection sampling
                // keeps the chosen cells distinct and skips Empty cells.
                let mut rng = StdRng::seed_from_u64(seed);
                let mut placed = 0;
                while placed < count {
                    let x = rng.random_range(0..size);
                    let y = rng.random_range(0..size);
                    let idx = x * size + y;
                    if states[idx] == State::Susceptible {
                        states[idx] = State::Infected;
                        placed += 1;
                    }
                }
            }
        }

        let next_states = states.clone();
        Ok(Self {
            size,
            states,
            next_states,
            seed,
            day: 0,
        })
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of completed simulation days.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Carves the grid into a 3x3 block partition by turning every cell on
    /// the full row and full column at indices `size/3` and `2*size/3` into
    /// Empty walls. Idempotent. Must be called before the first `update`;
    /// walling off an already-running epidemic is undefined.
    pub fn isolate_subpopulations(&mut self) {
        let walls = [self.size / 3, 2 * self.size / 3];
        for &w in &walls {
            for i in 0..self.size {
                for idx in [i * self.size + w, w * self.size + i] {
                    self.states[idx] = State::Empty;
                    self.next_states[idx] = State::Empty;
                }
            }
        }
    }

    /// Advances the whole population by one day.
    ///
    /// Two-phase update: every cell is first evaluated against a frozen
    /// pre-step view of `states` (infection, then recovery, then mortality),
    /// writing only its own staged next state; commit starts only after
    /// every evaluate has finished. This makes the transition simultaneous
    /// and independent of scan order.
    pub fn update(&mut self, rates: Rates) {
        let size = self.size;
        let states = &self.states;
        let base = self.seed;
        let day = self.day;

        // Phase 1: evaluate in parallel. Each cell gets its own RNG stream
        // derived from the base seed, its index, and the day number, so the
        // outcome is reproducible for a fixed seed regardless of scheduling.
        self.next_states
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, next)| {
                let cell_seed = base
                    .wrapping_add((idx as u64).wrapping_mul(0x1F3A))
                    .wrapping_add((day as u64).wrapping_mul(0x58C7));
                let mut rng = StdRng::seed_from_u64(cell_seed);
                *next = cell::evaluate(idx, states, size, rates, &mut rng);
            });

        // Phase 2: commit. Empty cells are structurally inert and never
        // change through commit.
        for (state, next) in self.states.iter_mut().zip(self.next_states.iter()) {
            if *state != State::Empty {
                *state = *next;
            }
        }

        self.day += 1;
    }

    /// Tallies the grid in one scan. Empty cells are excluded: they denote
    /// void positions, not deceased or living individuals.
    pub fn count_states(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for &state in &self.states {
            match state {
                State::Deceased => counts.deceased += 1,
                State::Susceptible => counts.susceptible += 1,
                State::Infected => counts.infected += 1,
                State::Recovered => counts.recovered += 1,
                State::Empty => {}
            }
        }
        counts
    }

    /// Owned copy of the current state-code matrix; safe to retain across
    /// future updates.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.size,
            codes: self.states.iter().map(|s| s.code()).collect(),
        }
    }
}
