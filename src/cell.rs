use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epidemiological state of one grid cell.
///
/// `Empty` is a structural placeholder used for quarantine-wall cells: it
/// takes part in no transition and is excluded from population counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Deceased,
    Empty,
    Susceptible,
    Infected,
    Recovered,
}

impl State {
    /// Integer encoding used by snapshots and external consumers:
    /// Deceased=-1, Empty=0, Susceptible=1, Infected=2, Recovered=3.
    pub fn code(self) -> i8 {
        match self {
            State::Deceased => -1,
            State::Empty => 0,
            State::Susceptible => 1,
            State::Infected => 2,
            State::Recovered => 3,
        }
    }
}

/// Per-day transition probabilities, loaded from the `[rates]` config table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rates {
    pub infection: f64,
    pub recovery: f64,
    #[serde(default)]
    pub mortality: f64,
}

/// Calls `f` with the flat index of each orthogonal neighbor of `idx`.
///
/// Boundary-aware: cells on the grid edge simply have fewer neighbors, the
/// grid never wraps. A corner cell yields 2 indices, an edge cell 3, an
/// interior cell 4.
#[inline]
pub fn for_each_neighbor<F>(idx: usize, size: usize, mut f: F)
where
    F: FnMut(usize),
{
    let x = idx / size;
    let y = idx % size;
    if x > 0 {
        f(idx - size);
    }
    if x < size - 1 {
        f(idx + size);
    }
    if y > 0 {
        f(idx - 1);
    }
    if y < size - 1 {
        f(idx + 1);
    }
}

#[inline]
fn has_infected_neighbor(idx: usize, states: &[State], size: usize) -> bool {
    let mut found = false;
    for_each_neighbor(idx, size, |n| {
        if states[n] == State::Infected {
            found = true;
        }
    });
    found
}

/// Evaluates the staged next state for the cell at `idx`.
///
/// Reads only the frozen pre-step `states` slice (never partially-updated
/// neighbors) and returns the value to stage into the next-state buffer.
/// The rule order is fixed: infection, then recovery, then mortality.
/// Mortality only applies to cells that did not already stage a recovery in
/// the same step.
pub fn evaluate<R: Rng>(
    idx: usize,
    states: &[State],
    size: usize,
    rates: Rates,
    rng: &mut R,
) -> State {
    let state = states[idx];
    let mut next = state;

    if state == State::Susceptible
        && has_infected_neighbor(idx, states, size)
        && rng.random::<f64>() < rates.infection
    {
        next = State::Infected;
    }

    if state == State::Infected && rng.random::<f64>() < rates.recovery {
        next = State::Recovered;
    }

    if state == State::Infected && next == State::Infected && rng.random::<f64>() < rates.mortality
    {
        next = State::Deceased;
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rates(infection: f64, recovery: f64, mortality: f64) -> Rates {
        Rates {
            infection,
            recovery,
            mortality,
        }
    }

    fn neighbor_count(idx: usize, size: usize) -> usize {
        let mut count = 0;
        for_each_neighbor(idx, size, |_| count += 1);
        count
    }

    #[test]
    fn corner_edge_interior_neighbor_counts() {
        let size = 5;
        // Corners.
        for &(x, y) in &[(0, 0), (0, 4), (4, 0), (4, 4)] {
            assert_eq!(neighbor_count(x * size + y, size), 2);
        }
        // Edges (non-corner).
        for &(x, y) in &[(0, 2), (4, 2), (2, 0), (2, 4)] {
            assert_eq!(neighbor_count(x * size + y, size), 3);
        }
        // Interior.
        assert_eq!(neighbor_count(2 * size + 2, size), 4);
    }

    #[test]
    fn neighbors_stay_in_bounds() {
        let size = 4;
        for idx in 0..size * size {
            for_each_neighbor(idx, size, |n| {
                assert!(n < size * size);
                // Orthogonal neighbors differ by one row or one column.
                let (x, y) = (idx / size, idx % size);
                let (nx, ny) = (n / size, n % size);
                assert_eq!(x.abs_diff(nx) + y.abs_diff(ny), 1);
            });
        }
    }

    #[test]
    fn susceptible_with_infected_neighbor_catches_at_rate_one() {
        let size = 3;
        let center = size + 1;
        let mut states = vec![State::Susceptible; size * size];
        states[center] = State::Infected;
        let mut rng = StdRng::seed_from_u64(7);

        let next = evaluate(1, &states, size, rates(1.0, 0.0, 0.0), &mut rng);
        assert_eq!(next, State::Infected);
    }

    #[test]
    fn susceptible_without_infected_neighbor_never_catches() {
        let size = 3;
        let states = vec![State::Susceptible; size * size];
        let mut rng = StdRng::seed_from_u64(7);

        let next = evaluate(4, &states, size, rates(1.0, 0.0, 0.0), &mut rng);
        assert_eq!(next, State::Susceptible);
    }

    #[test]
    fn infection_rate_zero_never_infects() {
        let size = 3;
        let center = size + 1;
        let mut states = vec![State::Susceptible; size * size];
        states[center] = State::Infected;
        let mut rng = StdRng::seed_from_u64(7);

        let next = evaluate(1, &states, size, rates(0.0, 0.0, 0.0), &mut rng);
        assert_eq!(next, State::Susceptible);
    }

    #[test]
    fn infected_recovers_at_rate_one() {
        let states = vec![State::Infected];
        let mut rng = StdRng::seed_from_u64(7);

        let next = evaluate(0, &states, 1, rates(0.0, 1.0, 0.0), &mut rng);
        assert_eq!(next, State::Recovered);
    }

    #[test]
    fn recovery_shields_same_step_mortality() {
        // Mortality is a second chance applied only to cells that did not
        // already recover this step.
        let states = vec![State::Infected];
        let mut rng = StdRng::seed_from_u64(7);

        let next = evaluate(0, &states, 1, rates(0.0, 1.0, 1.0), &mut rng);
        assert_eq!(next, State::Recovered);
    }

    #[test]
    fn infected_dies_at_mortality_rate_one() {
        let states = vec![State::Infected];
        let mut rng = StdRng::seed_from_u64(7);

        let next = evaluate(0, &states, 1, rates(0.0, 0.0, 1.0), &mut rng);
        assert_eq!(next, State::Deceased);
    }

    #[test]
    fn empty_and_terminal_states_never_transition() {
        let size = 3;
        let mut states = vec![State::Infected; size * size];
        states[0] = State::Empty;
        states[1] = State::Recovered;
        states[2] = State::Deceased;
        let mut rng = StdRng::seed_from_u64(7);
        let all_on = rates(1.0, 1.0, 1.0);

        assert_eq!(evaluate(0, &states, size, all_on, &mut rng), State::Empty);
        assert_eq!(evaluate(1, &states, size, all_on, &mut rng), State::Recovered);
        assert_eq!(evaluate(2, &states, size, all_on, &mut rng), State::Deceased);
    }

    #[test]
    fn state_codes_match_external_encoding() {
        assert_eq!(State::Deceased.code(), -1);
        assert_eq!(State::Empty.code(), 0);
        assert_eq!(State::Susceptible.code(), 1);
        assert_eq!(State::Infected.code(), 2);
        assert_eq!(State::Recovered.code(), 3);
    }
}
