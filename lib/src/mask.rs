//! Radial frequency grids and lowpass/highpass masks

use crate::plane::{FrequencyGrid, Mask, Plane};
use std::fmt;

/// Which side of the cutoff a mask passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Pass frequencies with normalized distance `< cutoff`
    Lowpass,
    /// Pass frequencies with normalized distance `>= cutoff`
    Highpass,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FilterKind {
    /// Get all filter kinds
    pub fn all() -> &'static [FilterKind] {
        &[FilterKind::Lowpass, FilterKind::Highpass]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Lowpass => "lowpass",
            FilterKind::Highpass => "highpass",
        }
    }

    /// Whether a normalized distance passes this filter
    pub fn passes(&self, distance: f64, cutoff: f64) -> bool {
        match self {
            FilterKind::Lowpass => distance < cutoff,
            FilterKind::Highpass => distance >= cutoff,
        }
    }
}

/// Offsets of each index from the centered zero bin (`j - n/2`)
fn centered_axis(n: usize) -> Vec<f64> {
    let half = (n / 2) as i64;
    (0..n as i64).map(|j| (j - half) as f64).collect()
}

/// Build the radial distance field for a `rows x cols` spectrum, scaled so its
/// maximum is 1.0. A degenerate all-zero field (1x1) is left unscaled.
pub fn frequency_grid(rows: usize, cols: usize) -> FrequencyGrid {
    let x = centered_axis(cols);
    let y = centered_axis(rows);

    let mut distances = Vec::with_capacity(rows * cols);
    for &fy in &y {
        for &fx in &x {
            distances.push((fx * fx + fy * fy).sqrt());
        }
    }

    let max = distances.iter().cloned().fold(0.0, f64::max);
    let divisor = if max == 0.0 { 1.0 } else { max };
    for d in distances.iter_mut() {
        *d /= divisor;
    }

    Plane::from_parts(rows, cols, distances)
}

/// Threshold a frequency grid into a `{0.0, 1.0}` mask
///
/// The cutoff is not range-checked: values `<= 0` or `> 1` simply give an
/// all-block or all-pass mask depending on `kind`.
pub fn mask_from_grid(grid: &FrequencyGrid, kind: FilterKind, cutoff: f64) -> Mask {
    grid.map(|&d| if kind.passes(d, cutoff) { 1.0 } else { 0.0 })
}

/// Build both the frequency grid and the mask for a shape and cutoff
pub fn build(rows: usize, cols: usize, kind: FilterKind, cutoff: f64) -> (FrequencyGrid, Mask) {
    let grid = frequency_grid(rows, cols);
    let mask = mask_from_grid(&grid, kind, cutoff);
    (grid, mask)
}

/// Number of passing samples in a mask
pub fn count_passed(mask: &Mask) -> usize {
    mask.as_slice().iter().filter(|&&v| v != 0.0).count()
}
