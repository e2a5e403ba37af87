// SYNCOV: Data-Availability Analysis of Ad-Hoc Sync Protocol Snapshot Logs
// Copyright (C) 2024-2025 Syncov developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Summary statistics over availability traces and duration samples.

use itertools::Itertools;
use statrs::distribution::{ContinuousCDF, Empirical};

/// Mean over the defined (non-NaN) values. NaN if every value is undefined.
pub fn nan_mean(values: &[f64]) -> f64 {
    let defined = values.iter().copied().filter(|v| !v.is_nan()).collect_vec();
    if defined.is_empty() {
        return f64::NAN;
    }
    defined.iter().sum::<f64>() / defined.len() as f64
}

/// Population standard deviation over the defined (non-NaN) values.
pub fn nan_std(values: &[f64]) -> f64 {
    let defined = values.iter().copied().filter(|v| !v.is_nan()).collect_vec();
    if defined.is_empty() {
        return f64::NAN;
    }
    let mean = defined.iter().sum::<f64>() / defined.len() as f64;
    let variance =
        defined.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / defined.len() as f64;
    variance.sqrt()
}

/// Sample the empirical CDF of `samples` on an even grid of `resolution`
/// points between the smallest and largest sample.
///
/// Samples must be finite. Returns an empty vector for empty input.
pub fn ecdf_points(samples: &[f64], resolution: usize) -> Vec<(f64, f64)> {
    if samples.is_empty() || resolution == 0 {
        return Vec::new();
    }
    let (min, max) = samples
        .iter()
        .copied()
        .minmax_by(f64::total_cmp)
        .into_option()
        .expect("samples is non-empty");
    let dist = Empirical::from_vec(samples.to_vec());
    if resolution == 1 || min == max {
        return vec![(max, dist.cdf(max))];
    }
    let step = (max - min) / (resolution - 1) as f64;
    (0..resolution)
        .map(|i| {
            let x = min + step * i as f64;
            (x, dist.cdf(x))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mean_skips_undefined_values() {
        assert_eq!(nan_mean(&[0.5, f64::NAN, 1.0]), 0.75);
        assert_eq!(nan_mean(&[2.0]), 2.0);
        assert!(nan_mean(&[f64::NAN, f64::NAN]).is_nan());
        assert!(nan_mean(&[]).is_nan());
    }

    #[test]
    fn std_of_constant_trace_is_zero() {
        assert_eq!(nan_std(&[0.8, 0.8, f64::NAN, 0.8]), 0.0);
        assert!(nan_std(&[]).is_nan());
    }

    #[test]
    fn std_matches_population_formula() {
        // variance of {1, 3} around mean 2 is 1
        assert_eq!(nan_std(&[1.0, 3.0]), 1.0);
    }

    #[test]
    fn ecdf_is_monotone_between_zero_and_one() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        let points = ecdf_points(&samples, 9);
        assert_eq!(points.len(), 9);
        assert_eq!(points[0].0, 1.0);
        assert_eq!(points[8].0, 4.0);

        let mut last = 0.0;
        for (_, y) in &points {
            assert!((0.0..=1.0).contains(y));
            assert!(*y >= last);
            last = *y;
        }
        assert_eq!(points[8].1, 1.0);
    }

    #[test]
    fn ecdf_of_empty_input_is_empty() {
        assert!(ecdf_points(&[], 10).is_empty());
        assert_eq!(ecdf_points(&[5.0, 5.0], 10), vec![(5.0, 1.0)]);
    }
}
