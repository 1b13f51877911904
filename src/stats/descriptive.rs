//! Descriptive statistics used by the results and teacher views.
//!
//! Every function returns a finite value for any input: empty and
//! single-point data sets map to 0 (or an empty series) instead of NaN.

use std::collections::BTreeMap;

use serde::Serialize;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `part / whole` as a percentage, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Population standard deviation (divides by n).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Standard error of the mean; 0 for n <= 1.
pub fn sem(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    population_std_dev(values) / (values.len() as f64).sqrt()
}

/// Pearson r over `(x, y)` pairs.
///
/// Returns 0 with fewer than two points or when either side has no variance.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Whisker ends, clamped to 1.5 IQR beyond the box.
    pub min: f64,
    pub max: f64,
}

/// Positional quartiles (no interpolation) with Tukey-fence whiskers.
pub fn quartiles(values: &[f64]) -> Quartiles {
    if values.is_empty() {
        return Quartiles::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let at = |fraction: f64| sorted[((n as f64 * fraction).floor() as usize).min(n - 1)];

    let q1 = at(0.25);
    let median = at(0.5);
    let q3 = at(0.75);
    let iqr = q3 - q1;

    Quartiles {
        q1,
        median,
        q3,
        min: sorted[0].max(q1 - 1.5 * iqr),
        max: sorted[n - 1].min(q3 + 1.5 * iqr),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinMean {
    /// Bin center, rounded to the nearest integer.
    pub center: f64,
    pub mean: f64,
    pub count: usize,
}

/// Splits the key range of `points` into `bins` equal-width bins and averages
/// the value of each non-empty bin. Points are `(key, value)`.
pub fn bin_means(points: &[(f64, f64)], bins: usize) -> Vec<BinMean> {
    if points.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); bins];
    for &(key, value) in points {
        // all keys equal: everything lands in the first bin
        let index = if width > 0.0 {
            (((key - min) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        buckets[index].push(value);
    }

    buckets
        .iter()
        .enumerate()
        .filter(|(_, values)| !values.is_empty())
        .map(|(index, values)| BinMean {
            center: (min + width * (index as f64 + 0.5)).round(),
            mean: mean(values),
            count: values.len(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMean<K> {
    pub key: K,
    pub mean: f64,
    pub count: usize,
}

/// Mean value per distinct key, sorted by key.
pub fn group_means<K: Ord + Copy>(points: &[(K, f64)]) -> Vec<GroupMean<K>> {
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for &(key, value) in points {
        groups.entry(key).or_default().push(value);
    }

    groups
        .into_iter()
        .map(|(key, values)| GroupMean {
            key,
            mean: mean(&values),
            count: values.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pearson_of_a_perfect_line_is_one() {
        let pairs = [(1.0, 100.0), (2.0, 200.0), (3.0, 300.0)];
        assert!(close(pearson(&pairs), 1.0));
        let inverse = [(1.0, 300.0), (2.0, 200.0), (3.0, 100.0)];
        assert!(close(pearson(&inverse), -1.0));
    }

    #[test]
    fn pearson_degenerate_inputs_are_zero() {
        assert_eq!(pearson(&[]), 0.0);
        assert_eq!(pearson(&[(1.0, 5.0)]), 0.0);
        assert_eq!(pearson(&[(1.0, 500.0), (2.0, 500.0), (3.0, 500.0)]), 0.0);
        assert_eq!(pearson(&[(4.0, 1.0), (4.0, 2.0)]), 0.0);
    }

    #[test]
    fn sem_matches_hand_computation() {
        assert_eq!(sem(&[42.0]), 0.0);
        assert_eq!(sem(&[]), 0.0);
        // population sd of 10/20/30 is sqrt(200/3)
        let expected = (200.0f64 / 3.0).sqrt() / 3.0f64.sqrt();
        assert!(close(sem(&[10.0, 20.0, 30.0]), expected));
    }

    #[test]
    fn mean_and_percent_guard_empty_input() {
        assert_eq!(mean(&[]), 0.0);
        assert!(close(mean(&[1.0, 2.0, 6.0]), 3.0));
        assert_eq!(percent(3, 0), 0.0);
        assert!(close(percent(1, 4), 25.0));
    }

    #[test]
    fn quartiles_use_positional_indices() {
        let q = quartiles(&[8.0, 1.0, 4.0, 2.0, 6.0, 3.0, 7.0, 5.0]);
        assert_eq!(q.q1, 3.0);
        assert_eq!(q.median, 5.0);
        assert_eq!(q.q3, 7.0);
        assert_eq!(q.min, 1.0);
        assert_eq!(q.max, 8.0);
    }

    #[test]
    fn quartile_whiskers_clamp_outliers() {
        let q = quartiles(&[10.0, 11.0, 12.0, 13.0, 1000.0]);
        // q1 = 11, q3 = 13, iqr = 2 -> upper fence 16
        assert_eq!(q.max, 16.0);
        assert_eq!(q.min, 10.0);
        assert_eq!(quartiles(&[]), Quartiles::default());
    }

    #[test]
    fn bin_means_skip_empty_bins() {
        let points = [(0.0, 10.0), (1.0, 20.0), (9.0, 30.0), (10.0, 50.0)];
        let bins = bin_means(&points, 5);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].center, 1.0);
        assert!(close(bins[0].mean, 15.0));
        assert_eq!(bins[1].center, 9.0);
        assert!(close(bins[1].mean, 40.0));
        assert_eq!(bins[1].count, 2);
    }

    #[test]
    fn bin_means_with_identical_keys() {
        let bins = bin_means(&[(5.0, 100.0), (5.0, 300.0)], 5);
        assert_eq!(bins.len(), 1);
        assert!(close(bins[0].mean, 200.0));
        assert!(bin_means(&[], 5).is_empty());
    }

    #[test]
    fn group_means_are_sorted_by_key() {
        let groups = group_means(&[(120u16, 900.0), (0, 500.0), (120, 1100.0), (60, 700.0)]);
        let keys: Vec<u16> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![0, 60, 120]);
        assert!(close(groups[2].mean, 1000.0));
    }
}
