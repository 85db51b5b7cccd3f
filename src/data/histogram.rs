/// Bin count used when the caller has no preference.
pub const DEFAULT_BINS: usize = 10;

/// Equal-width bins over the finite values of a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values`. Every bin is half-open except the last, which also
    /// holds the maximum. A constant series gets a single unit-wide bin.
    pub fn compute(values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let lo = finite.iter().copied().reduce(f64::min)?;
        let hi = finite.iter().copied().reduce(f64::max)?;

        let (lo, hi, bins) = if (hi - lo).abs() < f64::EPSILON {
            (lo - 0.5, hi + 0.5, 1)
        } else {
            (lo, hi, bins.max(1))
        };
        let width = (hi - lo) / bins as f64;

        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        Some(Histogram { edges, counts })
    }

    /// `(bin centre, bin width, count)` per bin.
    pub fn bars(&self) -> Vec<(f64, f64, usize)> {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &n)| ((w[0] + w[1]) / 2.0, w[1] - w[0], n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximum_lands_in_last_bin() {
        let h = Histogram::compute(&[0.0, 1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn constant_and_empty_series() {
        let h = Histogram::compute(&[7.0, 7.0], DEFAULT_BINS).unwrap();
        assert_eq!(h.counts, vec![2]);
        assert_eq!(h.bars(), vec![(7.0, 1.0, 2)]);
        assert!(Histogram::compute(&[f64::NAN], DEFAULT_BINS).is_none());
    }
}
