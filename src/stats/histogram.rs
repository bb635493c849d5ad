//! Fixed-bucket online histogram.

/// Online accumulator over signed integer samples.
///
/// Each bucket is the half-open interval below its boundary; a final
/// catch-all boundary of `i64::MAX` is appended on first use if the caller
/// did not supply one, so every sample lands in exactly one bucket. Buckets
/// track a count and a running mean, never the raw samples.
#[derive(Debug, Clone)]
pub struct Histogram {
    boundaries: Vec<i64>,
    counts: Vec<u64>,
    means: Vec<f64>,
}

impl Histogram {
    pub fn new(boundaries: &[i64]) -> Self {
        Self {
            boundaries: boundaries.to_vec(),
            counts: Vec::new(),
            means: Vec::new(),
        }
    }

    fn init(&mut self) {
        if self.boundaries.last() != Some(&i64::MAX) {
            self.boundaries.push(i64::MAX);
        }
        self.counts = vec![0; self.boundaries.len()];
        self.means = vec![0.0; self.boundaries.len()];
    }

    /// Record one sample in the first bucket whose boundary exceeds it.
    /// The final bucket catches everything the earlier ones did not.
    pub fn add(&mut self, value: i64) {
        if self.counts.is_empty() {
            self.init();
        }
        let last = self.boundaries.len() - 1;
        let i = self.boundaries[..last]
            .iter()
            .position(|boundary| value < *boundary)
            .unwrap_or(last);
        self.counts[i] += 1;
        let n = self.counts[i] as f64;
        if self.counts[i] > 1 {
            self.means[i] = self.means[i] * ((n - 1.0) / n) + (value as f64 / n);
        } else {
            self.means[i] = value as f64;
        }
    }

    /// Iterate `(label, count, mean)` per bucket, in boundary order.
    pub fn buckets(&self) -> impl Iterator<Item = (String, u64, f64)> + '_ {
        (0..self.counts.len()).map(|i| (self.bucket_label(i), self.counts[i], self.means[i]))
    }

    /// Range label for bucket `i`.
    pub fn bucket_label(&self, i: usize) -> String {
        if i == 0 {
            format!("<{}", self.boundaries[i])
        } else if i == self.boundaries.len() - 1 {
            format!(">={}", self.boundaries[i - 1])
        } else {
            format!("[{}, {})", self.boundaries[i - 1], self.boundaries[i])
        }
    }

    /// Aligned header, count, and mean rows for console display.
    pub fn render(&self) -> (String, String, String) {
        let mut header = String::new();
        let mut counts = String::new();
        let mut means = String::new();
        for i in 0..self.counts.len() {
            let label = self.bucket_label(i);
            counts.push_str(&format!("{:>width$} ", self.counts[i], width = label.len()));
            means.push_str(&format!("{:>width$.1} ", self.means[i], width = label.len()));
            header.push_str(&label);
            header.push(' ');
        }
        (header, counts, means)
    }
}
