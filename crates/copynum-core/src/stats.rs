use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Summary statistics of the per-cell copy numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopyNumberStats {
    #[serde(rename = "Cell Count")]
    pub count: usize,
    #[serde(rename = "Mean Copy Number")]
    pub mean: f64,
    #[serde(rename = "Median Copy Number")]
    pub median: f64,
    /// Population standard deviation.
    #[serde(rename = "Standard Deviation")]
    pub std_dev: f64,
    /// Biased sample skewness (g1).
    #[serde(rename = "Skewness")]
    pub skewness: f64,
    /// Biased excess kurtosis (g2).
    #[serde(rename = "Kurtosis")]
    pub kurtosis: f64,
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Compute summary statistics, or `None` for an empty input.
///
/// Skewness and kurtosis are NaN when all values are equal.
pub fn compute_stats(values: &[f64]) -> Option<CopyNumberStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let moment = |k: i32| values.iter().map(|v| (v - mean).powi(k)).sum::<f64>() / n;
    let m2 = moment(2);
    let m3 = moment(3);
    let m4 = moment(4);

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Some(CopyNumberStats {
        count: values.len(),
        mean,
        median: median(&sorted),
        std_dev: m2.sqrt(),
        skewness: m3 / m2.powf(1.5),
        kurtosis: m4 / (m2 * m2) - 3.0,
    })
}

/// Write the statistics as a single-row CSV.
pub fn write_stats(path: &Path, stats: &CopyNumberStats) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.serialize(stats)?;
    writer.flush()?;
    info!(path = %path.display(), "Summary statistics saved");
    Ok(())
}

/// One equal-width bin of the copy number distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// Count normalized so the histogram integrates to one.
    pub density: f64,
    /// Fitted normal probability density at the bin center.
    pub normal_fit: f64,
}

fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return if x == mean { f64::INFINITY } else { 0.0 };
    }
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * (2.0 * std::f64::consts::PI).sqrt())
}

/// Equal-width histogram of `values` with a fitted normal density per bin.
///
/// The normal fit uses the mean and population standard deviation. Returns an
/// empty vector for empty input or `bins == 0`.
pub fn copy_number_histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some(stats) = compute_stats(values) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let total = values.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = min + i as f64 * width;
            let upper = lower + width;
            HistogramBin {
                lower,
                upper,
                count,
                density: count as f64 / (total * width),
                normal_fit: normal_pdf((lower + upper) / 2.0, stats.mean, stats.std_dev),
            }
        })
        .collect()
}

/// Write histogram bins as CSV.
pub fn write_histogram(path: &Path, bins: &[HistogramBin]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for bin in bins {
        writer.serialize(bin)?;
    }
    writer.flush()?;
    Ok(())
}
