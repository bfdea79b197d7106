//! Dominant color extraction from a quantized bucket table.
//!
//! Reduction is a greedy single pass: buckets are visited from most to least
//! populated and each one joins the first existing cluster whose centroid lies
//! within the merge radius, or starts a new cluster. The first-match rule is
//! deliberate; choosing the nearest cluster instead changes which colors merge.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::quantize::{BucketTable, ColorBucket};

/// Tuning for [`reduce_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteOptions {
    /// Euclidean RGB distance within which a bucket joins a cluster
    pub merge_radius: f64,
    /// Maximum number of entries returned
    pub max_entries: usize,
    /// Hard cap on buckets examined
    pub max_examined: usize,
    /// Cluster count that enables the early stop
    pub early_stop_clusters: usize,
    /// Buckets that must already have been examined, not counting the current
    /// one, before the early stop applies
    pub early_stop_examined: usize,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            merge_radius: 36.0,
            max_entries: 6,
            max_examined: 512,
            early_stop_clusters: 8,
            early_stop_examined: 64,
        }
    }
}

/// One dominant color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Rounded centroid red
    pub r: u8,
    /// Rounded centroid green
    pub g: u8,
    /// Rounded centroid blue
    pub b: u8,
    /// Pixels in the cluster
    pub count: u64,
    /// Sum of red over the cluster's pixels
    pub sum_r: u64,
    /// Sum of green over the cluster's pixels
    pub sum_g: u64,
    /// Sum of blue over the cluster's pixels
    pub sum_b: u64,
}

impl PaletteEntry {
    /// `#RRGGBB` label for swatches.
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Fraction of `total_pixels` covered by this color (0 for an empty image).
    pub fn share(&self, total_pixels: u64) -> f64 {
        if total_pixels == 0 {
            return 0.0;
        }
        self.count as f64 / total_pixels as f64
    }
}

#[derive(Debug, Clone)]
struct Cluster {
    count: u64,
    sum_r: u64,
    sum_g: u64,
    sum_b: u64,
    centroid: [f64; 3],
}

impl Cluster {
    fn absorb(&mut self, bucket: &ColorBucket) {
        self.count += bucket.count as u64;
        self.sum_r += bucket.sum_r;
        self.sum_g += bucket.sum_g;
        self.sum_b += bucket.sum_b;
        let n = self.count as f64;
        self.centroid = [
            self.sum_r as f64 / n,
            self.sum_g as f64 / n,
            self.sum_b as f64 / n,
        ];
    }

    fn to_entry(&self) -> PaletteEntry {
        PaletteEntry {
            r: round_channel(self.centroid[0]),
            g: round_channel(self.centroid[1]),
            b: round_channel(self.centroid[2]),
            count: self.count,
            sum_r: self.sum_r,
            sum_g: self.sum_g,
            sum_b: self.sum_b,
        }
    }
}

impl From<&ColorBucket> for Cluster {
    fn from(bucket: &ColorBucket) -> Self {
        Self {
            count: bucket.count as u64,
            sum_r: bucket.sum_r,
            sum_g: bucket.sum_g,
            sum_b: bucket.sum_b,
            centroid: bucket.centroid(),
        }
    }
}

#[inline]
fn round_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn distance_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

/// Reduce a bucket table to at most six dominant colors with default options.
pub fn reduce(table: &BucketTable) -> Vec<PaletteEntry> {
    reduce_with(table, &PaletteOptions::default())
}

/// Reduce a bucket table to a ranked palette.
///
/// Entries are ordered by descending pixel count; equal counts keep the order
/// in which their clusters were founded.
pub fn reduce_with(table: &BucketTable, options: &PaletteOptions) -> Vec<PaletteEntry> {
    let (mut clusters, examined) = merge_buckets(table, options);

    debug!(
        "palette: {} buckets examined, {} clusters formed",
        examined,
        clusters.len()
    );

    // stable: ties stay in founding order
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters
        .iter()
        .take(options.max_entries)
        .map(Cluster::to_entry)
        .collect()
}

/// Greedy merge pass. Returns the clusters in founding order and the number
/// of buckets examined.
fn merge_buckets(table: &BucketTable, options: &PaletteOptions) -> (Vec<Cluster>, usize) {
    let mut buckets: Vec<ColorBucket> = table.buckets().collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then(a.index.cmp(&b.index)));

    let radius_sq = options.merge_radius * options.merge_radius;
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut examined = 0;

    for (i, bucket) in buckets.iter().take(options.max_examined).enumerate() {
        examined = i + 1;
        let centroid = bucket.centroid();

        match clusters
            .iter_mut()
            .find(|c| distance_sq(c.centroid, centroid) <= radius_sq)
        {
            Some(cluster) => cluster.absorb(bucket),
            None => clusters.push(Cluster::from(bucket)),
        }

        // `i` buckets were examined before this one
        if clusters.len() >= options.early_stop_clusters && i > options.early_stop_examined {
            break;
        }
    }

    (clusters, examined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::ColorQuantizer;

    fn table_from(colors: &[([u8; 3], u32)]) -> BucketTable {
        let mut q = ColorQuantizer::default();
        for &([r, g, b], n) in colors {
            for _ in 0..n {
                q.accumulate(r, g, b);
            }
        }
        q.table().clone()
    }

    /// 216 colors on a 48-step lattice, pairwise farther apart than the radius.
    fn lattice_table() -> BucketTable {
        let steps = [0u8, 48, 96, 144, 192, 240];
        let mut colors = Vec::new();
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    colors.push(([r, g, b], 1));
                }
            }
        }
        table_from(&colors)
    }

    #[test]
    fn test_empty_table_yields_empty_palette() {
        let q = ColorQuantizer::default();
        assert!(reduce(q.table()).is_empty());
    }

    #[test]
    fn test_uniform_color_single_entry() {
        let table = table_from(&[([200, 150, 50], 37)]);
        let palette = reduce(&table);

        assert_eq!(palette.len(), 1);
        let entry = palette[0];
        assert_eq!((entry.r, entry.g, entry.b), (200, 150, 50));
        assert_eq!(entry.count, 37);
        assert_eq!(entry.sum_r, 200 * 37);
    }

    #[test]
    fn test_distant_colors_stay_separate_and_ranked() {
        let table = table_from(&[([250, 10, 10], 2), ([10, 10, 250], 5), ([10, 250, 10], 3)]);
        let palette = reduce(&table);

        let ranked: Vec<(u8, u8, u8, u64)> =
            palette.iter().map(|e| (e.r, e.g, e.b, e.count)).collect();
        assert_eq!(
            ranked,
            vec![(10, 10, 250, 5), (10, 250, 10, 3), (250, 10, 10, 2)]
        );
    }

    #[test]
    fn test_adjacent_buckets_merge() {
        // different buckets (6 vs 7 on red), 20 apart
        let table = table_from(&[([100, 100, 100], 3), ([120, 100, 100], 1)]);
        let palette = reduce(&table);

        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].count, 4);
        assert_eq!((palette[0].r, palette[0].g, palette[0].b), (105, 100, 100));
    }

    #[test]
    fn test_merge_prefers_first_cluster_over_nearest() {
        // (90,60,60) is 30 from the first cluster and 20 from the second
        let table = table_from(&[([60, 60, 60], 10), ([110, 60, 60], 5), ([90, 60, 60], 1)]);
        let palette = reduce(&table);

        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0].count, 11);
        // (600 + 90) / 11 = 62.73
        assert_eq!((palette[0].r, palette[0].g, palette[0].b), (63, 60, 60));
        assert_eq!(palette[1].count, 5);
        assert_eq!((palette[1].r, palette[1].g, palette[1].b), (110, 60, 60));
    }

    #[test]
    fn test_radius_is_inclusive() {
        // exactly 36 apart on the red axis
        let table = table_from(&[([100, 0, 0], 2), ([136, 0, 0], 1)]);
        assert_eq!(reduce(&table).len(), 1);

        let table = table_from(&[([100, 0, 0], 2), ([137, 0, 0], 1)]);
        assert_eq!(reduce(&table).len(), 2);
    }

    #[test]
    fn test_equal_counts_break_ties_by_bucket_index() {
        // (0,0,200) has a lower bucket index than (200,0,0)
        let table = table_from(&[([200, 0, 0], 4), ([0, 0, 200], 4)]);
        let palette = reduce(&table);
        assert_eq!((palette[0].r, palette[0].b), (0, 200));
        assert_eq!((palette[1].r, palette[1].b), (200, 0));
    }

    #[test]
    fn test_at_most_six_entries() {
        let palette = reduce(&lattice_table());
        assert_eq!(palette.len(), 6);
        assert!(palette.iter().all(|e| e.count == 1));
    }

    #[test]
    fn test_early_stop_after_66th_bucket() {
        let (clusters, examined) = merge_buckets(&lattice_table(), &PaletteOptions::default());
        assert_eq!(examined, 66);
        assert_eq!(clusters.len(), 66);
    }

    #[test]
    fn test_66th_bucket_can_change_ranking() {
        let mut colors = vec![
            ([240, 0, 0], 100),
            ([0, 240, 0], 90),
            ([0, 0, 240], 80),
            ([240, 240, 0], 70),
            ([240, 0, 240], 60),
            ([0, 240, 240], 50),
            ([0, 0, 0], 49),
        ];
        // 58 isolated lattice colors from the cube interior
        let inner = [48u8, 96, 144, 192];
        for &r in &inner {
            for &g in &inner {
                for &b in &inner {
                    colors.push(([r, g, b], 3));
                }
            }
        }
        colors.truncate(7 + 58);
        // sorts last; within the radius of black only
        colors.push(([16, 16, 16], 2));

        let table = table_from(&colors);
        let (_, examined) = merge_buckets(&table, &PaletteOptions::default());
        assert_eq!(examined, 66);

        let palette = reduce(&table);
        let counts: Vec<u64> = palette.iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![100, 90, 80, 70, 60, 51]);
        // (16 * 2) / 51 rounds to 1
        assert_eq!(palette[5].hex(), "#010101");
    }

    #[test]
    fn test_examined_cap() {
        let options = PaletteOptions {
            early_stop_clusters: usize::MAX,
            max_examined: 100,
            ..PaletteOptions::default()
        };
        let (_, examined) = merge_buckets(&lattice_table(), &options);
        assert_eq!(examined, 100);

        let options = PaletteOptions {
            early_stop_clusters: usize::MAX,
            ..PaletteOptions::default()
        };
        let (_, examined) = merge_buckets(&lattice_table(), &options);
        assert_eq!(examined, 216);
    }

    #[test]
    fn test_no_early_stop_with_few_clusters() {
        // near-identical colors spread over a few buckets fold into one cluster
        let mut colors = Vec::new();
        for i in 0..100u8 {
            colors.push(([i / 10 * 2, i % 10 * 2, 0], 1));
        }
        let table = table_from(&colors);
        let (clusters, examined) = merge_buckets(&table, &PaletteOptions::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(examined, table.active_len());
    }

    #[test]
    fn test_hex_and_share() {
        let entry = PaletteEntry {
            r: 200,
            g: 150,
            b: 10,
            count: 25,
            sum_r: 0,
            sum_g: 0,
            sum_b: 0,
        };
        assert_eq!(entry.hex(), "#C8960A");
        assert!((entry.share(100) - 0.25).abs() < 1e-12);
        assert_eq!(entry.share(0), 0.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
