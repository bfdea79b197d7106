//! Coarse RGB quantization into a fixed bucket grid.
//!
//! Each channel keeps its top `bucket_bits` bits, giving
//! `buckets_per_axis^3` cells. Storage is allocated once when the quantizer
//! is built and only ever zeroed afterwards, so accumulation never allocates.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::pixels::RGBA_CHANNELS;

/// Default number of buckets along each color axis.
pub const DEFAULT_BUCKETS_PER_AXIS: u32 = 16;

/// Largest supported buckets per axis (262,144 cells).
pub const MAX_BUCKETS_PER_AXIS: u32 = 64;

/// One populated cell of the quantization grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBucket {
    /// Packed `(r << 2·bits) | (g << bits) | b` cell index
    pub index: u32,
    /// Number of pixels in the cell
    pub count: u32,
    /// Sum of red values of the pixels in the cell
    pub sum_r: u64,
    /// Sum of green values of the pixels in the cell
    pub sum_g: u64,
    /// Sum of blue values of the pixels in the cell
    pub sum_b: u64,
}

impl ColorBucket {
    /// Mean color of the cell.
    pub fn centroid(&self) -> [f64; 3] {
        let n = self.count as f64;
        [
            self.sum_r as f64 / n,
            self.sum_g as f64 / n,
            self.sum_b as f64 / n,
        ]
    }
}

/// Fixed-size table of per-bucket counts and channel sums.
#[derive(Debug, Clone)]
pub struct BucketTable {
    bucket_bits: u32,
    counts: Vec<u32>,
    sum_r: Vec<u64>,
    sum_g: Vec<u64>,
    sum_b: Vec<u64>,
}

impl BucketTable {
    fn with_bits(bucket_bits: u32) -> Self {
        let cells = 1usize << (3 * bucket_bits);
        Self {
            bucket_bits,
            counts: vec![0; cells],
            sum_r: vec![0; cells],
            sum_g: vec![0; cells],
            sum_b: vec![0; cells],
        }
    }

    pub fn bucket_bits(&self) -> u32 {
        self.bucket_bits
    }

    pub fn buckets_per_axis(&self) -> u32 {
        1 << self.bucket_bits
    }

    /// Total number of cells, populated or not.
    pub fn capacity(&self) -> usize {
        self.counts.len()
    }

    /// Cell index for a color.
    #[inline]
    pub fn index_of(&self, r: u8, g: u8, b: u8) -> usize {
        bucket_index(r, g, b, self.bucket_bits)
    }

    /// Look up a single cell; `None` if it is empty or out of range.
    pub fn get(&self, index: usize) -> Option<ColorBucket> {
        let count = *self.counts.get(index)?;
        if count == 0 {
            return None;
        }
        Some(ColorBucket {
            index: index as u32,
            count,
            sum_r: self.sum_r[index],
            sum_g: self.sum_g[index],
            sum_b: self.sum_b[index],
        })
    }

    /// Populated cells in ascending index order.
    pub fn buckets(&self) -> impl Iterator<Item = ColorBucket> + '_ {
        (0..self.counts.len()).filter_map(move |i| self.get(i))
    }

    /// Number of populated cells.
    pub fn active_len(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Pixels recorded across all cells.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }
}

/// Pack the top `bucket_bits` bits of each channel into a cell index.
#[inline]
pub fn bucket_index(r: u8, g: u8, b: u8, bucket_bits: u32) -> usize {
    let shift = 8 - bucket_bits;
    let rb = (r as usize) >> shift;
    let gb = (g as usize) >> shift;
    let bb = (b as usize) >> shift;
    (rb << (2 * bucket_bits)) | (gb << bucket_bits) | bb
}

/// Streaming quantizer feeding a [`BucketTable`].
#[derive(Debug, Clone)]
pub struct ColorQuantizer {
    table: BucketTable,
}

impl ColorQuantizer {
    /// Build a quantizer with `buckets_per_axis` cells along each axis.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidBucketsPerAxis`] unless the value is a
    /// power of two no larger than [`MAX_BUCKETS_PER_AXIS`].
    pub fn new(buckets_per_axis: u32) -> Result<Self> {
        if !buckets_per_axis.is_power_of_two() || buckets_per_axis > MAX_BUCKETS_PER_AXIS {
            return Err(AnalysisError::InvalidBucketsPerAxis(buckets_per_axis));
        }
        let bucket_bits = buckets_per_axis.trailing_zeros();
        Ok(Self {
            table: BucketTable::with_bits(bucket_bits),
        })
    }

    /// Zero every cell.
    pub fn reset(&mut self) {
        self.table.counts.fill(0);
        self.table.sum_r.fill(0);
        self.table.sum_g.fill(0);
        self.table.sum_b.fill(0);
    }

    /// Record one pixel.
    #[inline]
    pub fn accumulate(&mut self, r: u8, g: u8, b: u8) {
        let idx = self.table.index_of(r, g, b);
        self.table.counts[idx] += 1;
        self.table.sum_r[idx] += r as u64;
        self.table.sum_g[idx] += g as u64;
        self.table.sum_b[idx] += b as u64;
    }

    /// Record every pixel of an interleaved RGBA slice.
    pub fn accumulate_rgba(&mut self, samples: &[u8]) {
        for px in samples.chunks_exact(RGBA_CHANNELS) {
            self.accumulate(px[0], px[1], px[2]);
        }
    }

    pub fn table(&self) -> &BucketTable {
        &self.table
    }
}

impl Default for ColorQuantizer {
    fn default() -> Self {
        let bucket_bits = DEFAULT_BUCKETS_PER_AXIS.trailing_zeros();
        Self {
            table: BucketTable::with_bits(bucket_bits),
        }
    }
}
