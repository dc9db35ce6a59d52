//! Per-destination-pixel contribution tables (spec §4.6).

use crate::filters::InterpolationDetails;

/// Weights zeroed magnitude threshold (Design Note "Numerical tolerances");
/// must be preserved exactly for cross-platform-stable tables.
pub const ZERO_WEIGHT_THRESHOLD: f32 = 2e-8;

/// One output pixel's source window and weights, indexing into the
/// table's flat `weights` array.
#[derive(Debug, Clone, Copy)]
pub struct ContribRow {
  pub left: i64,
  pub right: i64,
  weight_offset: usize,
}

/// Output-line-length rows of (source range, weights) (spec §3
/// "Contribution Table").
#[derive(Debug, Clone)]
pub struct ContributionTable {
  pub rows: Vec<ContribRow>,
  pub weights: Vec<f32>,
  pub allocated_window_size: usize,
  pub percent_negative_weight: f32,
}
impl ContributionTable {
  pub fn weights_for(&self, row: usize) -> &[f32] {
    let r = &self.rows[row];
    let len = (r.right - r.left + 1).max(0) as usize;
    &self.weights[r.weight_offset..r.weight_offset + len]
  }

  /// Builds a table mapping `n_out` destination pixels onto `n_in` source
  /// pixels using `filter` (spec §4.6, steps 1-5).
  pub fn build(n_out: usize, n_in: usize, filter: &InterpolationDetails) -> Self {
    trace!("building contribution table: {n_in} -> {n_out}, window {}", filter.window);
    let scale = n_out as f32 / n_in as f32;
    let downscale_factor = scale.min(1.0);
    let half_source_window = (filter.window + 0.5) / downscale_factor;
    let allocated_window_size = 2 * (half_source_window - f32::EPSILON).ceil() as usize + 1;

    let mut rows = Vec::with_capacity(n_out);
    let mut weights = vec![0.0f32; n_out * allocated_window_size];
    let mut measured_neg_total = 0.0f32;
    let mut measured_pos_total = 0.0f32;

    for u in 0..n_out {
      let center = (u as f32 + 0.5) / scale - 0.5;
      let left_edge = (center.floor() as i64) - ((allocated_window_size as i64 - 1) / 2);
      let right_edge = left_edge + allocated_window_size as i64 - 1;
      let left_edge = left_edge.clamp(0, n_in as i64 - 1);
      let right_edge = right_edge.clamp(0, n_in as i64 - 1);

      let base = u * allocated_window_size;
      let mut total = 0.0f32;
      let mut pos_sum = 0.0f32;
      let mut neg_sum = 0.0f32;
      let count = (right_edge - left_edge + 1) as usize;
      for (slot, ix) in (left_edge..=right_edge).enumerate() {
        let mut w = filter.evaluate(downscale_factor * (ix as f32 - center));
        if w.abs() <= ZERO_WEIGHT_THRESHOLD {
          w = 0.0;
        }
        weights[base + slot] = w;
        total += w;
        if w > 0.0 {
          pos_sum += w;
        } else {
          neg_sum += w;
        }
      }

      let desired = filter.sharpen_percent_goal;
      let intrinsic_neg = if pos_sum > 0.0 { -neg_sum / pos_sum } else { 0.0 };
      if total <= 0.0 || desired > intrinsic_neg {
        let target_pos = 1.0 / (1.0 - desired);
        let target_neg = -desired * target_pos;
        let pos_scale = if pos_sum > 0.0 { target_pos / pos_sum } else { 0.0 };
        let neg_scale = if neg_sum < 0.0 { target_neg / neg_sum } else { 0.0 };
        for slot in weights[base..base + count].iter_mut() {
          if *slot > 0.0 {
            *slot *= pos_scale;
          } else if *slot < 0.0 {
            *slot *= neg_scale;
          }
        }
      } else {
        let inv = 1.0 / total;
        for slot in weights[base..base + count].iter_mut() {
          *slot *= inv;
        }
      }

      // Trim leading/trailing zero weights (spec §4.6 step 5, last bullet).
      let mut left = left_edge;
      let mut right = right_edge;
      let mut lo = 0usize;
      let mut hi = count;
      while lo < hi && weights[base + lo] == 0.0 {
        lo += 1;
        left += 1;
      }
      while hi > lo && weights[base + hi - 1] == 0.0 {
        hi -= 1;
        right -= 1;
      }

      for slot in weights[base..base + count].iter() {
        if *slot > 0.0 {
          measured_pos_total += *slot;
        } else if *slot < 0.0 {
          measured_neg_total += -*slot;
        }
      }

      rows.push(ContribRow { left, right, weight_offset: base + lo });
    }

    let percent_negative_weight =
      if measured_pos_total > 0.0 { measured_neg_total / measured_pos_total } else { 0.0 };
    trace!("contribution table built: negative weight {:.4}%", percent_negative_weight * 100.0);

    Self { rows, weights, allocated_window_size, percent_negative_weight }
  }
}
