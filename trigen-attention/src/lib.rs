//! Standalone scaled dot-product attention.
//!
//! A stateless numerical transform, independent of the trigram model: given
//! query, key and value batches it returns the attention-weighted output and
//! the normalized attention weights. Kept in its own crate so the language
//! model carries no linear-algebra dependencies.

use ndarray::{Array2, Array3, Axis, Zip};
use std::error::Error;

/// Score assigned to masked positions before normalization. Large enough
/// that the softmax drives their weight to zero.
const MASKED_SCORE: f32 = -1e9;

// Row-wise softmax with the per-row maximum subtracted before
// exponentiating for numerical stability.
fn softmax_rows(scores: &Array2<f32>) -> Array2<f32> {
    let max_val = scores.fold_axis(Axis(1), f32::NEG_INFINITY, |&a, &b| a.max(b));
    let max_val_broadcastable = max_val.insert_axis(Axis(1));

    let exp_values = (scores - &max_val_broadcastable).mapv(f32::exp);

    let sum_exp_values = exp_values.sum_axis(Axis(1));
    let sum_exp_values_broadcastable = sum_exp_values.insert_axis(Axis(1));

    &exp_values / &sum_exp_values_broadcastable
}

/// Computes scaled dot-product attention.
///
/// # Parameters
/// - `query`: shape (batch, seq_q, d_k)
/// - `key`: shape (batch, seq_k, d_k)
/// - `value`: shape (batch, seq_k, d_v)
/// - `mask`: optional, shape (batch or 1, seq_q, seq_k); positions where the
///   mask is 0 are excluded from the softmax. A batch axis of 1 broadcasts
///   over the whole batch.
///
/// # Returns
/// `(output, attention_weights)` with shapes (batch, seq_q, d_v) and
/// (batch, seq_q, seq_k). Every row of the weights along the last axis
/// sums to 1.
///
/// # Errors
/// Returns an error if the batch, sequence, or feature dimensions of the
/// inputs do not line up.
pub fn scaled_dot_product_attention(
    query: &Array3<f32>,
    key: &Array3<f32>,
    value: &Array3<f32>,
    mask: Option<&Array3<f32>>,
) -> Result<(Array3<f32>, Array3<f32>), Box<dyn Error>> {
    let (batch, seq_q, d_k) = query.dim();
    let (key_batch, seq_k, key_d) = key.dim();
    let (value_batch, value_seq, d_v) = value.dim();

    if key_batch != batch || value_batch != batch {
        return Err(format!(
            "Batch mismatch: query {}, key {}, value {}",
            batch, key_batch, value_batch
        )
        .into());
    }
    if key_d != d_k {
        return Err(format!("Feature mismatch: query d_k {}, key d_k {}", d_k, key_d).into());
    }
    if value_seq != seq_k {
        return Err(format!(
            "Sequence mismatch: key seq_len {}, value seq_len {}",
            seq_k, value_seq
        )
        .into());
    }
    if let Some(mask) = mask {
        let (mask_batch, mask_q, mask_k) = mask.dim();
        if (mask_batch != batch && mask_batch != 1) || mask_q != seq_q || mask_k != seq_k {
            return Err(format!(
                "Mask shape {:?} not broadcastable to ({}, {}, {})",
                mask.dim(),
                batch,
                seq_q,
                seq_k
            )
            .into());
        }
    }

    let scale = (d_k as f32).sqrt();

    let mut weights = Array3::<f32>::zeros((batch, seq_q, seq_k));
    let mut output = Array3::<f32>::zeros((batch, seq_q, d_v));

    for b in 0..batch {
        let q = query.index_axis(Axis(0), b);
        let k = key.index_axis(Axis(0), b);
        let v = value.index_axis(Axis(0), b);

        let mut scores = q.dot(&k.t()) / scale;

        if let Some(mask) = mask {
            let mask_index = if mask.dim().0 == 1 { 0 } else { b };
            let mask_slice = mask.index_axis(Axis(0), mask_index);
            Zip::from(&mut scores).and(&mask_slice).for_each(|score, &m| {
                if m == 0.0 {
                    *score = MASKED_SCORE;
                }
            });
        }

        let batch_weights = softmax_rows(&scores);
        output.index_axis_mut(Axis(0), b).assign(&batch_weights.dot(&v));
        weights.index_axis_mut(Axis(0), b).assign(&batch_weights);
    }

    Ok((output, weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn demo_inputs() -> (Array3<f32>, Array3<f32>, Array3<f32>) {
        let q = array![[
            [1.0_f32, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 1.0],
            [1.0, 1.0, 0.0, 0.0]
        ]];
        let k = q.clone();
        let v = array![[[10.0_f32, 0.0], [0.0, 10.0], [5.0, 5.0]]];
        (q, k, v)
    }

    #[test]
    fn weight_rows_sum_to_one() {
        let (q, k, v) = demo_inputs();
        let (_, weights) = scaled_dot_product_attention(&q, &k, &v, None).unwrap();

        for row in weights.index_axis(Axis(0), 0).rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn demo_matrices_match_reference_values() {
        let (q, k, v) = demo_inputs();
        let (output, weights) = scaled_dot_product_attention(&q, &k, &v, None).unwrap();

        // First query row scores are [1, 0, 0.5] after scaling by sqrt(4)
        assert_relative_eq!(weights[[0, 0, 0]], 0.506477, epsilon = 1e-5);
        assert_relative_eq!(weights[[0, 0, 1]], 0.186323, epsilon = 1e-5);
        assert_relative_eq!(weights[[0, 0, 2]], 0.307200, epsilon = 1e-5);

        assert_relative_eq!(output[[0, 0, 0]], 6.600768, epsilon = 1e-4);
        assert_relative_eq!(output[[0, 0, 1]], 3.399232, epsilon = 1e-4);
    }

    #[test]
    fn output_is_convex_combination_of_values() {
        let (q, k, v) = demo_inputs();
        let (output, _) = scaled_dot_product_attention(&q, &k, &v, None).unwrap();

        // Every V row sums to 10, so every convex combination does too
        for row in output.index_axis(Axis(0), 0).rows() {
            assert_relative_eq!(row.sum(), 10.0, epsilon = 1e-4);
            for &component in row {
                assert!((0.0..=10.0).contains(&component));
            }
        }
    }

    #[test]
    fn masked_positions_are_excluded() {
        let (q, k, v) = demo_inputs();
        let mask = array![[
            [1.0_f32, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0]
        ]];

        let (output, weights) = scaled_dot_product_attention(&q, &k, &v, Some(&mask)).unwrap();

        // The first query position may only attend to the first key
        assert_relative_eq!(weights[[0, 0, 0]], 1.0, epsilon = 1e-6);
        assert_relative_eq!(weights[[0, 0, 1]], 0.0, epsilon = 1e-6);
        assert_relative_eq!(weights[[0, 0, 2]], 0.0, epsilon = 1e-6);
        assert_relative_eq!(output[[0, 0, 0]], 10.0, epsilon = 1e-4);
        assert_relative_eq!(output[[0, 0, 1]], 0.0, epsilon = 1e-4);
    }

    #[test]
    fn single_batch_mask_broadcasts() {
        let (q1, k1, v1) = demo_inputs();
        let q = ndarray::concatenate(Axis(0), &[q1.view(), q1.view()]).unwrap();
        let k = ndarray::concatenate(Axis(0), &[k1.view(), k1.view()]).unwrap();
        let v = ndarray::concatenate(Axis(0), &[v1.view(), v1.view()]).unwrap();
        let mask = Array3::<f32>::ones((1, 3, 3));

        let (_, weights) = scaled_dot_product_attention(&q, &k, &v, Some(&mask)).unwrap();
        assert_eq!(weights.dim(), (2, 3, 3));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let (q, k, _) = demo_inputs();

        // Value sequence length disagrees with the keys
        let short_v = array![[[10.0_f32, 0.0], [0.0, 10.0]]];
        assert!(scaled_dot_product_attention(&q, &k, &short_v, None).is_err());

        // Key feature dimension disagrees with the queries
        let narrow_k = array![[[1.0_f32, 0.0], [0.0, 1.0], [1.0, 1.0]]];
        let v = array![[[10.0_f32, 0.0], [0.0, 10.0], [5.0, 5.0]]];
        assert!(scaled_dot_product_attention(&q, &narrow_k, &v, None).is_err());

        // Mask wider than the key sequence
        let wide_mask = Array3::<f32>::ones((1, 3, 4));
        assert!(scaled_dot_product_attention(&q, &k, &v, Some(&wide_mask)).is_err());
    }
}
