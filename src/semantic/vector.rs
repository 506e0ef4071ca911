//! Vector math shared by the write and read paths.

/// Errors that can occur during vector operations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot normalize a zero-norm vector")]
    ZeroNormVector,
}

/// Compute L2 norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` to unit length in place.
///
/// Fails on zero-norm or non-finite input rather than producing NaNs.
pub fn normalize(v: &mut [f32]) -> Result<(), VectorError> {
    let norm = l2_norm(v);
    if !norm.is_finite() || norm < f32::EPSILON {
        return Err(VectorError::ZeroNormVector);
    }

    for x in v.iter_mut() {
        *x /= norm;
    }
    Ok(())
}

/// Dot product; equals cosine similarity when both vectors are unit length.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32, VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Cosine similarity for vectors of any length. Zero vectors score 0.
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32, VectorError> {
    let dot_product = dot(a, b)?;
    let norms = l2_norm(a) * l2_norm(b);
    if norms < f32::EPSILON {
        return Ok(0.0);
    }
    Ok(dot_product / norms)
}

/// Element-wise mean of equally sized vectors. Returns `None` for no input.
pub fn mean<'a, I>(vectors: I) -> Result<Option<Vec<f32>>, VectorError>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut sum: Option<Vec<f32>> = None;
    let mut count = 0usize;

    for v in vectors {
        match sum.as_mut() {
            None => sum = Some(v.to_vec()),
            Some(acc) => {
                if acc.len() != v.len() {
                    return Err(VectorError::DimensionMismatch {
                        expected: acc.len(),
                        got: v.len(),
                    });
                }
                for (a, x) in acc.iter_mut().zip(v) {
                    *a += x;
                }
            }
        }
        count += 1;
    }

    Ok(sum.map(|mut acc| {
        for a in acc.iter_mut() {
            *a /= count as f32;
        }
        acc
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unit_length() {
        let mut v = vec![3.0, 4.0, 0.0];
        normalize(&mut v).unwrap();
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);
        assert!((v[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_rejected() {
        let mut v = vec![0.0; 4];
        assert_eq!(normalize(&mut v), Err(VectorError::ZeroNormVector));

        let mut nan = vec![f32::NAN, 1.0];
        assert_eq!(normalize(&mut nan), Err(VectorError::ZeroNormVector));
    }

    #[test]
    fn test_cosine_symmetric() {
        let pairs = [
            (vec![1.0, 2.0, 3.0], vec![-1.0, 0.5, 2.0]),
            (vec![0.1, 0.0, 0.0], vec![0.0, 7.0, 0.0]),
            (vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]),
        ];

        for (a, b) in pairs {
            assert_eq!(cosine(&a, &b).unwrap(), cosine(&b, &a).unwrap());
        }
    }

    #[test]
    fn test_cosine_equals_dot_for_unit_vectors() {
        let mut a = vec![1.0, 2.0, 2.0];
        let mut b = vec![2.0, 1.0, 0.0];
        normalize(&mut a).unwrap();
        normalize(&mut b).unwrap();

        let c = cosine(&a, &b).unwrap();
        let d = dot(&a, &b).unwrap();
        assert!((c - d).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = dot(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(matches!(result, Err(VectorError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_mean() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        let m = mean([&a[..], &b[..]]).unwrap().unwrap();
        assert_eq!(m, vec![0.5, 0.5]);

        let empty: Vec<&[f32]> = vec![];
        assert_eq!(mean(empty).unwrap(), None);
    }
}
