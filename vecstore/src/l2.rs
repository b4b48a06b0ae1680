/// Compute the squared Euclidean distance between two vectors.
///
/// Uses f64 accumulation so that rankings do not depend on summation order
/// at f32 precision. Callers check dimensions first; extra elements of the
/// longer slice are ignored.
pub fn l2_squared(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        assert_eq!(l2_squared(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_unit_axes() {
        let d = l2_squared(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!((d - 2.0).abs() < 1e-12, "orthogonal: got {d}");
    }

    #[test]
    fn test_not_square_rooted() {
        assert_eq!(l2_squared(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }

    #[test]
    fn test_symmetric() {
        let a = [0.25f32, -1.5, 3.0];
        let b = [1.0f32, 0.5, -2.0];
        assert_eq!(l2_squared(&a, &b), l2_squared(&b, &a));
    }
}
