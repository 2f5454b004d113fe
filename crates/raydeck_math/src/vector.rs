//! Vector helpers shared by the session and the engines.

use crate::Vec3;

/// Divide each component by the Euclidean magnitude.
///
/// Unlike [`Vec3::normalize`] this performs no debug assertion on the input:
/// a zero vector yields NaN components, which the caller passes through as is.
#[inline]
pub fn normalize_unguarded(v: Vec3) -> Vec3 {
    let length = v.length();
    Vec3::new(v.x / length, v.y / length, v.z / length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unit_length() {
        let cases = [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(0.0, 0.0, 1e-3),
            Vec3::new(120.0, -45.0, 7.5),
        ];
        for v in cases {
            let n = normalize_unguarded(v);
            assert!((n.length() - 1.0).abs() < 1e-5, "{v:?} -> {n:?}");
        }
    }

    #[test]
    fn test_normalize_zero_is_nan() {
        let n = normalize_unguarded(Vec3::ZERO);
        assert!(n.x.is_nan() && n.y.is_nan() && n.z.is_nan());
    }
}
