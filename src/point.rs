use crate::{KMeansError, Primitive, Result};

/// A fixed-dimension vector of attributes, tagged with an identity.
///
/// The identity is only used to compare cluster memberships across iterations, two points with
/// equal attributes but different ids are different points.
#[derive(Clone, Debug, PartialEq)]
pub struct Point<T: Primitive> {
    id: usize,
    values: Vec<T>,
}

impl<T: Primitive> Point<T> {
    /// Create a point from its attribute values.
    pub fn new(id: usize, values: Vec<T>) -> Self {
        Self { id, values }
    }

    /// Create a point with **dims** attributes, all set to zero.
    pub fn zeros(dims: usize, id: usize) -> Self {
        Self { id, values: vec![T::zero(); dims] }
    }

    pub fn id(&self) -> usize { self.id }

    pub fn values(&self) -> &[T] { &self.values }

    pub fn dimensionality(&self) -> usize { self.values.len() }

    /// Value of the attribute at **index**.
    pub fn get(&self, index: usize) -> Result<T> {
        self.values.get(index).copied()
            .ok_or(KMeansError::IndexOutOfRange { index, dims: self.values.len() })
    }

    /// Overwrite the attribute at **index**. The dimensionality never changes.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let dims = self.values.len();
        let slot = self.values.get_mut(index).ok_or(KMeansError::IndexOutOfRange { index, dims })?;
        *slot = value;
        Ok(())
    }

    /// Euclidean distance between two points of the same dimensionality.
    pub fn distance(&self, other: &Point<T>) -> Result<T> {
        if self.dimensionality() != other.dimensionality() {
            return Err(KMeansError::DimensionMismatch {
                expected: self.dimensionality(),
                found: other.dimensionality(),
            });
        }
        Ok(squared_distance(&self.values, &other.values).sqrt())
    }

    pub(crate) fn values_mut(&mut self) -> &mut [T] { &mut self.values }

    pub(crate) fn first_non_finite(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_finite())
    }
}

/// Squared euclidean distance. Callers guarantee equal lengths.
#[inline(always)]
pub(crate) fn squared_distance<T: Primitive>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter())
        .map(|(&av, &bv)| av - bv)      // <a> - <b>
        .map(|v| v * v)                 // <vec_components> ^2
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn get_and_set_f32() { get_and_set::<f32>(); }
    #[test] fn get_and_set_f64() { get_and_set::<f64>(); }

    fn get_and_set<T: Primitive>() {
        let mut p = Point::new(7, vec![T::from(1.5).unwrap(), T::from(-2.0).unwrap()]);
        assert_eq!(p.id(), 7);
        assert_eq!(p.dimensionality(), 2);
        assert_eq!(p.get(1), Ok(T::from(-2.0).unwrap()));

        p.set(0, T::from(4.0).unwrap()).unwrap();
        assert_eq!(p.values(), &[T::from(4.0).unwrap(), T::from(-2.0).unwrap()]);
        assert_eq!(p.dimensionality(), 2);
    }

    #[test]
    fn out_of_range_access() {
        let mut p = Point::<f64>::zeros(2, 1);
        assert_eq!(p.get(2), Err(KMeansError::IndexOutOfRange { index: 2, dims: 2 }));
        assert_eq!(p.set(5, 1.0), Err(KMeansError::IndexOutOfRange { index: 5, dims: 2 }));
        assert_eq!(p.values(), &[0.0, 0.0]);
    }

    #[test] fn euclidean_distance_f32() { euclidean_distance::<f32>(1e-5); }
    #[test] fn euclidean_distance_f64() { euclidean_distance::<f64>(1e-12); }

    fn euclidean_distance<T: Primitive>(tol: T) {
        let a = Point::new(1, vec![T::zero(), T::zero()]);
        let b = Point::new(2, vec![T::from(3.0).unwrap(), T::from(4.0).unwrap()]);
        assert_approx_eq!(a.distance(&b).unwrap(), T::from(5.0).unwrap(), tol);
        assert_approx_eq!(b.distance(&a).unwrap(), T::from(5.0).unwrap(), tol);
        assert_approx_eq!(a.distance(&a).unwrap(), T::zero(), tol);

        let c = Point::new(3, vec![T::one(), T::one(), T::one()]);
        let d = Point::new(4, vec![T::from(2.0).unwrap(), T::from(3.0).unwrap(), T::from(-1.0).unwrap()]);
        assert_approx_eq!(c.distance(&d).unwrap(), T::from(3.0).unwrap(), tol);
    }

    #[test]
    fn distance_dimension_mismatch() {
        let a = Point::new(1, vec![0.0f64, 0.0]);
        let b = Point::new(2, vec![0.0f64, 0.0, 0.0]);
        assert_eq!(a.distance(&b), Err(KMeansError::DimensionMismatch { expected: 2, found: 3 }));
    }

    #[test]
    fn detects_non_finite_values() {
        assert_eq!(Point::new(1, vec![0.0f64, 1.0]).first_non_finite(), None);
        assert_eq!(Point::new(1, vec![0.0f64, f64::NAN]).first_non_finite(), Some(1));
        assert_eq!(Point::new(1, vec![f64::INFINITY, 0.0]).first_non_finite(), Some(0));
    }
}
