use num::{Float, NumCast};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{AddAssign, SubAssign},
};

/// Floating point types the clustering engine can run on.
pub trait Primitive: Float + NumCast + AddAssign + SubAssign + Sum + SampleUniform
                + Default + Display + Debug + LowerExp + Sync + Send + 'static
                + for<'a> AddAssign<&'a Self> {}
impl Primitive for f32 {}
impl Primitive for f64 {}
