pub(crate) mod kmeanplusplus;
pub(crate) mod precomputed;
pub(crate) mod randomsample;
pub(crate) mod uniform;
