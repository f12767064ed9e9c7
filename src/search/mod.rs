pub mod iterator;
pub mod match_data;
pub mod simple;
pub mod leaf;
pub mod and;
pub mod or;
pub mod andnot;
pub mod rank;
pub mod near;
pub mod executor;

#[cfg(test)]
pub(crate) mod test_util;
