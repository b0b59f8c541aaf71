//! Pipeline trait.
use crate::error::Error;

/// Implemented by each pipeline; generic over the return type so that
/// pipelines with a meaningful result can use the trait as well.
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
