//! Token emission.
//!
//! Turns an audited contribution report into freshly minted tokens. The
//! reward is a weighted sum of the report's metrics, scaled by the
//! contributor's reputation and by an emission factor that shrinks as the
//! network grows.

pub mod eco;
pub mod engine;
pub mod error;

pub use eco::{qli_score, trees_for, COMPUTATIONS_PER_TREE};
pub use engine::{emission_factor, EmissionEngine, MetricWeights};
pub use error::EmissionError;
