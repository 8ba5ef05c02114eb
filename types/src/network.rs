//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which Triad network a node belongs to.
///
/// Each network has its own genesis block, so trees from different networks
/// never share a root hash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Live,
    Test,
    #[default]
    Dev,
}

impl NetworkId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
            Self::Dev => "dev",
        }
    }
}
