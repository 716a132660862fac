//! Category domain model

use kernel::id::CategoryId;
use serde::{Deserialize, Serialize};

/// User-defined label for transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display color as stored by the client (e.g. `#d4af37`)
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: CategoryId::generate(),
            name: name.into(),
            color: color.into(),
        }
    }
}
