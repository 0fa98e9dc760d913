use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resolved genre. Looked up by id or by name and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    #[serde(alias = "uuid")]
    pub id: Uuid,
    pub name: String,
}
