use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-agnostic projection of one remote record.
///
/// Every integration maps its native objects into this shape so the rest of
/// the platform can list them uniformly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationItem {
    pub id: String,

    /// Record kind, e.g. `"contact"`
    #[serde(rename = "type")]
    pub item_type: String,

    pub name: String,

    pub creation_time: Option<DateTime<Utc>>,

    pub last_modified_time: Option<DateTime<Utc>>,

    /// Containing item, if the record lives inside another one
    pub parent_id: Option<String>,
}
