//! Store cluster records. Clusters group stores through the `cluster_stores`
//! junction.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub cluster_id: i64,
    pub cluster_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterFields {
    pub cluster_name: String,
}

impl Cluster {
    pub fn from_fields(cluster_id: i64, fields: ClusterFields) -> Self {
        Self {
            cluster_id,
            cluster_name: fields.cluster_name,
        }
    }
}
