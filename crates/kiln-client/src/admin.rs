//! Admin GraphQL passthrough.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use kiln_transport::{ApiRequest, Transport};

use crate::error::ClientError;

const AGENT_LIST_QUERY: &str = "\
query($status: String) {
  agents(status: $status) {
    id
    status
    first_contact
    mem_slots
    cpu_slots
    gpu_slots
  }
}";

/// One agent row from the admin agent listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    pub status: String,
    pub first_contact: String,
    pub mem_slots: i64,
    pub cpu_slots: i64,
    pub gpu_slots: i64,
}

/// Administrative GraphQL queries against the manager.
pub struct Admin;

impl Admin {
    /// Send a raw GraphQL query with optional variables.
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure.
    pub async fn query<T: Transport>(
        transport: &T,
        query: &str,
        variables: Option<Value>,
    ) -> Result<Value, ClientError> {
        let req = ApiRequest::post(
            "/admin/graphql",
            json!({
                "query": query,
                "variables": variables.unwrap_or_else(|| json!({})),
            }),
        );
        let resp = transport.send(req).await?.ensure_success()?;
        Ok(resp.json()?)
    }

    /// List agents filtered by status.
    ///
    /// # Errors
    /// Returns a backend error on transport or API failure, or
    /// `ClientError::Protocol` if the response lacks the agent list.
    pub async fn list_agents<T: Transport>(
        transport: &T,
        status: &str,
    ) -> Result<Vec<AgentInfo>, ClientError> {
        let data = Self::query(
            transport,
            AGENT_LIST_QUERY,
            Some(json!({ "status": status })),
        )
        .await?;
        let agents = data
            .get("agents")
            .ok_or_else(|| ClientError::Protocol("agent listing has no agents field".to_string()))?;
        serde_json::from_value(agents.clone())
            .map_err(|e| ClientError::Protocol(format!("bad agent listing: {e}")))
    }
}
