//! reqwest-backed `UyuniApi` implementation.
//!
//! Calls are JSON envelopes posted to the server's HTTP API endpoint. The
//! server URL is validated once, at construction, before any network call
//! is attempted; a bad URL never reaches the wire.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::DiscoveryError;

use super::{
    EndpointInfo, NetworkInfo, SystemGroup, SystemGroupMembership, UyuniApi,
    MONITORING_ENTITLEMENT,
};

/// Path of the HTTP API below the configured server base URL.
const API_PATH: &str = "/rhn/manager/api";

/// One call against the API, as the server frames it.
#[derive(Debug, Deserialize)]
struct CallEnvelope<T> {
    success: bool,
    result: Option<T>,
    message: Option<String>,
}

impl<T> CallEnvelope<T> {
    /// Check the success flag only. Some calls (logout among them) answer
    /// with a bare success envelope and no result payload.
    fn ensure_success(self) -> Result<(), CallError> {
        if self.success {
            Ok(())
        } else {
            Err(CallError::Api(
                self.message.unwrap_or_else(|| "no message".into()),
            ))
        }
    }

    /// Check the success flag and require a result payload.
    fn into_result(self, method: &str) -> Result<T, CallError> {
        if !self.success {
            return Err(CallError::Api(
                self.message.unwrap_or_else(|| "no message".into()),
            ));
        }
        self.result
            .ok_or_else(|| CallError::Api(format!("{method} returned no result")))
    }
}

/// Transport- or server-side failure of one call. Wrapped into the
/// per-dataset `DiscoveryError` variants by the trait methods.
#[derive(Debug, thiserror::Error)]
enum CallError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("server rejected the call: {0}")]
    Api(String),
}

#[derive(Debug)]
pub struct HttpApiClient {
    client: reqwest::Client,
    api_url: reqwest::Url,
}

impl HttpApiClient {
    /// Build a client for the given server base URL. Fails fast on a URL
    /// that is malformed or not http(s).
    pub fn new(host: &str) -> Result<Self, DiscoveryError> {
        let raw = format!("{}{}", host.trim_end_matches('/'), API_PATH);
        let api_url = reqwest::Url::parse(&raw)
            .map_err(|err| DiscoveryError::InvalidServerUrl(format!("{raw}: {err}")))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(DiscoveryError::InvalidServerUrl(format!(
                "{raw}: scheme must be http or https"
            )));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(DiscoveryError::Connection)?;
        Ok(Self { client, api_url })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<CallEnvelope<T>, CallError> {
        let resp = self
            .client
            .post(self.api_url.clone())
            .json(&json!({ "method": method, "params": params }))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, CallError> {
        self.post(method, params).await?.into_result(method)
    }

    /// For calls whose reply is a bare success envelope with no payload.
    async fn call_no_result(&self, method: &str, params: Value) -> Result<(), CallError> {
        self.post::<Value>(method, params).await?.ensure_success()
    }
}

#[async_trait]
impl UyuniApi for HttpApiClient {
    async fn login(&self, user: &str, pass: &str) -> Result<String, DiscoveryError> {
        self.call("auth.login", json!([user, pass]))
            .await
            .map_err(|err| DiscoveryError::Auth(Box::new(err)))
    }

    async fn logout(&self, token: &str) -> Result<(), DiscoveryError> {
        self.call_no_result("auth.logout", json!([token]))
            .await
            .map_err(|err| DiscoveryError::remote_call("logout confirmation", err))
    }

    async fn system_groups_for_monitored(
        &self,
        token: &str,
    ) -> Result<HashMap<i64, Vec<SystemGroup>>, DiscoveryError> {
        let memberships: Vec<SystemGroupMembership> = self
            .call(
                "system.listSystemGroupsForSystemsWithEntitlement",
                json!([token, MONITORING_ENTITLEMENT]),
            )
            .await
            .map_err(|err| {
                DiscoveryError::remote_call(
                    "the managed system groups information of monitored clients",
                    err,
                )
            })?;
        Ok(memberships
            .into_iter()
            .map(|m| (m.system_id, m.system_groups))
            .collect())
    }

    async fn network_info(
        &self,
        token: &str,
        system_ids: &[i64],
    ) -> Result<HashMap<i64, NetworkInfo>, DiscoveryError> {
        let infos: Vec<NetworkInfo> = self
            .call("system.getNetworkForSystems", json!([token, system_ids]))
            .await
            .map_err(|err| DiscoveryError::remote_call("the systems network information", err))?;
        Ok(infos.into_iter().map(|n| (n.system_id, n)).collect())
    }

    async fn endpoints(
        &self,
        token: &str,
        system_ids: &[i64],
    ) -> Result<Vec<EndpointInfo>, DiscoveryError> {
        self.call("system.monitoring.listEndpoints", json!([token, system_ids]))
            .await
            .map_err(|err| DiscoveryError::remote_call("endpoints information", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_server_url() {
        assert!(HttpApiClient::new("https://uyuni.example.com").is_ok());
        assert!(HttpApiClient::new("http://uyuni.example.com:8080/").is_ok());
    }

    #[test]
    fn rejects_malformed_server_url() {
        let err = HttpApiClient::new("not a url").unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidServerUrl(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = HttpApiClient::new("ftp://uyuni.example.com").unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidServerUrl(_)));
    }

    #[test]
    fn bare_success_envelope_satisfies_logout() {
        let envelope: CallEnvelope<Value> =
            serde_json::from_value(serde_json::json!({ "success": true })).unwrap();
        assert!(envelope.ensure_success().is_ok());
    }

    #[test]
    fn missing_result_still_fails_calls_that_need_one() {
        let envelope: CallEnvelope<Value> =
            serde_json::from_value(serde_json::json!({ "success": true })).unwrap();
        let err = envelope.into_result("auth.login").unwrap_err();
        assert!(err.to_string().contains("auth.login returned no result"));
    }

    #[test]
    fn rejected_envelope_carries_the_server_message() {
        let envelope: CallEnvelope<Value> = serde_json::from_value(
            serde_json::json!({ "success": false, "message": "session expired" }),
        )
        .unwrap();
        let err = envelope.ensure_success().unwrap_err();
        assert!(err.to_string().contains("session expired"));
    }

    #[test]
    fn membership_list_keys_by_system_id() {
        let raw = serde_json::json!([
            { "id": 7, "system_groups": [{ "id": 1, "name": "dbservers" }] },
            { "id": 9, "system_groups": [] }
        ]);
        let memberships: Vec<SystemGroupMembership> = serde_json::from_value(raw).unwrap();
        let keyed: HashMap<i64, Vec<SystemGroup>> = memberships
            .into_iter()
            .map(|m| (m.system_id, m.system_groups))
            .collect();
        assert_eq!(keyed[&7].len(), 1);
        assert_eq!(keyed[&7][0].name, "dbservers");
        assert!(keyed[&9].is_empty());
    }
}
