//! Blocking HTTP client for the OneOps transition and operations APIs

use crate::wire::WireResource;
use ooinv_core::{ClientError, ClientResult, ResourceClient, ResourceRecord};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for one organization/assembly
#[derive(Debug, Clone)]
pub struct OoConfig {
    /// Base endpoint, ending with a forward slash
    pub endpoint: String,
    pub organization: String,
    pub assembly: String,
    /// API token, presented as the basic-auth username
    pub api_token: String,
}

/// Blocking OneOps API client
///
/// One inventory run issues a bounded sequence of listing calls through this
/// client; there is no caching between calls.
#[derive(Debug)]
pub struct OoClient {
    http: Client,
    config: OoConfig,
}

impl OoClient {
    /// Build a client with default timeouts
    pub fn new(config: OoConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| transport("http client", err))?;
        Ok(Self { http, config })
    }

    fn org_url(&self, suffix: &str) -> String {
        format!(
            "{}{}/{suffix}",
            self.config.endpoint, self.config.organization
        )
    }

    fn transition_url(&self, suffix: &str) -> String {
        self.org_url(&format!(
            "assemblies/{}/transition/{suffix}",
            self.config.assembly
        ))
    }

    fn operations_url(&self, suffix: &str) -> String {
        self.org_url(&format!(
            "assemblies/{}/operations/{suffix}",
            self.config.assembly
        ))
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> ClientResult<T> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.api_token, Some(""))
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|err| transport(url, err))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(url.to_string()));
        }
        let response = response
            .error_for_status()
            .map_err(|err| transport(url, err))?;
        response.json().map_err(|err| transport(url, err))
    }

    fn get_list(&self, url: &str) -> ClientResult<Vec<ResourceRecord>> {
        let wires: Vec<WireResource> = self.get_json(url)?;
        Ok(wires.into_iter().map(Into::into).collect())
    }
}

fn transport(resource: &str, err: reqwest::Error) -> ClientError {
    ClientError::Transport {
        resource: resource.to_string(),
        source: Box::new(err),
    }
}

impl ResourceClient for OoClient {
    fn list_clouds(&self) -> ClientResult<Vec<ResourceRecord>> {
        self.get_list(&self.org_url("clouds"))
    }

    fn list_environments(&self) -> ClientResult<Vec<ResourceRecord>> {
        self.get_list(&self.transition_url("environments"))
    }

    fn get_environment(&self, environment: &str) -> ClientResult<ResourceRecord> {
        let url = self.transition_url(&format!("environments/{environment}"));
        let wire: WireResource = self.get_json(&url)?;
        Ok(wire.into())
    }

    fn list_platforms(&self, environment: &str) -> ClientResult<Vec<ResourceRecord>> {
        self.get_list(&self.transition_url(&format!("environments/{environment}/platforms")))
    }

    fn list_platform_components(
        &self,
        environment: &str,
        platform: &str,
    ) -> ClientResult<Vec<ResourceRecord>> {
        self.get_list(&self.transition_url(&format!(
            "environments/{environment}/platforms/{platform}/components"
        )))
    }

    fn list_global_variables(&self, environment: &str) -> ClientResult<Vec<ResourceRecord>> {
        self.get_list(&self.transition_url(&format!("environments/{environment}/variables")))
    }

    fn list_platform_variables(
        &self,
        environment: &str,
        platform: &str,
    ) -> ClientResult<Vec<ResourceRecord>> {
        self.get_list(&self.transition_url(&format!(
            "environments/{environment}/platforms/{platform}/variables"
        )))
    }

    fn list_instances(
        &self,
        environment: &str,
        platform: &str,
        component: &str,
    ) -> ClientResult<Vec<ResourceRecord>> {
        self.get_list(&self.operations_url(&format!(
            "environments/{environment}/platforms/{platform}/components/{component}/instances?instances_state=all"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OoConfig {
        OoConfig {
            endpoint: "https://oneops.example.com/".to_string(),
            organization: "acme".to_string(),
            assembly: "app".to_string(),
            api_token: "token".to_string(),
        }
    }

    #[test]
    fn test_url_construction() {
        let client = OoClient::new(config()).unwrap();
        assert_eq!(
            client.org_url("clouds"),
            "https://oneops.example.com/acme/clouds"
        );
        assert_eq!(
            client.transition_url("environments/prod/platforms"),
            "https://oneops.example.com/acme/assemblies/app/transition/environments/prod/platforms"
        );
        assert_eq!(
            client.operations_url("environments/prod/platforms/web/components/compute/instances"),
            "https://oneops.example.com/acme/assemblies/app/operations/environments/prod/platforms/web/components/compute/instances"
        );
    }
}
