//! Configuration from OO_* environment variables

use ooinv_core::HostMethod;
use std::env;

pub const ENV_API_TOKEN: &str = "OO_API_TOKEN";
pub const ENV_ORG: &str = "OO_ORG";
pub const ENV_ASSEMBLY: &str = "OO_ASSEMBLY";
pub const ENV_ENV: &str = "OO_ENV";
pub const ENV_ENDPOINT: &str = "OO_ENDPOINT";
pub const ENV_HOST_METHOD: &str = "OO_HOST_METHOD";

/// Settings resolved from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub organization: String,
    pub assembly: String,
    /// Target environment; absent means the whole assembly is scanned
    pub environment: Option<String>,
    pub endpoint: String,
    pub host_method: HostMethod,
}

impl Config {
    /// Read configuration from the process environment
    ///
    /// Every missing or invalid variable is reported, not just the first.
    pub fn from_env() -> Result<Self, Vec<String>> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Vec<String>> {
        let mut problems = Vec::new();

        let api_token = required(&lookup, &mut problems, ENV_API_TOKEN);
        let organization = required(&lookup, &mut problems, ENV_ORG);
        let assembly = required(&lookup, &mut problems, ENV_ASSEMBLY);
        let environment = lookup(ENV_ENV).filter(|value| !value.is_empty());

        let endpoint = required(&lookup, &mut problems, ENV_ENDPOINT);
        if let Some(value) = &endpoint {
            if !value.ends_with('/') {
                problems.push(format!(
                    "Environment variable must end with a forward-slash: {ENV_ENDPOINT}"
                ));
            }
        }

        let host_method = match lookup(ENV_HOST_METHOD).filter(|value| !value.is_empty()) {
            None => Some(HostMethod::default()),
            Some(raw) => match raw.parse() {
                Ok(method) => Some(method),
                Err(_) => {
                    problems.push(format!(
                        "Environment variable {ENV_HOST_METHOD} must be set to one of: \
                         public_ip, private_ip, or hostname"
                    ));
                    None
                }
            },
        };

        match (
            api_token,
            organization,
            assembly,
            endpoint,
            host_method,
            problems.is_empty(),
        ) {
            (
                Some(api_token),
                Some(organization),
                Some(assembly),
                Some(endpoint),
                Some(host_method),
                true,
            ) => Ok(Self {
                api_token,
                organization,
                assembly,
                environment,
                endpoint,
                host_method,
            }),
            _ => Err(problems),
        }
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    problems: &mut Vec<String>,
    name: &str,
) -> Option<String> {
    match lookup(name).filter(|value| !value.is_empty()) {
        Some(value) => Some(value),
        None => {
            problems.push(format!("Missing required environment variable: {name}"));
            None
        }
    }
}
