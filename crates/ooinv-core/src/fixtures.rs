//! Test fixtures: record builders and an in-memory resource client

use crate::catalog::HostRecord;
use crate::client::{ClientError, ClientResult, ResourceClient};
use crate::resource::{ComputeMetadata, ResourceRecord};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

pub(crate) fn record(ci_id: i64, ci_name: &str, ci_class_name: &str) -> ResourceRecord {
    ResourceRecord {
        ci_id,
        ci_name: ci_name.to_string(),
        ci_class_name: ci_class_name.to_string(),
        ns_path: format!("/acme/app/{ci_name}"),
        attributes: BTreeMap::new(),
        deployed_to: None,
    }
}

pub(crate) fn with_attr(mut record: ResourceRecord, name: &str, value: Value) -> ResourceRecord {
    record.attributes.insert(name.to_string(), value);
    record
}

/// A compute instance with addresses derived from its trailing ordinal digit
/// (`compute-100-1` → 1.2.3.4 / 10.0.0.1) and a well-formed metadata block
pub(crate) fn compute_instance(
    ci_id: i64,
    ci_name: &str,
    environment: &str,
    platform: &str,
) -> ResourceRecord {
    let digit: u8 = ci_name
        .rsplit('-')
        .next()
        .and_then(|tail| tail.parse().ok())
        .unwrap_or(1);
    let metadata = format!(
        r#"{{"organization":"acme","assembly":"app","environment":"{environment}","platform":"{platform}","owner":"team@acme.com","mgmt_url":"https://oneops.example.com/r/1","component":"compute","instance":"{ci_name}"}}"#
    );
    let mut instance = record(ci_id, ci_name, "bom.oneops.1.Compute");
    instance.deployed_to = Some("aws-east".to_string());
    instance.attributes = BTreeMap::from([
        ("public_ip".to_string(), json!(format!("1.2.3.{}", 3 + digit))),
        ("private_ip".to_string(), json!(format!("10.0.0.{digit}"))),
        ("instance_name".to_string(), json!(ci_name)),
        ("instance_id".to_string(), json!(ci_id)),
        ("cores".to_string(), json!(4)),
        ("metadata".to_string(), json!(metadata)),
    ]);
    instance
}

pub(crate) fn hostname_instance(ci_id: i64, ci_name: &str, entries: &str) -> ResourceRecord {
    with_attr(
        record(ci_id, ci_name, "bom.oneops.1.Hostname"),
        "entries",
        json!(entries),
    )
}

pub(crate) fn variable(
    ci_id: i64,
    ci_name: &str,
    secure: bool,
    value: &str,
    encrypted_value: &str,
) -> ResourceRecord {
    let mut var = record(ci_id, ci_name, "manifest.Globalvar");
    var.attributes = BTreeMap::from([
        ("secure".to_string(), json!(secure.to_string())),
        ("value".to_string(), json!(value)),
        ("encrypted_value".to_string(), json!(encrypted_value)),
    ]);
    var
}

/// Wrap a compute instance into a host record under the prod/web scope
pub(crate) fn host_record(compute: ResourceRecord) -> HostRecord {
    let metadata = ComputeMetadata::decode(&compute).unwrap();
    HostRecord {
        compute: Arc::new(compute),
        metadata,
        component_name: "compute".to_string(),
        environment: Arc::new(record(10, "prod", "manifest.Environment")),
        platform: Arc::new(record(20, "web", "manifest.Platform")),
    }
}

type ScopeKey = (String, String);
type ComponentKey = (String, String, String);

/// In-memory stand-in for the remote listing service
#[derive(Debug, Default)]
pub(crate) struct FakeClient {
    pub clouds: Vec<ResourceRecord>,
    pub environments: Vec<ResourceRecord>,
    pub platforms: HashMap<String, Vec<ResourceRecord>>,
    pub components: HashMap<ScopeKey, Vec<ResourceRecord>>,
    pub instances: HashMap<ComponentKey, Vec<ResourceRecord>>,
    pub global_vars: HashMap<String, Vec<ResourceRecord>>,
    pub platform_vars: HashMap<ScopeKey, Vec<ResourceRecord>>,
    /// Component keys whose instance listing fails
    pub failing: HashSet<ComponentKey>,
}

impl ResourceClient for FakeClient {
    fn list_clouds(&self) -> ClientResult<Vec<ResourceRecord>> {
        Ok(self.clouds.clone())
    }

    fn list_environments(&self) -> ClientResult<Vec<ResourceRecord>> {
        Ok(self.environments.clone())
    }

    fn get_environment(&self, environment: &str) -> ClientResult<ResourceRecord> {
        self.environments
            .iter()
            .find(|candidate| candidate.ci_name == environment)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(environment.to_string()))
    }

    fn list_platforms(&self, environment: &str) -> ClientResult<Vec<ResourceRecord>> {
        Ok(self.platforms.get(environment).cloned().unwrap_or_default())
    }

    fn list_platform_components(
        &self,
        environment: &str,
        platform: &str,
    ) -> ClientResult<Vec<ResourceRecord>> {
        let key = (environment.to_string(), platform.to_string());
        Ok(self.components.get(&key).cloned().unwrap_or_default())
    }

    fn list_global_variables(&self, environment: &str) -> ClientResult<Vec<ResourceRecord>> {
        Ok(self.global_vars.get(environment).cloned().unwrap_or_default())
    }

    fn list_platform_variables(
        &self,
        environment: &str,
        platform: &str,
    ) -> ClientResult<Vec<ResourceRecord>> {
        let key = (environment.to_string(), platform.to_string());
        Ok(self.platform_vars.get(&key).cloned().unwrap_or_default())
    }

    fn list_instances(
        &self,
        environment: &str,
        platform: &str,
        component: &str,
    ) -> ClientResult<Vec<ResourceRecord>> {
        let key = (
            environment.to_string(),
            platform.to_string(),
            component.to_string(),
        );
        if self.failing.contains(&key) {
            return Err(ClientError::UnexpectedResponse {
                resource: format!("{environment}/{platform}/{component}/instances"),
                reason: "listing failed".to_string(),
            });
        }
        Ok(self.instances.get(&key).cloned().unwrap_or_default())
    }
}

/// One environment `prod` with one platform `web`: two computes, a hostname
/// sibling for the first ordinal only, an os sibling, an fqdn instance,
/// global and platform variables
pub(crate) fn prod_web_client() -> FakeClient {
    let mut client = FakeClient::default();

    client.clouds = vec![record(5, "aws-east", "account.Cloud")];

    let environment = with_attr(
        with_attr(
            record(10, "prod", "manifest.Environment"),
            "profile",
            json!("PROD"),
        ),
        "availability",
        json!("single"),
    );
    client.environments = vec![environment];

    client
        .platforms
        .insert("prod".to_string(), vec![record(20, "web", "manifest.Platform")]);

    let scope = ("prod".to_string(), "web".to_string());
    client.components.insert(
        scope.clone(),
        vec![
            record(30, "compute", "manifest.oneops.1.Compute"),
            record(31, "hostname", "manifest.oneops.1.Hostname"),
            record(32, "os", "manifest.oneops.1.Os"),
            record(33, "fqdn", "manifest.oneops.1.Fqdn"),
        ],
    );

    client.instances.insert(
        ("prod".to_string(), "web".to_string(), "compute".to_string()),
        vec![
            compute_instance(41, "compute-100-1", "prod", "web"),
            compute_instance(42, "compute-100-2", "prod", "web"),
        ],
    );
    client.instances.insert(
        ("prod".to_string(), "web".to_string(), "hostname".to_string()),
        vec![hostname_instance(
            51,
            "hostname-100-1",
            r#"{"10.1.1.1": {}, "web1.internal": {}}"#,
        )],
    );
    client.instances.insert(
        ("prod".to_string(), "web".to_string(), "os".to_string()),
        vec![with_attr(
            with_attr(
                record(52, "os-100-1", "bom.oneops.1.Os"),
                "ostype",
                json!("centos-7.2"),
            ),
            "osname",
            json!("CentOS 7.2"),
        )],
    );
    client.instances.insert(
        ("prod".to_string(), "web".to_string(), "fqdn".to_string()),
        vec![with_attr(
            with_attr(
                record(53, "fqdn-100-1", "bom.oneops.1.Fqdn"),
                "aliases",
                json!(r#"["web"]"#),
            ),
            "full_aliases",
            json!(r#"["web.prod.example.com"]"#),
        )],
    );

    client.global_vars.insert(
        "prod".to_string(),
        vec![
            variable(61, "app_env", false, "production", ""),
            variable(62, "db_password", true, "plaintext", "XYZ"),
        ],
    );
    client
        .platform_vars
        .insert(scope, vec![variable(63, "version", false, "1.0", "")]);

    client
}
