//! Pass-through helpers for the common API objects
//!
//! Each helper only shapes parameters and forwards to `invoke` (strict mode)
//! or to the resolvers; none of them holds state.
//!
//! ```rust,no_run
//! use zbx_client::{Entity, HostInterface, HostSpec, ZabbixClient};
//! use serde_json::json;
//!
//! # async fn example(client: ZabbixClient) -> zbx_core::Result<()> {
//! let hosts = client.entity(Entity::Host).get(json!({"output": ["hostid", "host"]})).await?;
//!
//! let ids = client
//!     .create_host(
//!         HostSpec::new("web-01")
//!             .group("Linux servers")
//!             .template("Linux by Zabbix agent")
//!             .interface(HostInterface::agent("10.0.0.11")),
//!     )
//!     .await?;
//!
//! client.entity(Entity::Host).delete(&ids).await?;
//! # Ok(())
//! # }
//! ```

use crate::client::{InvokeOptions, ZabbixClient};
use crate::resolver::ResolveKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zbx_core::{Error, Result};

/// API object families with get/create/update/delete methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Host,
    HostGroup,
    Template,
    User,
    Action,
    Maintenance,
    DiscoveryRule,
}

impl Entity {
    /// Method prefix, e.g. "drule" for `drule.get`
    pub fn prefix(&self) -> &'static str {
        match self {
            Entity::Host => "host",
            Entity::HostGroup => "hostgroup",
            Entity::Template => "template",
            Entity::User => "user",
            Entity::Action => "action",
            Entity::Maintenance => "maintenance",
            Entity::DiscoveryRule => "drule",
        }
    }

    /// Name of the id field, e.g. "druleid"
    pub fn id_field(&self) -> &'static str {
        match self {
            Entity::Host => "hostid",
            Entity::HostGroup => "groupid",
            Entity::Template => "templateid",
            Entity::User => "userid",
            Entity::Action => "actionid",
            Entity::Maintenance => "maintenanceid",
            Entity::DiscoveryRule => "druleid",
        }
    }

    /// Full method name for an operation
    pub fn method(&self, operation: &str) -> String {
        format!("{}.{}", self.prefix(), operation)
    }
}

/// Borrowed handle for one entity family
#[derive(Debug, Clone, Copy)]
pub struct EntityApi<'a> {
    client: &'a ZabbixClient,
    entity: Entity,
}

impl ZabbixClient {
    /// Handle for `entity`'s get/create/update/delete methods
    pub fn entity(&self, entity: Entity) -> EntityApi<'_> {
        EntityApi {
            client: self,
            entity,
        }
    }

    /// Create a host, resolving group and template names first
    ///
    /// Returns the ids of the created hosts.
    pub async fn create_host(&self, spec: HostSpec) -> Result<Vec<String>> {
        if spec.host.is_empty() {
            return Err(Error::Configuration("host name is empty".to_string()));
        }
        if spec.groups.is_empty() {
            return Err(Error::Configuration(
                "a host needs at least one group".to_string(),
            ));
        }

        let group_ids = self.resolve(ResolveKind::Group, &spec.groups).await?;
        let template_ids = self.resolve(ResolveKind::Template, &spec.templates).await?;

        let mut params = json!({
            "host": spec.host,
            "groups": group_ids
                .iter()
                .map(|id| json!({ "groupid": id }))
                .collect::<Vec<_>>(),
        });
        if !template_ids.is_empty() {
            params["templates"] = template_ids
                .iter()
                .map(|id| json!({ "templateid": id }))
                .collect();
        }
        if !spec.interfaces.is_empty() {
            params["interfaces"] = serde_json::to_value(&spec.interfaces)
                .map_err(|e| Error::Serialization(e.to_string()))?;
        }
        if let Some(name) = spec.name {
            params["name"] = Value::String(name);
        }
        if let Some(description) = spec.description {
            params["description"] = Value::String(description);
        }

        self.entity(Entity::Host).create(params).await
    }
}

impl<'a> EntityApi<'a> {
    /// `<prefix>.get`; returns the result list as-is
    pub async fn get(&self, params: Value) -> Result<Value> {
        self.client
            .invoke(&self.entity.method("get"), params, InvokeOptions::strict())
            .await
    }

    /// `<prefix>.create`; returns the created ids
    pub async fn create(&self, params: Value) -> Result<Vec<String>> {
        let result = self
            .client
            .invoke(&self.entity.method("create"), params, InvokeOptions::strict())
            .await?;
        self.ids_from(result)
    }

    /// `<prefix>.update`; returns the updated ids
    pub async fn update(&self, params: Value) -> Result<Vec<String>> {
        let result = self
            .client
            .invoke(&self.entity.method("update"), params, InvokeOptions::strict())
            .await?;
        self.ids_from(result)
    }

    /// `<prefix>.delete`; returns the deleted ids
    pub async fn delete<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<String>> {
        let params = Value::Array(
            ids.iter()
                .map(|id| Value::String(id.as_ref().to_string()))
                .collect(),
        );
        let result = self
            .client
            .invoke(&self.entity.method("delete"), params, InvokeOptions::strict())
            .await?;
        self.ids_from(result)
    }

    /// Pull `<id_field>s` out of a create/update/delete result
    fn ids_from(&self, result: Value) -> Result<Vec<String>> {
        let key = format!("{}s", self.entity.id_field());
        let ids = result.get(&key).and_then(Value::as_array).ok_or_else(|| {
            Error::InvalidResponse(format!("result has no {} list", key))
        })?;

        ids.iter()
            .map(|id| match id {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(Error::InvalidResponse(format!(
                    "unexpected id in {}: {}",
                    key, other
                ))),
            })
            .collect()
    }
}

/// Host interface definition for `host.create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInterface {
    /// 1 agent, 2 SNMP, 3 IPMI, 4 JMX
    #[serde(rename = "type")]
    pub interface_type: u8,
    /// 1 for the default interface of its type
    pub main: u8,
    /// 1 to connect by IP, 0 by DNS
    pub useip: u8,
    pub ip: String,
    pub dns: String,
    pub port: String,
}

impl HostInterface {
    /// Default agent interface on port 10050, connecting by IP
    pub fn agent(ip: impl Into<String>) -> Self {
        Self {
            interface_type: 1,
            main: 1,
            useip: 1,
            ip: ip.into(),
            dns: String::new(),
            port: "10050".to_string(),
        }
    }

    /// Default SNMP interface on port 161, connecting by IP
    pub fn snmp(ip: impl Into<String>) -> Self {
        Self {
            interface_type: 2,
            port: "161".to_string(),
            ..Self::agent(ip)
        }
    }

    /// Connect by DNS name instead of IP
    pub fn with_dns(mut self, dns: impl Into<String>) -> Self {
        self.dns = dns.into();
        self.useip = 0;
        self
    }

    /// Override the port
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }
}

/// Parameters for `ZabbixClient::create_host`
///
/// Groups and templates may be given as names or ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSpec {
    pub host: String,
    pub name: Option<String>,
    pub groups: Vec<String>,
    pub templates: Vec<String>,
    pub interfaces: Vec<HostInterface>,
    pub description: Option<String>,
}

impl HostSpec {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Visible name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.templates.push(template.into());
        self
    }

    pub fn interface(mut self, interface: HostInterface) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
