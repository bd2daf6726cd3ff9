//! Configuration object types for the vTM REST API.
//!
//! Each object is a JSON document of the form
//! `{"properties": {"<group>": {"<attribute>": value}}}`. The object name is
//! not part of the document; it is the last segment of the resource URL.
//!
//! Every attribute is an `Option` so a document can say "not specified"
//! (the key is omitted on the wire) separately from "specified as the zero
//! value". Groups are plain structs and deserialize as empty when missing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configuration object stored under a named URL in one vTM collection.
pub trait ConfigResource:
    Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync
{
    /// URL collection segment, e.g. `pools`.
    const COLLECTION: &'static str;

    /// Short kind label used in messages and targets, e.g. `pool`.
    const KIND: &'static str;

    /// Object name (identity, immutable once created).
    fn name(&self) -> &str;

    /// Replace the object name.
    fn set_name(&mut self, name: String);

    /// An empty document addressed by `name`.
    fn named(name: impl Into<String>) -> Self {
        let mut resource = Self::default();
        resource.set_name(name.into());
        resource
    }
}

// =============================================================================
// Pool
// =============================================================================

/// A pool of back-end nodes with its load balancing policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    /// Object name, carried in the URL.
    #[serde(skip)]
    pub name: String,
    /// Attribute groups.
    #[serde(default)]
    pub properties: PoolProperties,
}

impl ConfigResource for Pool {
    const COLLECTION: &'static str = "pools";
    const KIND: &'static str = "pool";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Attribute groups of a [`Pool`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolProperties {
    pub basic: PoolBasic,
    pub connection: PoolConnection,
    pub dns_autoscale: PoolDnsAutoscale,
    pub load_balancing: PoolLoadBalancing,
    pub tcp: PoolTcp,
    pub udp: PoolUdp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolBasic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connection_attempts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_idle_connections_pernode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timed_out_connection_attempts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_close_with_rst: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_connection_attempts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_table: Option<Vec<NodeRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passive_monitoring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConnection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connect_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections_per_node: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_queue_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reply_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolDnsAutoscale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostnames: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolLoadBalancing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_nodes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolTcp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nagle: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolUdp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_from_mask: Option<String>,
}

/// One entry of a pool's `nodes_table`.
///
/// Only `node` is ever written. The traffic manager fills in `state` and
/// `weight`; an entry without `state` is a node that was removed through the
/// admin UI and only lingers in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl NodeRecord {
    /// A table entry that only names the node address.
    pub fn address(node: impl Into<String>) -> Self {
        Self {
            node: Some(node.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// Traffic IP group
// =============================================================================

/// A group of traffic IP addresses with its failover placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficIpGroup {
    /// Object name, carried in the URL.
    #[serde(skip)]
    pub name: String,
    /// Attribute groups.
    #[serde(default)]
    pub properties: TrafficIpGroupProperties,
}

impl ConfigResource for TrafficIpGroup {
    const COLLECTION: &'static str = "traffic_ip_groups";
    const KIND: &'static str = "traffic_ip_group";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficIpGroupProperties {
    pub basic: TrafficIpGroupBasic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficIpGroupBasic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_source_port: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipaddresses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keeptogether: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machines: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multicast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhi_ospfv2_metric_base: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhi_ospfv2_passive_metric_offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slaves: Option<Vec<String>>,
}
