//! Field table for load-balancing pools.

use super::Kind;
use crate::mapping::{FieldTable, lens};
use std::sync::LazyLock;
use stingray::Pool;

static TABLE: LazyLock<FieldTable<Pool>> = LazyLock::new(|| {
    FieldTable::<Pool>::new()
        .string("bandwidth_class", "", lens!(Pool: basic.bandwidth_class))
        .int("connection_max_connect_time", 4, lens!(Pool: connection.max_connect_time))
        .int(
            "connection_max_connections_per_node",
            0,
            lens!(Pool: connection.max_connections_per_node),
        )
        .int("connection_max_queue_size", 0, lens!(Pool: connection.max_queue_size))
        .int("connection_max_reply_time", 30, lens!(Pool: connection.max_reply_time))
        .int("connection_queue_timeout", 10, lens!(Pool: connection.queue_timeout))
        .bool("dns_autoscale_enabled", false, lens!(Pool: dns_autoscale.enabled))
        .set("dns_autoscale_hostnames", lens!(Pool: dns_autoscale.hostnames))
        .int("dns_autoscale_port", 80, lens!(Pool: dns_autoscale.port))
        .string("failure_pool", "", lens!(Pool: basic.failure_pool))
        .string(
            "load_balancing_algorithm",
            "round_robin",
            lens!(Pool: load_balancing.algorithm),
        )
        .bool(
            "load_balancing_priority_enabled",
            false,
            lens!(Pool: load_balancing.priority_enabled),
        )
        .int(
            "load_balancing_priority_nodes",
            1,
            lens!(Pool: load_balancing.priority_nodes),
        )
        .int("max_connection_attempts", 0, lens!(Pool: basic.max_connection_attempts))
        .int(
            "max_idle_connections_pernode",
            50,
            lens!(Pool: basic.max_idle_connections_pernode),
        )
        .int(
            "max_timed_out_connection_attempts",
            2,
            lens!(Pool: basic.max_timed_out_connection_attempts),
        )
        .set("monitors", lens!(Pool: basic.monitors))
        .bool("node_close_with_rst", false, lens!(Pool: basic.node_close_with_rst))
        .int("node_connection_attempts", 3, lens!(Pool: basic.node_connection_attempts))
        .nodes("nodes", lens!(Pool: basic.nodes_table))
        .string("note", "", lens!(Pool: basic.note))
        .bool("passive_monitoring", true, lens!(Pool: basic.passive_monitoring))
        .string("persistence_class", "", lens!(Pool: basic.persistence_class))
        .bool("tcp_nagle", true, lens!(Pool: tcp.nagle))
        .bool("transparent", false, lens!(Pool: basic.transparent))
        .string("udp_accept_from", "dest_only", lens!(Pool: udp.accept_from))
        .string("udp_accept_from_mask", "", lens!(Pool: udp.accept_from_mask))
});

impl Kind for Pool {
    fn table() -> &'static FieldTable<Self> {
        &TABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldState;
    use crate::record::{Record, Value};
    use serde_json::json;

    #[test]
    fn test_table_covers_every_field() {
        assert_eq!(Pool::table().fields().len(), 27);
        assert_eq!(Pool::table().kind(), "pool");
    }

    #[test]
    fn test_minimal_pool_writes_all_defaults() {
        let desired = Record::named("web").with("nodes", Value::set(["10.0.0.1:80"]));
        let remote = Pool::table().to_remote(&desired).unwrap();
        let body = serde_json::to_value(&remote).unwrap();

        assert_eq!(body["properties"]["basic"]["monitors"], json!([]));
        assert_eq!(
            body["properties"]["basic"]["nodes_table"],
            json!([{"node": "10.0.0.1:80"}])
        );
        assert_eq!(body["properties"]["dns_autoscale"]["port"], json!(80));
        assert_eq!(body["properties"]["connection"]["max_reply_time"], json!(30));
        assert_eq!(body["properties"]["load_balancing"]["algorithm"], json!("round_robin"));
        assert_eq!(body["properties"]["udp"]["accept_from"], json!("dest_only"));
        assert_eq!(body["properties"]["basic"]["passive_monitoring"], json!(true));
        assert_eq!(body["properties"]["tcp"]["nagle"], json!(true));
        assert_eq!(body["properties"]["basic"]["note"], json!(""));
        assert!(body.get("name").is_none());
    }

    #[test]
    fn test_explicit_empty_monitors_is_written() {
        let desired = Record::named("web").with("monitors", Value::empty_set());
        let remote = Pool::table().to_remote(&desired).unwrap();
        assert_eq!(remote.properties.basic.monitors, Some(vec![]));
    }

    #[test]
    fn test_observed_pool_classification() {
        let desired = Record::named("web").with("note", "edge");
        let mut remote = Pool::table().to_remote(&desired).unwrap();
        if let Some(nodes) = remote.properties.basic.nodes_table.as_mut() {
            nodes.clear();
        }
        let observed = Pool::table().to_observed(&remote).unwrap();

        assert_eq!(observed.len(), 28);
        assert_eq!(
            Pool::table().classify(&observed, "note").unwrap(),
            FieldState::Custom
        );
        assert_eq!(
            Pool::table().classify(&observed, "connection_queue_timeout").unwrap(),
            FieldState::Default
        );
    }
}
