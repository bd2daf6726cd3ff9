//! Field table for traffic IP groups.

use super::Kind;
use crate::mapping::{FieldTable, lens};
use std::sync::LazyLock;
use stingray::TrafficIpGroup;

static TABLE: LazyLock<FieldTable<TrafficIpGroup>> = LazyLock::new(|| {
    FieldTable::<TrafficIpGroup>::new()
        .bool("enabled", true, lens!(TrafficIpGroup: basic.enabled))
        .bool("hash_source_port", false, lens!(TrafficIpGroup: basic.hash_source_port))
        .set("ipaddresses", lens!(TrafficIpGroup: basic.ipaddresses))
        .bool("keeptogether", false, lens!(TrafficIpGroup: basic.keeptogether))
        .int("location", 0, lens!(TrafficIpGroup: basic.location))
        .set("machines", lens!(TrafficIpGroup: basic.machines))
        .string("mode", "singlehosted", lens!(TrafficIpGroup: basic.mode))
        .string("multicast", "", lens!(TrafficIpGroup: basic.multicast))
        .string("note", "", lens!(TrafficIpGroup: basic.note))
        .int(
            "rhi_ospfv2_metric_base",
            10,
            lens!(TrafficIpGroup: basic.rhi_ospfv2_metric_base),
        )
        .int(
            "rhi_ospfv2_passive_metric_offset",
            10,
            lens!(TrafficIpGroup: basic.rhi_ospfv2_passive_metric_offset),
        )
        .set("slaves", lens!(TrafficIpGroup: basic.slaves))
});

impl Kind for TrafficIpGroup {
    fn table() -> &'static FieldTable<Self> {
        &TABLE
    }
}
