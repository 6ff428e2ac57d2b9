//! Topology subsystem — the evolving municipal network graph.
//!
//! This subsystem:
//!   1. Builds a fixed-size node set once, at engine construction:
//!      device kind, zone, property bundle, location, and starting
//!      metrics are all drawn from the tick-0 stream.
//!   2. Per tick, nudges every node's metrics by small bounded deltas
//!      and, with small probability, reassigns its status. The flip is
//!      memoryless by design: no transition graph, any status can
//!      follow any other.
//!   3. Per tick, discards and rebuilds the entire edge list: each node
//!      gets an out-degree of 1..=3 toward distinct random targets
//!      (self-loops redrawn), with randomized link attributes.
//!
//! The node set never grows or shrinks after construction.
//!
//! Execution: every tick.
//! Depends on: none.

use crate::clock::SimClock;
use crate::config::EngineConfig;
use crate::rng::StreamRng;
use crate::types::{clamp_finite, EntityId, GeoPoint};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-tick chance that a node's status is reassigned.
pub const STATUS_FLIP_PROBABILITY: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Router,
    Switch,
    Gateway,
    AccessPoint,
    Sensor,
    Camera,
    Server,
    Controller,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Router,
        NodeKind::Switch,
        NodeKind::Gateway,
        NodeKind::AccessPoint,
        NodeKind::Sensor,
        NodeKind::Camera,
        NodeKind::Server,
        NodeKind::Controller,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Router => "Router",
            Self::Switch => "Switch",
            Self::Gateway => "Gateway",
            Self::AccessPoint => "Access Point",
            Self::Sensor => "Sensor",
            Self::Camera => "Camera",
            Self::Server => "Server",
            Self::Controller => "Controller",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Downtown,
    Industrial,
    Residential,
    Waterfront,
    Uptown,
}

impl Zone {
    pub const ALL: [Zone; 5] = [
        Zone::Downtown,
        Zone::Industrial,
        Zone::Residential,
        Zone::Waterfront,
        Zone::Uptown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Downtown => "Downtown",
            Self::Industrial => "Industrial",
            Self::Residential => "Residential",
            Self::Waterfront => "Waterfront",
            Self::Uptown => "Uptown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Online,
    Warning,
    Critical,
}

impl NodeStatus {
    pub const ALL: [NodeStatus; 3] =
        [NodeStatus::Online, NodeStatus::Warning, NodeStatus::Critical];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Fiber,
    Copper,
    Wireless,
    Microwave,
}

impl LinkType {
    pub const ALL: [LinkType; 4] =
        [LinkType::Fiber, LinkType::Copper, LinkType::Wireless, LinkType::Microwave];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
    Up,
    Degraded,
}

/// Draw pool giving edges a 75% chance of being up.
const EDGE_STATUS_DRAW: [EdgeStatus; 4] = [
    EdgeStatus::Up,
    EdgeStatus::Up,
    EdgeStatus::Up,
    EdgeStatus::Degraded,
];

/// Device provenance bundle, fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeProperties {
    pub vendor: String,
    pub model: String,
    pub firmware: String,
    pub installed_on: DateTime<Utc>,
}

const VENDORS: &[&str] = &["Cisco", "Juniper", "Arista", "Extreme"];

/// Live device metrics, nudged incrementally every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetrics {
    /// Percent, 0..=100.
    pub cpu: f64,
    /// Percent, 0..=100.
    pub memory: f64,
    /// Mbps, floored at 0.
    pub bandwidth_mbps: f64,
    /// Celsius, 0..=100.
    pub temperature_c: f64,
    /// Ticks since boot. Strictly monotonic.
    pub uptime_ticks: u64,
    /// Errors per thousand packets, floored at 0.
    pub error_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: EntityId,
    pub label: String,
    pub kind: NodeKind,
    pub zone: Zone,
    pub status: NodeStatus,
    pub location: Option<GeoPoint>,
    pub properties: NodeProperties,
    pub metrics: NodeMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: Uuid,
    pub source: EntityId,
    pub target: EntityId,
    pub link_type: LinkType,
    pub bandwidth_mbps: f64,
    pub latency_ms: f64,
    /// Share of capacity in use, 0..=1.
    pub utilization: f64,
    pub status: EdgeStatus,
}

/// The published graph snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkTopology {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub last_updated: DateTime<Utc>,
}

// ── Subsystem ────────────────────────────────────────────────────────────────

pub struct TopologySubsystem {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    last_updated: DateTime<Utc>,
}

impl TopologySubsystem {
    /// Build the node set and an initial edge list from the tick-0 stream.
    pub fn new(config: &EngineConfig, clock: &SimClock, rng: &mut StreamRng) -> Self {
        let nodes: Vec<Node> = (0..config.node_count)
            .map(|n| Self::build_node(n, config, clock, rng))
            .collect();
        let edges = Self::build_edges(&nodes, rng);
        Self {
            nodes,
            edges,
            last_updated: clock.timestamp(),
        }
    }

    fn build_node(
        index: usize,
        config: &EngineConfig,
        clock: &SimClock,
        rng: &mut StreamRng,
    ) -> Node {
        let kind = *rng.pick(&NodeKind::ALL);
        let zone = *rng.pick(&Zone::ALL);
        let properties = NodeProperties {
            vendor: (*rng.pick(VENDORS)).into(),
            model: format!("M{}-{}", rng.range_u64(1, 9), rng.range_u64(100, 999)),
            firmware: format!(
                "v{}.{}.{}",
                rng.range_u64(1, 4),
                rng.range_u64(0, 9),
                rng.range_u64(0, 20)
            ),
            installed_on: clock.start - Duration::days(rng.range_u64(30, 1_500) as i64),
        };
        let metrics = NodeMetrics {
            cpu: rng.range_f64(5.0, 60.0),
            memory: rng.range_f64(20.0, 70.0),
            bandwidth_mbps: rng.range_f64(100.0, 1_000.0),
            temperature_c: rng.range_f64(35.0, 75.0),
            uptime_ticks: rng.next_u64_below(10_000),
            error_rate: rng.range_f64(0.0, 1.5),
        };
        Node {
            id: format!("node-{index:02}"),
            label: format!("{} {} {:02}", zone.label(), kind.label(), index),
            kind,
            zone,
            status: NodeStatus::Online,
            location: Some(config.center.jittered(config.jitter_radius_km, rng)),
            properties,
            metrics,
        }
    }

    /// Rebuild the full edge list: out-degree 1..=3 per node, targets
    /// redrawn until they differ from the source.
    fn build_edges(nodes: &[Node], rng: &mut StreamRng) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(nodes.len() * 2);
        for (i, node) in nodes.iter().enumerate() {
            let out_degree = rng.range_u64(1, 3);
            for _ in 0..out_degree {
                let target = loop {
                    let t = rng.next_u64_below(nodes.len() as u64) as usize;
                    if t != i {
                        break t;
                    }
                };
                edges.push(Edge {
                    id: rng.uuid(),
                    source: node.id.clone(),
                    target: nodes[target].id.clone(),
                    link_type: *rng.pick(&LinkType::ALL),
                    bandwidth_mbps: rng.range_f64(100.0, 10_000.0),
                    latency_ms: rng.range_f64(0.5, 20.0),
                    utilization: rng.next_f64(),
                    status: *rng.pick(&EDGE_STATUS_DRAW),
                });
            }
        }
        edges
    }

    /// Nudge node metrics, maybe flip statuses, regenerate edges.
    pub fn update(&mut self, clock: &SimClock, rng: &mut StreamRng) {
        let mut flips = 0u32;
        for node in &mut self.nodes {
            let m = &mut node.metrics;
            m.cpu = clamp_finite(m.cpu + rng.noise(5.0), 0.0, 100.0);
            m.memory = clamp_finite(m.memory + rng.noise(3.0), 0.0, 100.0);
            m.bandwidth_mbps = clamp_finite(m.bandwidth_mbps + rng.noise(100.0), 0.0, f64::MAX);
            m.temperature_c = clamp_finite(m.temperature_c + rng.noise(2.0), 0.0, 100.0);
            m.uptime_ticks += 1;
            m.error_rate = clamp_finite(m.error_rate + rng.noise(0.5), 0.0, f64::MAX);

            if rng.chance(STATUS_FLIP_PROBABILITY) {
                node.status = *rng.pick(&NodeStatus::ALL);
                flips += 1;
            }
        }

        self.edges = Self::build_edges(&self.nodes, rng);
        self.last_updated = clock.timestamp();

        log::debug!(
            "tick={} topology: {} nodes, {} edges, {flips} status flips",
            clock.current_tick,
            self.nodes.len(),
            self.edges.len()
        );
    }

    /// Cloned snapshot of the current graph.
    pub fn topology(&self) -> NetworkTopology {
        NetworkTopology {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            last_updated: self.last_updated,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
