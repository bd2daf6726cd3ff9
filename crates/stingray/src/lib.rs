//! # stingray
//!
//! Blocking client for the Brocade Virtual Traffic Manager (formerly
//! Stingray) configuration REST API.
//!
//! This crate provides:
//! - Typed documents for pools and traffic IP groups, with every attribute
//!   optional so "not specified" and "zero value" stay distinct
//! - The [`Client`] trait: get, upsert and delete by object name
//! - [`HttpClient`], a `ureq` implementation with Basic auth and optional
//!   certificate checks
//! - [`MockClient`], an in-memory store-and-echo server for tests
//!
//! ## Example
//!
//! ```no_run
//! use stingray::{Client, ClientConfig, ConfigResource, HttpClient, NodeRecord, Pool};
//!
//! let client = HttpClient::new(&ClientConfig::new(
//!     "https://vtm.example.com:9070",
//!     "admin",
//!     "secret",
//! ))?;
//!
//! let mut pool = Pool::named("web");
//! pool.properties.basic.nodes_table = Some(vec![NodeRecord::address("10.0.0.1:80")]);
//! client.set(&pool)?;
//!
//! match client.get::<Pool>("web") {
//!     Ok(pool) => println!("{:?}", pool.properties.basic.nodes_table),
//!     Err(e) if e.is_not_found() => println!("gone"),
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), stingray::Error>(())
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::http::{ClientConfig, DEFAULT_API_VERSION, HttpClient};
pub use client::{Client, MockClient, Operation, RecordedWrite};
pub use error::{Error, ErrorCategory, Result};
pub use types::{
    ConfigResource, NodeRecord, Pool, PoolBasic, PoolConnection, PoolDnsAutoscale,
    PoolLoadBalancing, PoolProperties, PoolTcp, PoolUdp, TrafficIpGroup, TrafficIpGroupBasic,
    TrafficIpGroupProperties,
};
