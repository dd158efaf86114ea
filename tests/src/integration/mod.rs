//! Client ↔ service integration flows.

pub mod flows;
pub mod harness;
pub mod udp_loopback;
