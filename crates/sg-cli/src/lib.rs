//! sg-cli: Command-line interface for swarmgate
//!
//! Provides the `swarmgate` CLI for querying and pruning swarm resources on
//! a daemon reachable through an SSH tunnel or locally.

pub mod commands;
pub mod output;
