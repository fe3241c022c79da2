//! Region lifecycle, instance registry, and host loop for Voidrealm.
//!
//! This crate owns the timed, reversible region: snapshot on cast, phased
//! barrier and platform construction, activation, phased teardown, and exact
//! restoration of every voxel and entity it touched.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `voidrealm-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- Cast and break denials.
//! - [`instance`] -- The [`RegionInstance`] state machine.
//! - [`notify`] -- [`Notifier`] trait and recording/null implementations.
//! - [`progress`] -- Elapsed time to cursor mapping shared by all phases.
//! - [`registry`] -- [`InstanceRegistry`]: one live region per actor.
//! - [`requests`] -- [`RequestSource`] trait and [`ScriptedRequests`].
//! - [`runner`] -- The async host loop.
//! - [`trap`] -- Entity trapping and restoration.
//!
//! [`RegionInstance`]: instance::RegionInstance
//! [`Notifier`]: notify::Notifier
//! [`InstanceRegistry`]: registry::InstanceRegistry
//! [`RequestSource`]: requests::RequestSource
//! [`ScriptedRequests`]: requests::ScriptedRequests

pub mod config;
pub mod error;
pub mod instance;
pub mod notify;
pub mod progress;
pub mod registry;
pub mod requests;
pub mod runner;
pub mod trap;
