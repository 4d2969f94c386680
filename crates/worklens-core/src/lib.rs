//! # Worklens Core Library
//!
//! This library provides the core business logic for Worklens, a work
//! intelligence tool that watches someone's open threads of work and tells
//! them what to do next. All operations are available via a standalone CLI
//! binary built on top of this crate.
//!
//! ## Architecture
//!
//! - **Threads**: Work threads aggregate related items (emails, tasks,
//!   events, messages) with priority, progress and deadline state
//! - **Engines**: Deterministic priority scoring, cognitive load
//!   measurement and insight detection over a snapshot of threads
//! - **Generator**: An ordered chain of text-generation providers with a
//!   static fallback reply, used to phrase reasoning for humans
//! - **Storage**: SQLite-based persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`WorkThread`]: The unit everything else judges
//! - [`Advisor`]: Orchestrates the engines over a store and a generator
//! - [`WorklensDb`]: Thread, activity and snapshot persistence
//! - [`Config`]: Application configuration management

pub mod activity;
pub mod advisor;
pub mod error;
pub mod generator;
pub mod insight;
pub mod load;
pub mod priority;
pub mod storage;
pub mod store;
pub mod thread;

pub use activity::{Activity, ActivityKind};
pub use advisor::Advisor;
pub use error::{ConfigError, CoreError, GeneratorError, StoreError, ValidationError};
pub use generator::{GeneratorChain, Provider, TextGenerator, FALLBACK_REPLY};
pub use insight::{Insight, InsightKind, Severity};
pub use load::{CognitiveLoad, LoadFactors, LoadLevel};
pub use priority::{PriorityRecommendation, Reasoning, ReasoningFactor};
pub use storage::{Config, WorklensDb};
pub use store::{ActivityStore, InsightStore, SnapshotStore, ThreadStore};
pub use thread::{PriorityTier, ThreadStatus, WorkItem, WorkItemKind, WorkThread};
