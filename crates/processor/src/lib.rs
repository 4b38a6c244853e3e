#![doc = include_str!("../README.md")]

pub mod encode;
pub mod finding;
pub mod flatten;
pub mod key;
pub mod local;
pub mod memory;
pub mod persist;
pub mod pipeline;
pub mod publish;

pub use finding::FindingBuilder;
pub use flatten::{flatten, flatten_value};
pub use local::{JsonLinesSink, LocalObjectStore};
pub use memory::{MemoryFindingSink, MemoryObjectStore};
pub use persist::{RowPersister, StoredObject};
pub use pipeline::{ProcessOutcome, ScanPipeline, ScanPipelineBuilder, success_response};
pub use publish::FindingPublisher;
