//! cf-cell: battery cell description.
//!
//! Owns everything the residual assembler reads but never computes:
//! radial particle meshes, electrode/electrolyte/cell parameter structs,
//! the flat state-vector layout (built once, immutable afterwards), and
//! the experiment descriptor with its per-evaluation events snapshot.
//!
//! All types here are plain value types: copying a simulation for a
//! solution snapshot is a `Clone`, with no shared mutable state left
//! behind.

pub mod domain;
pub mod error;
pub mod experiment;
pub mod layout;
pub mod mesh;
pub mod presets;

pub use domain::{CellParams, Electrode, Electrolyte, HysteresisParams};
pub use error::{CellError, CellResult};
pub use experiment::{Events, Experiment, Mode, Profile, StopCondition, TimeGrid};
pub use layout::{ElectrodeLayout, LayoutBuilder, StateLayout};
pub use mesh::RadialMesh;
pub use presets::{CellAssembly, default_cell};
