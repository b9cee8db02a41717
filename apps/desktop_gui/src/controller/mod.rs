//! Controller layer: UI events and command orchestration around the shared view state.

pub mod events;
pub mod orchestration;
