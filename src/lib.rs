//! Highway Simulation Library
//!
//! Agent-based highway traffic simulation contrasting uncoordinated and
//! coordinated drivers. The engine in [`simulation`] is stepped by a host
//! that owns the frame loop.

pub mod simulation;
