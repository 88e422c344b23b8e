//! Sequencing root.
//!
//! `TurretStateMachine` drives the INIT → ACQUIRE → AIM → FIRE → RESET →
//! PAUSE → ACQUIRE cycle one control tick at a time. Motion, firing and
//! waits are resumable step objects owned by the machine.

pub mod delay;
pub mod fire;
pub mod machine;
pub mod motion;
