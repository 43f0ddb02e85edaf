//! Application core: clock logic with zero direct I/O.
//!
//! Digit decomposition, greeting selection and the poll loop live here.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod greeting;
pub mod ports;
pub mod service;
