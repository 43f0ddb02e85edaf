//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements      | Connects to                   |
//! |------------|-----------------|-------------------------------|
//! | `hardware` | ClockPort       | DS1307 over I²C               |
//! |            | ActuatorPort    | PCA9685 servo bank over I²C   |
//! |            | TextDisplayPort | HD44780 via PCF8574 over I²C  |
//! | `log_sink` | EventSink       | Serial log output             |

pub mod hardware;
pub mod log_sink;
