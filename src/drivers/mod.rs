//! Peripheral drivers. All bus drivers are generic over `embedded-hal` 1.0
//! traits and own their bus handle.

pub mod button;
pub mod ds1307;
pub mod lcd;
pub mod pca9685;
pub mod servo;
