pub mod consumer;
pub mod device_tokens;
pub mod fan_out;

pub use device_tokens::DeviceTokenService;
pub use fan_out::FanOutEngine;
