pub mod events;
pub mod message_service;
pub mod union_service;
