pub mod client;
pub mod media;
pub mod newsroom;
pub mod styles;
