pub mod client;
pub mod input;
pub mod payload;
pub mod render;
pub mod session;
pub mod turn;

pub use client::*;
pub use input::*;
pub use payload::*;
pub use render::*;
pub use session::*;
pub use turn::*;
