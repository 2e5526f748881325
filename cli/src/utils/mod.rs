pub mod parsers;
pub mod render;
pub mod send_utils;

pub use parsers::*;
pub use render::*;
pub use send_utils::*;
