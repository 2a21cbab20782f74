mod convert;
mod info;
mod render;

pub use convert::run_convert;
pub use info::run_info;
pub use render::run_render;
