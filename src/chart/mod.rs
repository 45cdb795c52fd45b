pub mod builder;
pub mod render;

pub use builder::build_chart;
pub use render::render_html;
