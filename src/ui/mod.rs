pub mod authoring;

pub use authoring::render_content_dashboard;
