pub mod library_check;
pub mod render_check;
