pub mod environment;
pub mod paths;
pub mod timestamps;

pub use environment::{get_data_dir, get_undo_window, get_unlock_gate};
pub use paths::{format_path_with_tilde, validate_file_size};
pub use timestamps::{format_countdown, format_date};
