pub mod settings;
pub mod settings_io;

pub use settings::AppSettings;
pub use settings_io::{data_dir, load_settings, save_settings};
