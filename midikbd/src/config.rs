mod keyspec;
mod loader;
mod parser;
mod settings;

pub use keyspec::resolve;
pub use loader::{load, load_config, load_profiles, CONFIG_FILE_NAME};
pub use parser::{classify, Line};
pub use settings::{Config, SWITCH_NOTE_DISABLED};
