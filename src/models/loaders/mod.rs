pub mod profile_loader;
pub mod upload_loader;

pub use profile_loader::{builtin_profiles, load_profiles_file, parse_profiles};
pub use upload_loader::load_uploads;
