use std::path::PathBuf;

pub fn app_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("MEDIA_RELAY_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::data_dir().map(|d| d.join("media-relay"))
}

pub fn managed_bin_dir() -> Option<PathBuf> {
    app_data_dir().map(|d| d.join("bin"))
}
