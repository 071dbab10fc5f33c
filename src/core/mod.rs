pub mod analyzer;
pub mod filename;
pub mod http_client;
pub mod normalizer;
pub mod paths;
pub mod process;
pub mod proxy;
pub mod scrape;
pub mod url_parser;
pub mod video_info;
pub mod ytdlp;
