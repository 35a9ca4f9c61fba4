pub mod config_management;
pub mod link_management;

pub use config_management::config_generate;
pub use link_management::{add_link, list_links, show_stats};
