mod add;
mod list;
mod stats;

pub use add::add_link;
pub use list::list_links;
pub use stats::show_stats;
