pub mod click_log;
pub mod click_rollup;
pub mod short_link;

pub use click_log::Entity as ClickLogEntity;
pub use click_rollup::Entity as ClickRollupEntity;
pub use short_link::Entity as ShortLinkEntity;
