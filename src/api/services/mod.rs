pub mod health;
pub mod links;
pub mod redirect;

pub use health::{HealthResponse, HealthService};
pub use links::LinkApiService;
pub use redirect::RedirectService;
