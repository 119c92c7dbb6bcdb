pub mod availability;
pub mod error;
pub mod handlers;
pub mod models;
pub mod numbering;
pub mod pricing;
pub mod repository;
pub mod service;

pub use availability::*;
pub use error::*;
pub use handlers::*;
pub use models::*;
pub use numbering::*;
pub use pricing::*;
pub use repository::*;
pub use service::*;
