pub mod driver;
pub mod web;

pub use driver::PageDriver;
pub use web::WebPageDriver;
