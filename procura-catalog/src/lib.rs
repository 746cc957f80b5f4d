pub mod product;
pub mod repository;
pub mod supplier;

pub use product::Product;
pub use repository::CatalogRepository;
pub use supplier::{ProductSupplier, Supplier};
