pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod order_repo;
pub mod quote_repo;

pub use app_config::Config;
pub use catalog_repo::PostgresCatalogRepository;
pub use database::DbClient;
pub use order_repo::{PostgresOrderRepository, PostgresPaymentRepository};
pub use quote_repo::{PostgresQuoteRepository, PostgresRequestRepository};
