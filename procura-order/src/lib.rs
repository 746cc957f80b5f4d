pub mod finance;
pub mod ledger;
pub mod manager;
pub mod materializer;
pub mod memory;
pub mod models;
pub mod repository;

pub use finance::{FinanceError, FinancialReporter, FinancialSummary};
pub use ledger::{LedgerError, PaymentLedger};
pub use manager::{OrderStatusManager, StatusError};
pub use materializer::{AcceptanceError, OrderMaterializer};
pub use memory::MemoryStore;
pub use models::{
    CustomerPayment, MaterializedOrder, Order, OrderItem, OrderStatus, QuoteAcceptance,
    UnknownOrderStatus,
};
pub use repository::{AcceptanceCommit, OrderRepository, PaymentRepository};
