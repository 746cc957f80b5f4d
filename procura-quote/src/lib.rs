pub mod aggregator;
pub mod builder;
pub mod models;
pub mod repository;
pub mod request;

pub use aggregator::{group_by_supplier, resolve_items, ResolutionError, SupplierGroup};
pub use builder::{QuoteBuilder, QuoteDraft, QuoteError, QuoteLine};
pub use models::{Quote, QuoteItem, QuoteStatus, ResolvedQuoteItem};
pub use repository::{QuoteRepository, RequestRepository};
pub use request::{Request, RequestIntake, RequestItem, RequestLine, RequestStatus};
