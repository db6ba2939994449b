pub mod export;
pub mod ledger;
pub mod metrics;

pub use export::{export_filename, filter_items, report_to_csv, ItemFilter};
pub use ledger::{AddItemInput, AddStockInput, EditItemInput, LedgerService, UseStockInput};
pub use metrics::MetricsService;
