pub mod loader;

pub use loader::{
    ContributionRecord, DeadlineRecord, ExpenseRecord, InvoiceRecord, LedgerCsvLoader,
    LedgerLoaderError, RecordKind,
};
