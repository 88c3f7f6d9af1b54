// FactoryLink Directory - Core Library
// Exposes the manufacturer pipeline and client stores for the CLI, the
// terminal browser and tests.

pub mod manufacturer;
pub mod seed;
pub mod filter;         // Filter-predicate evaluator
pub mod sort;           // Comparator / sort stage
pub mod pagination;     // Pager
pub mod selection;      // Selection set
pub mod export;         // CSV serializer
pub mod directory;      // Directory store (reducer over the pipeline)
pub mod validation;
pub mod auth;           // Authentication store
pub mod inbox;          // Quotes, messages, notification counters
pub mod config;
pub mod display;
pub mod logging;

// Re-export commonly used types
pub use manufacturer::{
    Coordinates, Location, ManufacturerRecord, ManufacturerCatalog, RawManufacturer, RawLocation, ListField, IngestError,
    load_catalog, load_manufacturers_csv, load_manufacturers_json, parse_manufacturers_json,
};
pub use seed::{seed_manufacturers, seed_deleted_accounts, seed_inbox};
pub use filter::{
    FilterConfiguration, EmployeeBucket, RevenueBucket, CapacityBucket, RatingFloor, AgeBucket,
    apply_filters,
};
pub use sort::{SortConfiguration, SortDirection, SortField, UnknownSortField, sort_records};
pub use pagination::{PageSlice, PaginationState, paginate, total_pages};
pub use selection::{SelectionCoverage, SelectionSet};
pub use export::{
    ExportError, ExportOptions, CSV_HEADER,
    to_csv_string, write_csv, export_to_file, default_export_filename,
};
pub use directory::{DirectoryAction, DirectoryState, DirectoryView};
pub use validation::FieldError;
pub use auth::{
    AuthStore, AuthAction, AuthOutcome, AuthError, AuthPolicy, AuthEventKind, AuthLogEntry,
    UserAccount, DeletedAccount, RegistrationAttempt, RegistrationRequest,
};
pub use inbox::{Inbox, InboxError, Message, NewQuote, NotificationCounters, QuoteRequest, QuoteStatus};
pub use config::AppConfig;
pub use display::truncate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
