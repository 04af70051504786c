//! Data module - sunspot table loading and processing

mod loader;
mod processor;

pub use loader::{
    date_to_fractional_year, DataLoader, LoaderError, SunspotData, SunspotTable, TableKind,
};
pub use processor::{first_difference, scaled_name, DataProcessor, ProcessorError};
