pub mod eredes;
pub mod reading_file;
pub mod readings;

pub use eredes::EredesConsumptionFetcher;
pub use reading_file::ReadingFileSource;
pub use readings::ReadingBatch;
