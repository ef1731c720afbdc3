pub mod influxdb;
pub mod json_file;

pub use influxdb::InfluxDbSink;
pub use json_file::JsonFileSink;
