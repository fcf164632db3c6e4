//! Concrete adapter implementations for ports.

#[cfg(feature = "postgres")]
pub mod postgres_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod record_codec;
pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
