pub mod metrics_writer;
pub mod table_writer;

pub use metrics_writer::{MetricsFormat, MetricsWriter};
pub use table_writer::TableWriter;
