mod pipeline;

pub use pipeline::{CategoryCount, IngestReport, IngestionPipeline};
