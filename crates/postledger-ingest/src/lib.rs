pub mod aggregate;
pub mod decode;
pub mod errors;
pub mod mapping;
pub mod model;
pub mod pipeline;
pub mod transform;

pub use aggregate::PostAggregator;
pub use decode::{cast_field, RowDecoder};
pub use errors::ParseError;
pub use model::{
    DateRange, Engagement, FieldValue, MappedRow, PostAggregate, ProcessResult, RawRow,
    ReportMetadata, Snapshot, TransformedRow,
};
pub use pipeline::process_report;

#[cfg(test)]
mod tests;
