//! Data model shared by the extraction stages.
//!
//! Nothing here is mutated after construction: a [`SourceDocument`] goes in,
//! transient [`PageTextRun`]s, [`ReconstructedLine`]s and [`RasterImage`]s
//! are produced per page, and an [`ExtractedText`] comes out.

mod extracted;
mod line;
mod raster;
mod source;

pub use extracted::{ExtractedText, ExtractionReport, PageOutcome, SkipReason};
pub use line::{Direction, PageTextRun, ReconstructedLine};
pub use raster::RasterImage;
pub use source::SourceDocument;
