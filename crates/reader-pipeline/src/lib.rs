//! C6 (search pipeline) and C7 (crawl pipeline): the two top-level
//! orchestrators that compose C1-C5 into the gateway's two HTTP routes.

pub mod batch;
pub mod crawl;
pub mod search_pipeline;

pub use batch::{reorganize, Batch};
pub use crawl::{validate_target_url, CrawlPipeline};
pub use search_pipeline::{SearchPipeline, SearchPipelineInput};
