pub mod api_server;
pub mod pipeline;

pub use api_server::{create_router, ApiServer, ApiState};
pub use pipeline::{DeliveryStatus, PipelineRun, ReportPipeline};
