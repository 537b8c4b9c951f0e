pub mod henrik;
pub mod webhook;

pub use henrik::HenrikClient;
pub use webhook::{DeliveryOutcome, ReportSink, WebhookSink};

#[cfg(test)]
pub use webhook::MockReportSink;
