//! Domain models for the report service.

pub mod report;

pub use report::{EnhanceReportRequest, GenerateReportRequest, Metrics, Report, ReportSection};
