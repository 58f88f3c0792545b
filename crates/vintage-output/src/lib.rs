#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vintage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod format;
pub mod report;
pub mod table;

pub use export::{ExportError, ExportFormat, Exporter};
pub use format::{format_amount, format_ratio};
pub use report::{Report, ReportBuilder, ReportError, ReportStatus};
pub use table::{outcome_message, render_ascii, render_exposure, render_markdown};
