//! Command handlers - kept out of main.rs for testability

pub mod execinfo;
pub mod merge;
pub mod report;

pub use execinfo::{execute_execinfo, render_execinfo};
pub use merge::{execute_merge, merge_files};
pub use report::{build_render_config, build_request, execute_report, render_summary};
