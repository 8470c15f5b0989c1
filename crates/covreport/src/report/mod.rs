//! Report emitters
//!
//! Every emitter is a [`ReportVisitor`]. The pipeline drives them together
//! through a [`MultiReportVisitor`] so each sees the same info, bundle and
//! end calls in the same order.

pub mod csv;
pub mod encoding;
pub mod html;
pub mod locale;
pub mod locator;
pub mod visitor;
pub mod xml;

pub use csv::{CsvFormatter, CsvReportVisitor, CSV_FILE};
pub use encoding::{resolve_encoding, EncodedWriter, Unmappable};
pub use html::{HtmlFormatter, HtmlReportVisitor};
pub use locale::NumberLocale;
pub use locator::{
    expand_tabs, DirectorySourceFileLocator, MultiSourceFileLocator, NoSourceLocator,
    SourceFileLocator,
};
pub use visitor::{MultiReportVisitor, ReportVisitor};
pub use xml::{XmlFormatter, XmlReportVisitor, XML_FILE};
