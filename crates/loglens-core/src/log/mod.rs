mod locator;
mod reader;
mod record;

pub use locator::{LogFileReference, LogLocator};
pub use reader::{LogReader, is_gzip};
pub use record::{ParsedRecord, parse_line};
