pub mod archiver;
pub mod classifier;
pub mod formatter;
pub mod namer;
pub mod report_writer;
pub mod requirements;
pub mod upload_validator;

pub use archiver::{archive_date, archive_file_name, ArchiveEntry, Archiver, ZipArchiver};
pub use classifier::{Classifier, Pattern, Rule};
pub use formatter::{FormatRequest, Formatter, ImageFormatter};
pub use namer::DuplicateCounter;
pub use report_writer::ReportWriter;
pub use requirements::RequirementCheck;
pub use upload_validator::{validate_uploads, ValidationReport};
