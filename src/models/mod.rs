pub mod document_type;
pub mod exam;
pub mod file;
pub mod loaders;

pub use document_type::DocumentType;
pub use exam::{DocumentFormat, ExamCode, ExamFormats, ExamProfile, ExamProfiles, OutputFormat};
pub use file::{ClassificationResult, FileStatus, ProcessedFile, UploadedFile};
pub use loaders::{builtin_profiles, load_profiles_file, load_uploads, parse_profiles};
