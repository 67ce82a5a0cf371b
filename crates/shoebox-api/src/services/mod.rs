pub mod naming;
pub mod upload;

pub use naming::{is_generated_name, NameGenerator};
pub use upload::{AcceptedUpload, UploadPipeline, UploadPolicy};
