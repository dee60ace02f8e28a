// CKAN record -> ESS-DIVE payload, then review and file staging

pub mod mapper;
pub mod quality_gate;
pub mod stager;
pub mod summary;

pub use mapper::map_package;
pub use quality_gate::{find_missing_fields, find_missing_metadata, RequiredField};
pub use stager::{resource_filename, ResourceStager, StagedFile};
pub use summary::summarize_payload;
