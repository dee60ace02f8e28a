pub mod ckan;
pub mod essdive;

pub use ckan::CkanGateway;
pub use essdive::{EssDiveGateway, SubmissionOutcome};
