pub mod submission;
pub mod token;

pub use submission::SubmissionRecord;
pub use token::AccessToken;
