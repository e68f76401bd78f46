pub mod feedback;
pub mod predictor;
pub mod providers;
pub mod recommendations;
pub mod statistics;
pub mod suggestions;

pub use feedback::FeedbackSubmission;
pub use predictor::GenrePredictor;
pub use providers::{ChatMessage, OpenAiGenerator, TextGenerator};
