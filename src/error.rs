use thiserror::Error;

/// Input problems the caller can fix. The HTTP layer maps these to 400.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please provide either text input OR image input, not both or neither.")]
    AmbiguousAnalysisInput,
    #[error("Unsupported image type '{0}'. Only JPEG and PNG uploads are accepted.")]
    UnsupportedImageType(String),
    #[error("Uploaded image is empty")]
    EmptyImage,
    #[error("Uploaded image content does not match its declared type '{0}'")]
    ImageContentMismatch(String),
    #[error("Image data is not valid base64")]
    InvalidImageEncoding,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("Invalid answer '{answer}' for question {question}")]
    InvalidAnswer { question: usize, answer: String },
    #[error("Question {0} does not exist in this quiz")]
    UnknownQuestion(usize),
    #[error("Please answer all questions before submitting.")]
    IncompleteQuiz,
    #[error("This quiz has already been submitted")]
    QuizAlreadySubmitted,
}
