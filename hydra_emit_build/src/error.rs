use thiserror::Error;

#[derive(Debug, Error)]
pub enum HydraBuildError {
    #[error("manifest error in {scope}: {message}")]
    Parse { scope: String, message: String },

    #[error("code generation error for {item}: {message}")]
    CodeGen { item: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
