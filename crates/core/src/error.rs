use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No command given. The command MUST include the placeholder `{}`.", .placeholder)]
    MissingCommand { placeholder: String },

    #[error("Placeholder `{}` is not valid, needs a non-empty, even number of characters.", .0)]
    InvalidPlaceholder(String),

    #[error("No placeholder `{}` in arguments.", .0)]
    MissingPlaceholder(String),

    #[error("Error spawning `{}`: {}", .program, .original)]
    Spawn {
        program: String,
        original: std::io::Error,
    },

    #[error("Runner was already started.")]
    AlreadyStarted,

    #[error("Error {} terminal: {}", .action, .original)]
    Terminal {
        action: String,
        original: std::io::Error,
    },

    #[error("IO error: {}", .0)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn spawn_error(program: String, original: std::io::Error) -> Self {
        Self::Spawn { program, original }
    }

    pub fn terminal_error(action: &str, original: std::io::Error) -> Self {
        Self::Terminal {
            action: action.to_string(),
            original,
        }
    }
}
