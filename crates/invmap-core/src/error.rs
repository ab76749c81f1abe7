use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum InvmapError {
    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("pdftoppm not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftoppmNotFound,

    #[error("pdftoppm failed with exit code {code}: {stderr}")]
    PdftoppmFailed { code: i32, stderr: String },

    #[error("failed to read template: {0}")]
    Template(String),

    #[error("missing API credential: set the {env_var} environment variable")]
    MissingCredential { env_var: String },

    #[error("model request failed: {0}")]
    Model(String),

    #[error("model API error {status}: {body}")]
    ModelStatus { status: u16, body: String },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
