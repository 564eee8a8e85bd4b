pub mod attachment;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod transcript;

pub use attachment::{ATTACHMENT_EXTENSIONS, Attachment};
pub use config::{API_KEY_ENV, ChatSettings, Config, ConfigError, GenerationSettings, ProviderConfig};
pub use error::{AttachmentError, Error, Result, TransportError};
pub use generation::{GenerationConfig, MAX_TOKENS_RANGE, Model, TEMPERATURE_RANGE};
pub use logging::{ContentLogging, LogFormat, LoggingConfig, PrivacyConfig, init_logging, redact_content};
pub use transcript::{Message, Role, Transcript};
