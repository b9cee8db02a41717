pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod transport;
pub mod view;

pub use command::{execute, Command, Outcome, SessionGeneration};
pub use config::{load_settings, normalize_base_url, ClientSettings};
pub use controller::ViewController;
pub use error::{ClientError, ClientResult, UNEXPECTED_RESPONSE_MESSAGE};
pub use transport::{read_upload, Backend, HttpBackend};
pub use view::{
    AgentPanel, AuthMode, AuthPanel, BackendStatus, FraudPanel, ProjectsPanel, ProjectsView, Tab,
    ViewState,
};
