//! Email delivery engines
//!
//! Every backend implements [`Engine`]; the factory maps a backend name onto
//! one of them:
//! - `DJANGO`: SMTP mailer (lettre) using the global mail settings
//! - `POSTMARK`: Postmark transactional API
//! - `AWSSES`: AWS SES v2

pub mod engine;
pub mod factory;
pub mod mailer;
pub mod postmark;
pub mod ses;

pub use engine::{EmailSender, Engine, ParameterCheck};
pub use factory::{resolve, EmailEngine, EngineKind};
pub use mailer::FrameworkMailerEngine;
pub use postmark::PostmarkEngine;
pub use ses::SesEngine;
