//! Engine factory: backend name to engine

use super::engine::{EmailSender, Engine};
use super::mailer::{self, FrameworkMailerEngine};
use super::postmark::{self, PostmarkEngine};
use super::ses::{self, SesEngine};
use crate::config::Settings;
use crate::domain::{ConfigMap, EmailRequest, SendReceipt};
use crate::error::{EmailError, Result, ValidationIssue};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// SMTP mailer driven by the global mail settings
    FrameworkMailer,
    /// Postmark transactional API
    Postmark,
    /// AWS Simple Email Service
    AwsSes,
}

impl EngineKind {
    pub const ALL: [EngineKind; 3] = [
        EngineKind::FrameworkMailer,
        EngineKind::Postmark,
        EngineKind::AwsSes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EngineKind::FrameworkMailer => mailer::ENGINE_NAME,
            EngineKind::Postmark => postmark::ENGINE_NAME,
            EngineKind::AwsSes => ses::ENGINE_NAME,
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.name()).collect()
    }

    pub fn build(self, settings: Arc<Settings>) -> EmailEngine {
        match self {
            EngineKind::FrameworkMailer => {
                EmailEngine::FrameworkMailer(FrameworkMailerEngine::new(settings))
            }
            EngineKind::Postmark => EmailEngine::Postmark(PostmarkEngine::new(settings)),
            EngineKind::AwsSes => EmailEngine::AwsSes(SesEngine::new(settings)),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = EmailError;

    fn from_str(name: &str) -> Result<Self> {
        resolve(name)
    }
}

/// Look up a backend by its exact name
pub fn resolve(name: &str) -> Result<EngineKind> {
    EngineKind::ALL
        .into_iter()
        .find(|kind| kind.name() == name)
        .ok_or_else(|| EmailError::UnknownBackend {
            name: name.to_string(),
            valid: EngineKind::names(),
        })
}

/// A concrete engine chosen at runtime
pub enum EmailEngine {
    FrameworkMailer(FrameworkMailerEngine),
    Postmark(PostmarkEngine),
    AwsSes(SesEngine),
}

impl EmailEngine {
    pub fn from_name(name: &str, settings: Arc<Settings>) -> Result<Self> {
        Ok(resolve(name)?.build(settings))
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            EmailEngine::FrameworkMailer(_) => EngineKind::FrameworkMailer,
            EmailEngine::Postmark(_) => EngineKind::Postmark,
            EmailEngine::AwsSes(_) => EngineKind::AwsSes,
        }
    }
}

#[async_trait]
impl EmailSender for EmailEngine {
    fn engine_name(&self) -> &'static str {
        self.kind().name()
    }

    fn configuration(&self) -> ConfigMap {
        match self {
            EmailEngine::FrameworkMailer(engine) => engine.configuration(),
            EmailEngine::Postmark(engine) => engine.configuration(),
            EmailEngine::AwsSes(engine) => engine.configuration(),
        }
    }

    fn check_configuration(&self) -> Vec<ValidationIssue> {
        match self {
            EmailEngine::FrameworkMailer(engine) => engine.check_configuration(),
            EmailEngine::Postmark(engine) => engine.check_configuration(),
            EmailEngine::AwsSes(engine) => engine.check_configuration(),
        }
    }

    async fn send_mail(&self, request: &EmailRequest) -> Result<SendReceipt> {
        match self {
            EmailEngine::FrameworkMailer(engine) => engine.send_mail(request).await,
            EmailEngine::Postmark(engine) => engine.send_mail(request).await,
            EmailEngine::AwsSes(engine) => engine.send_mail(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DJANGO", EngineKind::FrameworkMailer)]
    #[case("POSTMARK", EngineKind::Postmark)]
    #[case("AWSSES", EngineKind::AwsSes)]
    fn test_resolve_known_names(#[case] name: &str, #[case] expected: EngineKind) {
        let kind = resolve(name).unwrap();
        assert_eq!(kind, expected);
        assert_eq!(kind.to_string(), name);
        assert_eq!(name.parse::<EngineKind>().unwrap(), expected);
    }

    #[rstest]
    #[case("postmark")]
    #[case("SES")]
    #[case(" DJANGO")]
    #[case("")]
    fn test_resolve_unknown_names(#[case] name: &str) {
        match resolve(name) {
            Err(EmailError::UnknownBackend { name: got, valid }) => {
                assert_eq!(got, name);
                assert_eq!(valid, vec!["DJANGO", "POSTMARK", "AWSSES"]);
            }
            other => panic!("Expected UnknownBackend, got {:?}", other),
        }
    }

    #[test]
    fn test_build_matches_kind() {
        let settings = Arc::new(Settings::default());
        for kind in EngineKind::ALL {
            let engine = kind.build(settings.clone());
            assert_eq!(engine.kind(), kind);
            assert_eq!(engine.engine_name(), kind.name());
        }
    }

    #[test]
    fn test_from_name_unknown() {
        let result = EmailEngine::from_name("MAILGUN", Arc::new(Settings::default()));
        assert!(matches!(result, Err(EmailError::UnknownBackend { .. })));
    }

    #[test]
    fn test_configuration_dispatch() {
        let settings = Arc::new(Settings::default());

        let mailer = EngineKind::FrameworkMailer.build(settings.clone());
        assert!(mailer.check_configuration().is_empty());

        let postmark = EngineKind::Postmark.build(settings.clone());
        assert_eq!(postmark.check_configuration().len(), 1);

        let ses = EngineKind::AwsSes.build(settings);
        assert_eq!(ses.configuration().len(), 3);
        // Region has a default; both credentials are missing
        assert_eq!(ses.check_configuration().len(), 2);
    }
}
