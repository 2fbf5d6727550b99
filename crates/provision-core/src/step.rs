use crate::error::{ProvisionError, Result};

pub type Check<'a> = Box<dyn Fn() -> Result<bool> + 'a>;
pub type Action<'a> = Box<dyn Fn() -> Result<Option<String>> + 'a>;
pub type FailureFn<'a> = Box<dyn Fn() -> ProvisionError + 'a>;

/// One idempotent unit of environment setup.
///
/// `precondition` answers "does the effect already hold?"; when it does the
/// step is skipped. `action` performs the work and may return a detail line
/// for the report. `verification` runs after the action; a `false` result
/// fails the step with the error built by `on_unverified`.
pub struct ProvisioningStep<'a> {
    pub name: String,
    pub fatal: bool,
    pub(crate) precondition: Option<Check<'a>>,
    pub(crate) action: Action<'a>,
    pub(crate) verification: Option<Check<'a>>,
    pub(crate) on_unverified: FailureFn<'a>,
}

impl<'a> ProvisioningStep<'a> {
    pub fn new(
        name: impl Into<String>,
        action: impl Fn() -> Result<Option<String>> + 'a,
    ) -> Self {
        let name = name.into();
        let label = name.clone();
        Self {
            name,
            fatal: true,
            precondition: None,
            action: Box::new(action),
            verification: None,
            on_unverified: Box::new(move || ProvisionError::StepUnverified {
                step: label.clone(),
            }),
        }
    }

    pub fn skip_if(mut self, check: impl Fn() -> Result<bool> + 'a) -> Self {
        self.precondition = Some(Box::new(check));
        self
    }

    pub fn verify(
        mut self,
        check: impl Fn() -> Result<bool> + 'a,
        on_unverified: impl Fn() -> ProvisionError + 'a,
    ) -> Self {
        self.verification = Some(Box::new(check));
        self.on_unverified = Box::new(on_unverified);
        self
    }

    pub fn non_fatal(mut self) -> Self {
        self.fatal = false;
        self
    }

    pub(crate) fn already_satisfied(&self) -> Result<bool> {
        match &self.precondition {
            Some(check) => check(),
            None => Ok(false),
        }
    }

    /// Run the action, then the verification.
    pub(crate) fn execute(&self) -> Result<Option<String>> {
        let detail = (self.action)()?;
        if let Some(check) = &self.verification {
            if !check()? {
                return Err((self.on_unverified)());
            }
        }
        Ok(detail)
    }
}

impl std::fmt::Debug for ProvisioningStep<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningStep")
            .field("name", &self.name)
            .field("fatal", &self.fatal)
            .field("has_precondition", &self.precondition.is_some())
            .field("has_verification", &self.verification.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn defaults_to_fatal_without_precondition() {
        let step = ProvisioningStep::new("noop", || Ok(None));
        assert!(step.fatal);
        assert!(!step.already_satisfied().unwrap());
        assert!(!step.non_fatal().fatal);
    }

    #[test]
    fn failed_verification_uses_configured_error() {
        let step = ProvisioningStep::new("install tool", || Ok(None)).verify(
            || Ok(false),
            || ProvisionError::ToolNotFound {
                tool: "tesseract".to_string(),
            },
        );
        let err = step.execute().unwrap_err();
        assert!(matches!(err, ProvisionError::ToolNotFound { tool } if tool == "tesseract"));
    }

    #[test]
    fn verification_not_reached_when_action_fails() {
        let verified = Cell::new(false);
        let step = ProvisioningStep::new("x", || {
            Err(ProvisionError::ManifestInstallFailure("pip exited 1".to_string()))
        })
        .verify(
            || {
                verified.set(true);
                Ok(true)
            },
            || ProvisionError::ManifestInstallFailure("unused".to_string()),
        );
        assert!(step.execute().is_err());
        assert!(!verified.get());
    }

    #[test]
    fn action_detail_is_returned() {
        let step = ProvisioningStep::new("smoke", || Ok(Some("flask 3.0.3".to_string())));
        assert_eq!(step.execute().unwrap().as_deref(), Some("flask 3.0.3"));
    }
}
