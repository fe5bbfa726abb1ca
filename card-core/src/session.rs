//! The card-making session: photo upload, generation, then editing.
//!
//! ```text
//!   Idle ──generate──▶ Generating ──ok──▶ Editing
//!    ▲                     │
//!    │                     └──err──▶ Error
//!    └──────────── reset ◀─────────────┘
//! ```
//!
//! Only one generation may be outstanding, and the editor is locked until
//! generation settles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CardError, CardResult, Editor, EditorConfig, GreetingCatalog};

/// Message shown when the collaborator fails without explaining why.
pub const DEFAULT_GENERATION_ERROR: &str = "generation failed";

/// Remote image stylization, provided by the host.
///
/// Implementations may be nondeterministic (random scenes, random prompts);
/// the session makes no assumption about the output beyond it being an
/// image reference.
#[async_trait(?Send)]
pub trait Generator {
    /// Stylize `source_image` and return a reference to the result,
    /// typically a `data:image/png;base64,...` URI.
    async fn generate(&self, source_image: &str) -> anyhow::Result<String>;
}

/// Phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Waiting for a photo and a generate request.
    Idle,
    /// A generation request is outstanding.
    Generating,
    /// The stylized image is ready and text can be edited.
    Editing,
    /// The last generation failed.
    Error,
}

impl SessionPhase {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Editing => "editing",
            Self::Error => "error",
        }
    }
}

/// One card-making session.
#[derive(Debug)]
pub struct CardSession {
    phase: SessionPhase,
    source_image: Option<String>,
    generated_image: Option<String>,
    error: Option<String>,
    editor: Option<Editor>,
    catalog: GreetingCatalog,
    config: EditorConfig,
}

impl CardSession {
    /// Create an idle session with the default catalog and configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GreetingCatalog::default(), EditorConfig::default())
    }

    /// Create an idle session whose editors use the given catalog and config.
    #[must_use]
    pub fn with_config(catalog: GreetingCatalog, config: EditorConfig) -> Self {
        Self {
            phase: SessionPhase::Idle,
            source_image: None,
            generated_image: None,
            error: None,
            editor: None,
            catalog,
            config,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The uploaded photo, if any.
    #[must_use]
    pub fn source_image(&self) -> Option<&str> {
        self.source_image.as_deref()
    }

    /// The stylized image, once generation succeeded.
    #[must_use]
    pub fn generated_image(&self) -> Option<&str> {
        self.generated_image.as_deref()
    }

    /// The last generation error message, if in the error phase.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether editing controls are enabled.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.phase == SessionPhase::Editing
    }

    /// Provide the photo to stylize.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::GenerationInProgress`] while generating.
    pub fn set_source_image(&mut self, image: impl Into<String>) -> CardResult<()> {
        if self.phase == SessionPhase::Generating {
            return Err(CardError::GenerationInProgress);
        }
        self.source_image = Some(image.into());
        Ok(())
    }

    /// Enter the generating phase and return the photo to send.
    ///
    /// Hosts that drive the network call themselves pair this with
    /// [`finish_generation`](Self::finish_generation); others use
    /// [`generate`](Self::generate).
    ///
    /// # Errors
    ///
    /// Returns [`CardError::GenerationInProgress`] if a request is already
    /// outstanding, or [`CardError::NoSourceImage`] without a photo.
    pub fn begin_generation(&mut self) -> CardResult<String> {
        if self.phase == SessionPhase::Generating {
            return Err(CardError::GenerationInProgress);
        }
        let source = self.source_image.clone().ok_or(CardError::NoSourceImage)?;
        self.error = None;
        self.set_phase(SessionPhase::Generating);
        Ok(source)
    }

    /// Settle an outstanding generation.
    ///
    /// On success a fresh, empty editor opens on the result. On failure
    /// nothing partial is kept and the session moves to the error phase.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::Generation`] carrying the failure message, or
    /// [`CardError::EditingLocked`] if no generation was outstanding.
    pub fn finish_generation(&mut self, result: anyhow::Result<String>) -> CardResult<()> {
        if self.phase != SessionPhase::Generating {
            return Err(CardError::EditingLocked(self.phase.name().to_string()));
        }

        match result {
            Ok(image) if !image.trim().is_empty() => {
                self.generated_image = Some(image);
                self.editor = Some(Editor::with_config(
                    self.catalog.clone(),
                    self.config.clone(),
                ));
                self.set_phase(SessionPhase::Editing);
                Ok(())
            }
            Ok(_) => self.fail("No image data found in response".to_string()),
            Err(err) => {
                let message = err.to_string();
                if message.trim().is_empty() {
                    self.fail(DEFAULT_GENERATION_ERROR.to_string())
                } else {
                    self.fail(message)
                }
            }
        }
    }

    /// Run one generation through `generator`.
    ///
    /// # Errors
    ///
    /// See [`begin_generation`](Self::begin_generation) and
    /// [`finish_generation`](Self::finish_generation).
    pub async fn generate(&mut self, generator: &dyn Generator) -> CardResult<()> {
        let source = self.begin_generation()?;
        let result = generator.generate(&source).await;
        self.finish_generation(result)
    }

    /// The editor, available only in the editing phase.
    #[must_use]
    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref().filter(|_| self.can_edit())
    }

    /// Mutable editor access.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::EditingLocked`] outside the editing phase.
    pub fn editor_mut(&mut self) -> CardResult<&mut Editor> {
        if !self.can_edit() {
            return Err(CardError::EditingLocked(self.phase.name().to_string()));
        }
        self.editor
            .as_mut()
            .ok_or_else(|| CardError::EditingLocked(self.phase.name().to_string()))
    }

    /// Start over: drop both images, the error and the editor.
    ///
    /// Resetting while a generation is outstanding abandons it; a late
    /// [`finish_generation`](Self::finish_generation) is then rejected.
    pub fn reset(&mut self) {
        self.source_image = None;
        self.generated_image = None;
        self.error = None;
        self.editor = None;
        self.set_phase(SessionPhase::Idle);
    }

    fn fail(&mut self, message: String) -> CardResult<()> {
        tracing::warn!("Generation failed: {message}");
        self.generated_image = None;
        self.editor = None;
        self.error = Some(message.clone());
        self.set_phase(SessionPhase::Error);
        Err(CardError::Generation(message))
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            tracing::info!("Session {} -> {}", self.phase.name(), phase.name());
            self.phase = phase;
        }
    }
}

impl Default for CardSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator(&'static str);

    #[async_trait(?Send)]
    impl Generator for FixedGenerator {
        async fn generate(&self, _source_image: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator(&'static str);

    #[async_trait(?Send)]
    impl Generator for FailingGenerator {
        async fn generate(&self, _source_image: &str) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("{}", self.0))
        }
    }

    #[tokio::test]
    async fn successful_generation_opens_editor() {
        let mut session = CardSession::new();
        session.set_source_image("data:image/png;base64,AAAA").expect("source");
        session
            .generate(&FixedGenerator("data:image/png;base64,BBBB"))
            .await
            .expect("generate");

        assert_eq!(session.phase(), SessionPhase::Editing);
        assert_eq!(session.generated_image(), Some("data:image/png;base64,BBBB"));
        assert!(session.editor().is_some_and(|e| e.store().is_empty()));
    }

    #[tokio::test]
    async fn failed_generation_keeps_message_and_locks_editor() {
        let mut session = CardSession::new();
        session.set_source_image("photo").expect("source");
        let result = session.generate(&FailingGenerator("quota exceeded")).await;

        assert!(matches!(result, Err(CardError::Generation(ref m)) if m == "quota exceeded"));
        assert_eq!(session.phase(), SessionPhase::Error);
        assert_eq!(session.error(), Some("quota exceeded"));
        assert!(session.generated_image().is_none());
        assert!(matches!(session.editor_mut(), Err(CardError::EditingLocked(_))));
    }

    #[tokio::test]
    async fn blank_failure_uses_default_message() {
        let mut session = CardSession::new();
        session.set_source_image("photo").expect("source");
        let _ = session.generate(&FailingGenerator("")).await;
        assert_eq!(session.error(), Some(DEFAULT_GENERATION_ERROR));
    }

    #[tokio::test]
    async fn empty_result_is_a_failure() {
        let mut session = CardSession::new();
        session.set_source_image("photo").expect("source");
        let result = session.generate(&FixedGenerator("")).await;
        assert!(result.is_err());
        assert_eq!(session.phase(), SessionPhase::Error);
    }

    #[test]
    fn generation_requires_source() {
        let mut session = CardSession::new();
        assert!(matches!(session.begin_generation(), Err(CardError::NoSourceImage)));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn only_one_generation_at_a_time() {
        let mut session = CardSession::new();
        session.set_source_image("photo").expect("source");
        session.begin_generation().expect("first");

        assert!(matches!(
            session.begin_generation(),
            Err(CardError::GenerationInProgress)
        ));
        assert!(matches!(
            session.set_source_image("other"),
            Err(CardError::GenerationInProgress)
        ));
        assert!(!session.can_edit());
        assert!(session.editor_mut().is_err());
    }

    #[test]
    fn reset_abandons_outstanding_generation() {
        let mut session = CardSession::new();
        session.set_source_image("photo").expect("source");
        session.begin_generation().expect("begin");
        session.reset();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.source_image().is_none());
        assert!(session
            .finish_generation(Ok("data:image/png;base64,BBBB".to_string()))
            .is_err());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn retry_after_error() {
        let mut session = CardSession::new();
        session.set_source_image("photo").expect("source");
        session.begin_generation().expect("begin");
        let _ = session.finish_generation(Err(anyhow::anyhow!("network")));
        assert_eq!(session.phase(), SessionPhase::Error);

        session.begin_generation().expect("retry");
        assert!(session.error().is_none());
        session
            .finish_generation(Ok("data:image/png;base64,CCCC".to_string()))
            .expect("finish");
        assert!(session.can_edit());
    }
}
