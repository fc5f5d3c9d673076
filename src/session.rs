//! Session state and the view state machine.
//!
//! [`Studio`] owns the uploaded photo, the latest result, and the view
//! state, and routes every mutation through a named transition method.
//! One logical request is in flight at a time: the triggering methods take
//! `&mut self`, and the `controls_enabled` flag mirrors the disable /
//! re-enable discipline a UI applies to its buttons.

use crate::error::{Result, StudioError};
use crate::generator::HeadshotGenerator;
use crate::image::{self, ImagePayload};
use crate::prompt::{headshot_prompt, refinement_prompt, OptionSelection, RefinementSelection};
use std::path::Path;

/// The mutually exclusive modes of the result panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Nothing generated yet; also the terminal state after start-over.
    #[default]
    Placeholder,
    /// A generation or regeneration request is in flight.
    Loading,
    /// The latest request produced a headshot.
    Result,
    /// The latest action failed; `message` is the user-facing explanation.
    Error {
        /// What to tell the user.
        message: String,
    },
}

impl ViewState {
    /// Returns true for the error state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The user-facing message, if in the error state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Which result-panel regions are visible.
///
/// Derived from [`ViewState`] in exactly one place ([`Studio::regions`]),
/// so no combination of visible regions other than the four legal ones can
/// be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionVisibility {
    /// The empty-state placeholder.
    pub placeholder: bool,
    /// The in-flight spinner.
    pub loading: bool,
    /// The generated headshot.
    pub result: bool,
    /// The error banner.
    pub error: bool,
}

impl From<&ViewState> for RegionVisibility {
    fn from(view: &ViewState) -> Self {
        Self {
            placeholder: matches!(view, ViewState::Placeholder),
            loading: matches!(view, ViewState::Loading),
            result: matches!(view, ViewState::Result),
            error: view.is_error(),
        }
    }
}

/// The uploaded photo and the most recent generated result.
#[derive(Debug, Default)]
struct SessionState {
    uploaded_image: Option<ImagePayload>,
    current_result: Option<ImagePayload>,
}

/// The headshot session controller.
///
/// Talks to the generation backend only through the [`HeadshotGenerator`]
/// seam, which is what makes the whole machine testable offline.
pub struct Studio {
    generator: Box<dyn HeadshotGenerator>,
    state: SessionState,
    view: ViewState,
    controls_enabled: bool,
}

impl Studio {
    /// Creates a session in the placeholder state.
    pub fn new(generator: Box<dyn HeadshotGenerator>) -> Self {
        Self {
            generator,
            state: SessionState::default(),
            view: ViewState::Placeholder,
            controls_enabled: true,
        }
    }

    /// Reads a photo from disk and stores it as the session's upload.
    ///
    /// On success the view stays in the placeholder state; only the preview
    /// and the generate enablement change. A failed read clears any prior
    /// upload, returns the session to the placeholder state, and propagates
    /// the error for the caller to surface.
    pub async fn upload_photo(&mut self, path: impl AsRef<Path>) -> Result<()> {
        match image::load_photo(path).await {
            Ok(payload) => {
                self.upload_payload(payload);
                Ok(())
            }
            Err(e) => {
                self.state.uploaded_image = None;
                self.view = ViewState::Placeholder;
                Err(e)
            }
        }
    }

    /// Stores an already-encoded payload as the session's upload.
    ///
    /// This is the entry point for environments where a file picker hands
    /// over a blob with a declared MIME type.
    pub fn upload_payload(&mut self, payload: ImagePayload) {
        tracing::debug!(mime = %payload.mime_type, "photo uploaded");
        self.state.uploaded_image = Some(payload);
    }

    /// Generates a headshot from the uploaded photo.
    ///
    /// Transitions directly to the error state, without contacting the
    /// backend, when no photo has been uploaded.
    pub async fn generate(&mut self, selection: &OptionSelection) -> Result<&ImagePayload> {
        let Some(source) = self.state.uploaded_image.clone() else {
            return Err(self.fail_precondition("Upload a photo before generating."));
        };
        let instruction = headshot_prompt(selection);
        self.run_request(source, instruction).await
    }

    /// Regenerates using the previous result as the new source image.
    ///
    /// Transitions directly to the error state, without contacting the
    /// backend, when there is no prior result.
    pub async fn regenerate(&mut self, refinement: &RefinementSelection) -> Result<&ImagePayload> {
        let Some(source) = self.state.current_result.clone() else {
            return Err(self.fail_precondition(
                "Generate a headshot before requesting changes.",
            ));
        };
        let instruction = refinement_prompt(refinement);
        self.run_request(source, instruction).await
    }

    /// Clears the session entirely and returns to the placeholder state.
    pub fn start_over(&mut self) {
        tracing::debug!("session reset");
        self.state = SessionState::default();
        self.controls_enabled = true;
        self.view = ViewState::Placeholder;
    }

    /// Resumes a session from a previously generated headshot.
    ///
    /// Only meaningful for images that came out of a prior successful
    /// generation (e.g. one saved to disk by an earlier run); the result
    /// slot is never fabricated from arbitrary data inside a session.
    pub fn restore_result(&mut self, payload: ImagePayload) {
        self.state.current_result = Some(payload);
        self.view = ViewState::Result;
    }

    /// Current view state.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Visibility of the result-panel regions, derived from the view state.
    pub fn regions(&self) -> RegionVisibility {
        RegionVisibility::from(&self.view)
    }

    /// Whether the triggering controls are currently enabled.
    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    /// Whether a generate action would pass its precondition right now.
    pub fn can_generate(&self) -> bool {
        self.controls_enabled && self.state.uploaded_image.is_some()
    }

    /// Whether a regenerate action would pass its precondition right now.
    pub fn can_regenerate(&self) -> bool {
        self.controls_enabled && self.state.current_result.is_some()
    }

    /// The uploaded photo, if any.
    pub fn uploaded_photo(&self) -> Option<&ImagePayload> {
        self.state.uploaded_image.as_ref()
    }

    /// The most recent generated headshot, if any.
    pub fn result(&self) -> Option<&ImagePayload> {
        self.state.current_result.as_ref()
    }

    /// Data URL for the most recent result, for a download link.
    pub fn download_url(&self) -> Option<String> {
        self.state.current_result.as_ref().map(|p| p.to_data_url())
    }

    async fn run_request(
        &mut self,
        source: ImagePayload,
        instruction: String,
    ) -> Result<&ImagePayload> {
        self.begin_request();
        let outcome = self.generator.generate(&source, &instruction).await;
        self.finish_request(outcome)
    }

    fn begin_request(&mut self) {
        self.controls_enabled = false;
        self.view = ViewState::Loading;
    }

    /// The single completion path for both success and failure.
    ///
    /// Controls re-enable unconditionally here, so no error can leave the
    /// session stuck with disabled controls. On failure the previous result
    /// is left untouched.
    fn finish_request(&mut self, outcome: Result<ImagePayload>) -> Result<&ImagePayload> {
        self.controls_enabled = true;
        match outcome {
            Ok(payload) => {
                self.view = ViewState::Result;
                Ok(self.state.current_result.insert(payload))
            }
            Err(e) => {
                tracing::warn!("generation failed: {e}");
                self.view = ViewState::Error {
                    message: e.user_message(),
                };
                Err(e)
            }
        }
    }

    fn fail_precondition(&mut self, message: &str) -> StudioError {
        let err = StudioError::Precondition(message.to_string());
        self.view = ViewState::Error {
            message: err.user_message(),
        };
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Scripted generator: pops one prepared outcome per call and records
    /// what it was called with.
    struct StubGenerator {
        responses: Mutex<VecDeque<Result<ImagePayload>>>,
        calls: AtomicUsize,
        last_source: Mutex<Option<ImagePayload>>,
    }

    impl StubGenerator {
        fn scripted(responses: Vec<Result<ImagePayload>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                last_source: Mutex::new(None),
            }
        }

        fn unreachable() -> Self {
            Self::scripted(Vec::new())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HeadshotGenerator for Arc<StubGenerator> {
        async fn generate(
            &self,
            source: &ImagePayload,
            _instruction: &str,
        ) -> Result<ImagePayload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_source.lock().unwrap() = Some(source.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("stub generator called more times than scripted")
        }
    }

    fn payload(tag: &str) -> ImagePayload {
        ImagePayload::from_bytes(tag.as_bytes(), "image/png")
    }

    fn studio_with(stub: StubGenerator) -> (Studio, Arc<StubGenerator>) {
        let stub = Arc::new(stub);
        (Studio::new(Box::new(stub.clone())), stub)
    }

    #[tokio::test]
    async fn test_generate_without_upload_errors_without_calling_backend() {
        let (mut studio, stub) = studio_with(StubGenerator::unreachable());

        let err = studio.generate(&OptionSelection::default()).await.unwrap_err();

        assert!(matches!(err, StudioError::Precondition(_)));
        assert!(studio.view().is_error());
        assert_eq!(stub.calls(), 0);
        assert!(studio.controls_enabled());
    }

    #[tokio::test]
    async fn test_regenerate_without_result_errors_without_calling_backend() {
        let (mut studio, stub) = studio_with(StubGenerator::unreachable());
        studio.upload_payload(payload("upload"));

        let err = studio
            .regenerate(&RefinementSelection::view("show a side profile"))
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::Precondition(_)));
        assert!(studio.view().is_error());
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_generate_stores_result_and_shows_it() {
        let result = payload("result");
        let (mut studio, stub) = studio_with(StubGenerator::scripted(vec![Ok(result.clone())]));
        studio.upload_payload(payload("upload"));

        let generated = studio
            .generate(&OptionSelection::default())
            .await
            .unwrap()
            .clone();

        assert_eq!(generated, result);
        assert_eq!(studio.result(), Some(&result));
        assert_eq!(studio.view(), &ViewState::Result);
        assert!(studio.controls_enabled());
        assert!(studio.can_regenerate());
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_sends_uploaded_photo_as_source() {
        let upload = payload("upload");
        let (mut studio, stub) =
            studio_with(StubGenerator::scripted(vec![Ok(payload("result"))]));
        studio.upload_payload(upload.clone());

        studio.generate(&OptionSelection::default()).await.unwrap();

        assert_eq!(*stub.last_source.lock().unwrap(), Some(upload));
    }

    #[tokio::test]
    async fn test_regenerate_uses_previous_result_as_source() {
        let first = payload("first");
        let second = payload("second");
        let (mut studio, stub) = studio_with(StubGenerator::scripted(vec![
            Ok(first.clone()),
            Ok(second.clone()),
        ]));
        studio.upload_payload(payload("upload"));

        studio.generate(&OptionSelection::default()).await.unwrap();
        studio
            .regenerate(&RefinementSelection::custom("warmer tones"))
            .await
            .unwrap();

        assert_eq!(*stub.last_source.lock().unwrap(), Some(first));
        assert_eq!(studio.result(), Some(&second));
    }

    #[tokio::test]
    async fn test_empty_response_keeps_previous_result() {
        let first = payload("first");
        let (mut studio, _stub) = studio_with(StubGenerator::scripted(vec![
            Ok(first.clone()),
            Err(StudioError::NoImageReturned),
        ]));
        studio.upload_payload(payload("upload"));
        studio.generate(&OptionSelection::default()).await.unwrap();

        let err = studio
            .regenerate(&RefinementSelection::custom("try again"))
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::NoImageReturned));
        assert_eq!(
            studio.view().error_message(),
            Some(StudioError::NoImageReturned.user_message().as_str())
        );
        assert_eq!(studio.result(), Some(&first));
        assert!(studio.controls_enabled());
    }

    #[tokio::test]
    async fn test_transport_failure_re_enables_controls() {
        let (mut studio, _stub) = studio_with(StubGenerator::scripted(vec![Err(
            StudioError::Api {
                status: 503,
                message: "unavailable".into(),
            },
        )]));
        studio.upload_payload(payload("upload"));

        let err = studio.generate(&OptionSelection::default()).await.unwrap_err();

        assert!(err.is_transport());
        assert!(studio.view().is_error());
        assert!(studio.controls_enabled());
        assert!(studio.result().is_none());
    }

    #[tokio::test]
    async fn test_start_over_clears_everything_from_any_state() {
        let (mut studio, _stub) =
            studio_with(StubGenerator::scripted(vec![Ok(payload("result"))]));
        studio.upload_payload(payload("upload"));
        studio.generate(&OptionSelection::default()).await.unwrap();

        studio.start_over();

        assert_eq!(studio.view(), &ViewState::Placeholder);
        assert!(studio.uploaded_photo().is_none());
        assert!(studio.result().is_none());
        assert!(!studio.can_generate());
        assert!(!studio.can_regenerate());
        assert!(studio.controls_enabled());
    }

    #[tokio::test]
    async fn test_start_over_from_error_state() {
        let (mut studio, _stub) = studio_with(StubGenerator::unreachable());
        studio.generate(&OptionSelection::default()).await.unwrap_err();
        assert!(studio.view().is_error());

        studio.start_over();
        assert_eq!(studio.view(), &ViewState::Placeholder);
    }

    #[tokio::test]
    async fn test_upload_success_keeps_placeholder_view() {
        let (mut studio, _stub) = studio_with(StubGenerator::unreachable());

        studio.upload_payload(payload("upload"));

        assert_eq!(studio.view(), &ViewState::Placeholder);
        assert!(studio.can_generate());
        assert!(!studio.can_regenerate());
    }

    #[tokio::test]
    async fn test_failed_upload_returns_to_placeholder_and_clears_prior_upload() {
        let (mut studio, _stub) = studio_with(StubGenerator::unreachable());
        studio.upload_payload(payload("old upload"));

        let err = studio
            .upload_photo("/nonexistent/studioshot/photo.png")
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::Read(_)));
        assert_eq!(studio.view(), &ViewState::Placeholder);
        assert!(studio.uploaded_photo().is_none());
        assert!(!studio.can_generate());
    }

    #[tokio::test]
    async fn test_restore_result_enables_regeneration() {
        let restored = payload("saved headshot");
        let (mut studio, _stub) =
            studio_with(StubGenerator::scripted(vec![Ok(payload("refined"))]));

        studio.restore_result(restored.clone());

        assert_eq!(studio.view(), &ViewState::Result);
        assert!(studio.can_regenerate());
        studio
            .regenerate(&RefinementSelection::view("face the camera directly"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_download_url_is_data_uri() {
        let (mut studio, _stub) = studio_with(StubGenerator::unreachable());
        assert!(studio.download_url().is_none());

        studio.restore_result(ImagePayload::from_bytes(b"abc", "image/png"));
        assert_eq!(
            studio.download_url().unwrap(),
            "data:image/png;base64,YWJj"
        );
    }

    #[tokio::test]
    async fn test_request_passes_through_loading_state() {
        let (mut studio, _stub) = studio_with(StubGenerator::unreachable());
        studio.upload_payload(payload("upload"));

        studio.begin_request();
        assert_eq!(studio.view(), &ViewState::Loading);
        assert!(!studio.controls_enabled());
        assert!(!studio.can_generate());

        studio
            .finish_request(Ok(payload("result")))
            .expect("scripted success");
        assert_eq!(studio.view(), &ViewState::Result);
        assert!(studio.controls_enabled());
    }

    #[test]
    fn test_exactly_one_region_visible_per_state() {
        let states = [
            ViewState::Placeholder,
            ViewState::Loading,
            ViewState::Result,
            ViewState::Error {
                message: "boom".into(),
            },
        ];
        for state in &states {
            let regions = RegionVisibility::from(state);
            let visible = [
                regions.placeholder,
                regions.loading,
                regions.result,
                regions.error,
            ]
            .iter()
            .filter(|v| **v)
            .count();
            assert_eq!(visible, 1, "state {state:?} must show exactly one region");
        }
    }
}
