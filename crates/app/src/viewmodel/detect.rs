//! Plate detection view model
//!
//! Holds the image slot and its result. An image is loaded from a file or
//! captured from the camera, sent to the detection service, and the
//! recognised plate can then be copied, saved or handed to fine
//! management.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use smartlpd_core::mock::mock_detection;
use smartlpd_core::{
    Action, Detection, DetectionOutcome, Error as CoreError, ImageData, PermissionMatrix,
    Session, SessionKey,
};
use smartlpd_net::Error as NetError;

use crate::busy::BusyFlag;
use crate::camera::{ActiveCamera, Facing};
use crate::state::AppState;
use crate::ui::{DetectionView, NavBar, Page, Panel, StatusLevel};

pub const RESULT_FILENAME: &str = "license_plate_result.txt";

const NOT_FOUND_TEXT: &str = "No license plate detected";

/// What the image slot currently holds
#[derive(Debug, Clone, Default)]
pub enum Slot {
    #[default]
    Empty,
    Loaded(ImageData),
    Detected { image: ImageData, detection: Detection },
    NotFound(ImageData),
    /// Detection failed and no mock result was substituted
    Failed(ImageData),
}

impl Slot {
    pub fn image(&self) -> Option<&ImageData> {
        match self {
            Slot::Empty => None,
            Slot::Loaded(image)
            | Slot::Detected { image, .. }
            | Slot::NotFound(image)
            | Slot::Failed(image) => Some(image),
        }
    }

    pub fn detection(&self) -> Option<&Detection> {
        match self {
            Slot::Detected { detection, .. } => Some(detection),
            _ => None,
        }
    }

    /// Text shown in the result area once detection has run
    pub fn result_text(&self) -> Option<&str> {
        match self {
            Slot::Detected { detection, .. } => Some(&detection.license_plate_number),
            Slot::NotFound(_) => Some(NOT_FOUND_TEXT),
            _ => None,
        }
    }
}

pub struct DetectController {
    state: Arc<AppState>,
    slot: Mutex<Slot>,
    camera: Mutex<Option<ActiveCamera>>,
    detect_busy: BusyFlag,
}

impl DetectController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            slot: Mutex::new(Slot::Empty),
            camera: Mutex::new(None),
            detect_busy: BusyFlag::new(),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn camera(&self) -> MutexGuard<'_, Option<ActiveCamera>> {
        self.camera.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub fn current(&self) -> Slot {
        self.slot().clone()
    }

    pub fn detected_plate(&self) -> Option<String> {
        self.slot()
            .detection()
            .map(|d| d.license_plate_number.clone())
    }

    #[cfg(test)]
    pub fn camera_open(&self) -> bool {
        self.camera().is_some()
    }

    /// Page guard, then render the page and probe the backend
    pub async fn on_page_load(&self) -> Option<Session> {
        self.state.log_session("detect");
        let ui = &self.state.ui;
        let Some(session) = self.state.session() else {
            ui.alert("Please login first to use license plate detection.");
            ui.navigate(Page::Login, Duration::ZERO);
            return None;
        };

        ui.render(Panel::Navigation(NavBar::for_session(Some(&session))));
        ui.render(Panel::Preview(None));
        ui.render(Panel::Detection(DetectionView::default()));

        match self.state.backend.ping().await {
            Ok(()) => tracing::info!("Backend connected"),
            Err(e) if e.is_transport() => {
                tracing::error!(error = %e, "Backend connection failed");
                ui.status(
                    StatusLevel::Error,
                    "Backend connection failed. Make sure the backend is running on port 8080.",
                );
            }
            Err(e) => tracing::warn!(error = %e, "Backend responded with error"),
        }
        Some(session)
    }

    /// Load an image file into the slot
    pub fn load_file(&self, path: &Path) -> bool {
        self.close_camera();

        let image = match ImageData::from_file(path) {
            Ok(image) => image,
            Err(CoreError::InvalidImage(message)) => {
                self.state.ui.alert(&message);
                return false;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read image");
                self.state.ui.alert(&format!("Unable to read image: {}", e));
                return false;
            }
        };

        self.set_image(image, "Image loaded successfully! Ready for detection.");
        true
    }

    /// Dropped files go through the same path as the picker; only the
    /// first one is used.
    pub fn drop_files(&self, paths: &[PathBuf]) -> bool {
        let Some((first, rest)) = paths.split_first() else {
            return false;
        };
        if !rest.is_empty() {
            tracing::debug!(ignored = rest.len(), "Only the first dropped file is used");
        }
        self.load_file(first)
    }

    pub fn open_camera(&self, facing: Facing) -> bool {
        let mut camera = self.camera();
        if camera.is_some() {
            return true;
        }

        match self.state.camera.open(facing) {
            Ok(stream) => {
                *camera = Some(ActiveCamera::new(stream));
                tracing::debug!(?facing, "Camera stream opened");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::Unsupported => {
                self.state.ui.alert(&e.to_string());
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera error");
                self.state.ui.alert(&format!("Unable to access camera: {}", e));
                false
            }
        }
    }

    /// Grab a frame into the slot and release the camera
    pub fn capture_image(&self) -> bool {
        let Some(mut camera) = self.camera().take() else {
            self.state.ui.status(StatusLevel::Error, "Open the camera before capturing");
            return false;
        };

        let image = camera
            .capture_png()
            .map_err(CoreError::from)
            .and_then(|png| ImageData::from_bytes(&png, "image/png"));
        drop(camera);

        match image {
            Ok(image) => {
                self.set_image(image, "Image captured successfully! Ready for detection.");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Capture failed");
                self.state.ui.alert(&format!("Unable to capture image: {}", e.user_message()));
                false
            }
        }
    }

    pub fn close_camera(&self) {
        self.camera().take();
    }

    /// Back to an empty slot
    pub fn reset(&self) {
        self.close_camera();
        *self.slot() = Slot::Empty;
        self.state.ui.render(Panel::Preview(None));
        self.state.ui.render(Panel::Detection(DetectionView::default()));
    }

    pub async fn detect(&self) {
        let Some(_busy) = self.detect_busy.try_acquire() else {
            tracing::debug!("Detection already in progress");
            return;
        };
        let ui = &self.state.ui;

        let Some(image) = self.slot().image().cloned() else {
            ui.alert("Please upload or capture an image first!");
            return;
        };

        let Some(session) = self.state.session() else {
            ui.alert("Please login first to use license plate detection.");
            ui.navigate(Page::Login, Duration::ZERO);
            return;
        };
        if let Err(e) = PermissionMatrix::require(session.role, Action::DetectPlate) {
            ui.alert(&e.user_message());
            return;
        }

        tracing::debug!(mime = image.mime(), bytes = image.decoded_len(), "Sending image for detection");
        let result = self
            .state
            .backend
            .detect(&session.token, image.base64_payload())
            .await;
        let can_issue = PermissionMatrix::can_perform(session.role, Action::HandOffToFineManagement);

        match result {
            Ok(DetectionOutcome::Found(detection)) => {
                ui.status(
                    StatusLevel::Success,
                    &format!(
                        "License plate detected: {} ({}% confidence)",
                        detection.license_plate_number,
                        detection.confidence_percent()
                    ),
                );
                self.show_detection(image, detection, can_issue);
            }
            Ok(DetectionOutcome::NotFound { message }) => {
                ui.render(Panel::Detection(DetectionView {
                    plate_label: "NOT FOUND".to_string(),
                    extracted_text: NOT_FOUND_TEXT.to_string(),
                    show_issue_fine: false,
                }));
                ui.status(StatusLevel::Error, &message);
                *self.slot() = Slot::NotFound(image);
            }
            Err(NetError::Unauthorized) => {
                tracing::warn!("Detection rejected, session expired");
                self.state.clear_session();
                ui.alert("Session expired. Please login again.");
                ui.navigate(Page::Login, Duration::ZERO);
            }
            Err(e) => {
                tracing::error!(error = %e, "Detection error");
                ui.status(
                    StatusLevel::Error,
                    &format!("Error detecting license plate: {}", e),
                );

                if self.state.config.mock_detection_fallback {
                    let detection = mock_detection();
                    ui.status(
                        StatusLevel::Info,
                        &format!(
                            "Using mock data: {} ({}% confidence)",
                            detection.license_plate_number,
                            detection.confidence_percent()
                        ),
                    );
                    self.show_detection(image, detection, can_issue);
                } else {
                    *self.slot() = Slot::Failed(image);
                }
            }
        }
    }

    pub fn copy_text(&self) {
        let ui = &self.state.ui;
        let text = self.slot().result_text().map(str::to_string);
        match text {
            Some(text) if ui.copy_to_clipboard(&text) => {
                ui.status(StatusLevel::Success, "Text copied to clipboard!");
            }
            Some(_) => ui.status(StatusLevel::Error, "Unable to access the clipboard"),
            None => ui.status(StatusLevel::Error, "No text to copy!"),
        }
    }

    pub fn download_result(&self) {
        let ui = &self.state.ui;
        let Some(text) = self.slot().result_text().map(str::to_string) else {
            ui.status(StatusLevel::Error, "No results to download!");
            return;
        };

        match ui.save_download(RESULT_FILENAME, text.as_bytes()) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Result saved");
                ui.status(StatusLevel::Success, "Result downloaded successfully!");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save result");
                ui.status(StatusLevel::Error, &format!("Failed to download result: {}", e));
            }
        }
    }

    /// Pass the detected plate to the fine management page
    pub fn issue_fine_handoff(&self) {
        let ui = &self.state.ui;
        let Some(plate) = self.detected_plate() else {
            ui.status(StatusLevel::Error, "No license plate detected to issue fine!");
            return;
        };

        if let Err(e) = self.state.authorize(Action::HandOffToFineManagement) {
            ui.status(StatusLevel::Error, &e.user_message());
            return;
        }

        if let Err(e) = self.state.store.set(SessionKey::DetectedPlate, &plate) {
            tracing::error!(error = %e, "Failed to store detected plate");
            ui.status(StatusLevel::Error, &format!("Failed to hand off plate: {}", e));
            return;
        }
        tracing::debug!(plate = %plate, "Handing plate to fine management");
        ui.navigate(Page::ManageFines, Duration::ZERO);
    }

    fn set_image(&self, image: ImageData, message: &str) {
        tracing::debug!(mime = image.mime(), bytes = image.decoded_len(), "Image ready");
        *self.slot() = Slot::Loaded(image.clone());
        let ui = &self.state.ui;
        ui.render(Panel::Preview(Some(image)));
        ui.render(Panel::Detection(DetectionView::default()));
        ui.status(StatusLevel::Success, message);
    }

    fn show_detection(&self, image: ImageData, detection: Detection, can_issue: bool) {
        self.state.ui.render(Panel::Detection(DetectionView {
            plate_label: detection.license_plate_number.clone(),
            extracted_text: detection.license_plate_number.clone(),
            show_issue_fine: can_issue,
        }));
        *self.slot() = Slot::Detected { image, detection };
    }
}
