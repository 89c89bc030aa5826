//! In-process doubles for controller tests

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use smartlpd_core::validation::Registration;
use smartlpd_core::{
    Config, Detection, DetectionOutcome, DetectionSource, Fine, FineStats, FineStatus,
    MemoryStore, NewFine, Role, Session, SessionStore,
};
use smartlpd_net::{Backend, Error, Result};

use crate::camera::{Camera, CameraStream, Facing};
use crate::state::AppState;
use crate::ui::{Page, Panel, StatusLevel, Ui};

/// Canned reply for one backend call
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Unauthorized,
    Status(u16),
    Rejected(Option<String>),
    /// Connection refused before any response
    Unreachable,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Unauthorized => Err(Error::Unauthorized),
            Reply::Status(code) => Err(Error::Status(*code)),
            Reply::Rejected(message) => Err(Error::Rejected(message.clone())),
            Reply::Unreachable => Err(refused().await),
        }
    }
}

/// A genuine transport error from a port nobody listens on
async fn refused() -> Error {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let err = client
        .get(format!("http://{}/api/test", addr))
        .send()
        .await
        .unwrap_err();
    Error::Http(err)
}

/// Calls the fake has received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Ping,
    Register(String),
    Login(String),
    Detect { token: String, image: String },
    CheckFines(String),
    PayFine(i64, String),
    FineStats,
    AllFines,
    IssueFine(NewFine),
    UpdateFineStatus(i64, FineStatus),
}

pub struct FakeBackend {
    pub calls: Mutex<Vec<Call>>,
    pub ping: Mutex<Reply<()>>,
    pub register: Mutex<Reply<Session>>,
    pub login: Mutex<Reply<Session>>,
    pub detect: Mutex<Reply<DetectionOutcome>>,
    pub check_fines: Mutex<Reply<Vec<Fine>>>,
    pub pay_fine: Mutex<Reply<Option<String>>>,
    pub fine_stats: Mutex<Reply<FineStats>>,
    pub all_fines: Mutex<Reply<Vec<Fine>>>,
    pub issue_fine: Mutex<Reply<Option<String>>>,
    pub update_fine_status: Mutex<Reply<Option<String>>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            ping: Mutex::new(Reply::Ok(())),
            register: Mutex::new(Reply::Ok(Session::new("jwt-new", "dana", Role::Citizen))),
            login: Mutex::new(Reply::Ok(Session::new("jwt-login", "officer", Role::Authority))),
            detect: Mutex::new(Reply::Ok(DetectionOutcome::Found(Detection {
                license_plate_number: "KA01AB1234".into(),
                confidence: 0.934,
                source: DetectionSource::Backend,
            }))),
            check_fines: Mutex::new(Reply::Ok(Vec::new())),
            pay_fine: Mutex::new(Reply::Ok(None)),
            fine_stats: Mutex::new(Reply::Ok(FineStats::default())),
            all_fines: Mutex::new(Reply::Ok(Vec::new())),
            issue_fine: Mutex::new(Reply::Ok(None)),
            update_fine_status: Mutex::new(Reply::Ok(None)),
        }
    }
}

impl FakeBackend {
    pub fn set<T>(slot: &Mutex<Reply<T>>, reply: Reply<T>) {
        *slot.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn reply<T: Clone>(slot: &Mutex<Reply<T>>) -> Reply<T> {
        slot.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn ping(&self) -> Result<()> {
        self.record(Call::Ping);
        Self::reply(&self.ping).resolve().await
    }

    async fn register(&self, registration: &Registration) -> Result<Session> {
        self.record(Call::Register(registration.username.clone()));
        Self::reply(&self.register).resolve().await
    }

    async fn login(&self, username: &str, _password: &str) -> Result<Session> {
        self.record(Call::Login(username.to_string()));
        Self::reply(&self.login).resolve().await
    }

    async fn detect(&self, token: &str, image_base64: &str) -> Result<DetectionOutcome> {
        self.record(Call::Detect {
            token: token.to_string(),
            image: image_base64.to_string(),
        });
        Self::reply(&self.detect).resolve().await
    }

    async fn check_fines(&self, plate: &str) -> Result<Vec<Fine>> {
        self.record(Call::CheckFines(plate.to_string()));
        Self::reply(&self.check_fines).resolve().await
    }

    async fn pay_fine(&self, fine_id: i64, plate: &str) -> Result<Option<String>> {
        self.record(Call::PayFine(fine_id, plate.to_string()));
        Self::reply(&self.pay_fine).resolve().await
    }

    async fn fine_stats(&self) -> Result<FineStats> {
        self.record(Call::FineStats);
        Self::reply(&self.fine_stats).resolve().await
    }

    async fn all_fines(&self) -> Result<Vec<Fine>> {
        self.record(Call::AllFines);
        Self::reply(&self.all_fines).resolve().await
    }

    async fn issue_fine(&self, fine: &NewFine) -> Result<Option<String>> {
        self.record(Call::IssueFine(fine.clone()));
        Self::reply(&self.issue_fine).resolve().await
    }

    async fn update_fine_status(&self, fine_id: i64, status: FineStatus) -> Result<Option<String>> {
        self.record(Call::UpdateFineStatus(fine_id, status));
        Self::reply(&self.update_fine_status).resolve().await
    }
}

/// Everything the UI was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Status(StatusLevel, String),
    Alert(String),
    Confirm(String),
    Navigate(Page, Duration),
    Render(Panel),
    Copy(String),
    Download(String, Vec<u8>),
}

pub struct RecordingUi {
    pub events: Mutex<Vec<UiEvent>>,
    pub confirm_answer: AtomicBool,
    pub clipboard_works: AtomicBool,
}

impl Default for RecordingUi {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
            clipboard_works: AtomicBool::new(true),
        }
    }
}

impl RecordingUi {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<(StatusLevel, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Status(level, message) => Some((level, message)),
                _ => None,
            })
            .collect()
    }

    pub fn has_status(&self, level: StatusLevel, message: &str) -> bool {
        self.statuses()
            .iter()
            .any(|(l, m)| *l == level && m == message)
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<(Page, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Navigate(page, delay) => Some((page, delay)),
                _ => None,
            })
            .collect()
    }

    pub fn panels(&self) -> Vec<Panel> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Render(panel) => Some(panel),
                _ => None,
            })
            .collect()
    }

    pub fn refuse_confirmations(&self) {
        self.confirm_answer.store(false, Ordering::SeqCst);
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Ui for RecordingUi {
    fn status(&self, level: StatusLevel, message: &str) {
        self.push(UiEvent::Status(level, message.to_string()));
    }

    fn alert(&self, message: &str) {
        self.push(UiEvent::Alert(message.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        self.push(UiEvent::Confirm(message.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn navigate(&self, page: Page, delay: Duration) {
        self.push(UiEvent::Navigate(page, delay));
    }

    fn render(&self, panel: Panel) {
        self.push(UiEvent::Render(panel));
    }

    fn copy_to_clipboard(&self, text: &str) -> bool {
        self.push(UiEvent::Copy(text.to_string()));
        self.clipboard_works.load(Ordering::SeqCst)
    }

    fn save_download(&self, filename: &str, contents: &[u8]) -> io::Result<PathBuf> {
        self.push(UiEvent::Download(filename.to_string(), contents.to_vec()));
        Ok(PathBuf::from(filename))
    }
}

/// Camera that records how it was opened and whether its stream was
/// stopped
#[derive(Default)]
pub struct FakeCamera {
    pub stopped: Arc<AtomicBool>,
    pub opened: Mutex<Vec<Facing>>,
}

struct FakeStream(Arc<AtomicBool>);

impl CameraStream for FakeStream {
    fn capture_png(&mut self) -> io::Result<Vec<u8>> {
        Ok(vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'])
    }

    fn stop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Camera for FakeCamera {
    fn open(&self, facing: Facing) -> io::Result<Box<dyn CameraStream>> {
        self.opened.lock().unwrap().push(facing);
        self.stopped.store(false, Ordering::SeqCst);
        Ok(Box::new(FakeStream(self.stopped.clone())))
    }
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub backend: Arc<FakeBackend>,
    pub ui: Arc<RecordingUi>,
    pub store: Arc<MemoryStore>,
    pub camera: Arc<FakeCamera>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let backend = Arc::new(FakeBackend::default());
        let ui = Arc::new(RecordingUi::default());
        let store = Arc::new(MemoryStore::new());
        let camera = Arc::new(FakeCamera::default());
        let state = Arc::new(AppState::new(
            config,
            store.clone(),
            backend.clone(),
            ui.clone(),
            camera.clone(),
        ));
        Self {
            state,
            backend,
            ui,
            store,
            camera,
        }
    }

    /// Harness with a stored session for `role`
    pub fn signed_in(role: Role) -> Self {
        let harness = Self::new();
        Session::new("jwt-abc", "officer", role)
            .save(harness.store.as_ref())
            .unwrap();
        harness
    }

    pub fn session(&self) -> Option<Session> {
        Session::load(self.store.as_ref() as &dyn SessionStore)
    }
}

pub fn sample_fine(id: i64, plate: &str, status: FineStatus) -> Fine {
    Fine {
        id,
        license_plate_number: plate.to_string(),
        violation_type: "Speeding".to_string(),
        amount: 150.0,
        description: Some("40 in a 25 zone".to_string()),
        violation_date: NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap(),
        due_date: None,
        status,
        issued_by_username: Some("officer".to_string()),
    }
}
