//! External collaborators
//!
//! Text generation, image generation and the space-weather feed are black
//! boxes that may fail. Games never retry them: a failure is classified,
//! logged, and replaced by a fallback value. Late results are dropped when
//! the request was superseded or the game has been unmounted.
//!
//! Nothing in the game loop calls these. They are the boundary for host pages
//! (fact panels, image cards, the space-weather dashboard), which implement
//! the traits over their own HTTP client and drive the futures themselves.

#![allow(async_fn_in_trait)]

use serde::{Deserialize, Serialize};

use crate::platform::LivenessToken;

/// Why a collaborator call produced no live value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Quota exhausted; try again later
    RateLimited,
    Unavailable,
}

impl FailureKind {
    pub fn classify(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        if message.contains("RESOURCE_EXHAUSTED") || message.contains("429") {
            FailureKind::RateLimited
        } else {
            FailureKind::Unavailable
        }
    }
}

/// A collaborator result: the live value or the substitute used instead
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback<T> {
    Live(T),
    Substituted { value: T, reason: FailureKind },
}

impl<T> Fallback<T> {
    /// Keep `result`, or log the failure and take `substitute(kind)`
    pub fn resolve(what: &str, result: anyhow::Result<T>, substitute: impl FnOnce(FailureKind) -> T) -> Self {
        match result {
            Ok(value) => Fallback::Live(value),
            Err(e) => {
                let reason = FailureKind::classify(&e);
                match reason {
                    FailureKind::RateLimited => log::warn!("{}: rate limited, using fallback", what),
                    FailureKind::Unavailable => log::warn!("{}: {:#}; using fallback", what, e),
                }
                Fallback::Substituted {
                    value: substitute(reason),
                    reason,
                }
            }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Fallback::Live(value) | Fallback::Substituted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Fallback::Live(value) | Fallback::Substituted { value, .. } => value,
        }
    }

    pub fn is_substituted(&self) -> bool {
        matches!(self, Fallback::Substituted { .. })
    }
}

pub trait TextService {
    async fn request_text(&self, prompt: &str) -> anyhow::Result<String>;
}

pub trait ImageService {
    /// Encoded image bytes (PNG/JPEG)
    async fn request_image(&self, prompt: &str) -> anyhow::Result<Vec<u8>>;
}

/// One coronal mass ejection record from the space-weather feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmeEvent {
    #[serde(rename = "activityID")]
    pub activity_id: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(default)]
    pub note: String,
}

/// Parse the feed's JSON array; unknown fields are ignored
pub fn parse_cme_events(json: &str) -> anyhow::Result<Vec<CmeEvent>> {
    Ok(serde_json::from_str(json)?)
}

/// Inclusive day range, `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CmeCatalog {
    #[default]
    #[serde(rename = "ALL")]
    All,
    #[serde(rename = "SWRC_CATALOG")]
    Swrc,
    #[serde(rename = "JANG_ET_AL_CATALOG")]
    JangEtAl,
}

impl CmeCatalog {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmeCatalog::All => "ALL",
            CmeCatalog::Swrc => "SWRC_CATALOG",
            CmeCatalog::JangEtAl => "JANG_ET_AL_CATALOG",
        }
    }
}

/// Narrowing applied by the feed; zero speed/half-angle means no lower bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmeFilters {
    pub most_accurate_only: bool,
    /// km/s
    pub speed: f32,
    /// Degrees
    pub half_angle: f32,
    pub catalog: CmeCatalog,
}

impl Default for CmeFilters {
    fn default() -> Self {
        Self {
            most_accurate_only: true,
            speed: 0.0,
            half_angle: 0.0,
            catalog: CmeCatalog::All,
        }
    }
}

impl CmeFilters {
    /// Query parameters for one feed request, in a stable order
    pub fn query_pairs(&self, range: &DateRange) -> Vec<(&'static str, String)> {
        vec![
            ("startDate", range.start_date.clone()),
            ("endDate", range.end_date.clone()),
            ("mostAccurateOnly", self.most_accurate_only.to_string()),
            ("speed", self.speed.to_string()),
            ("halfAngle", self.half_angle.to_string()),
            ("catalog", self.catalog.as_str().to_string()),
        ]
    }
}

pub trait SpaceWeatherService {
    async fn fetch_events(&self, range: &DateRange, filters: &CmeFilters) -> anyhow::Result<Vec<CmeEvent>>;
}

/// Text with the two canned replies used when generation fails
#[derive(Debug, Clone, PartialEq)]
pub struct TextFallbacks {
    pub busy: String,
    pub unavailable: String,
}

impl Default for TextFallbacks {
    fn default() -> Self {
        Self {
            busy: "I'm a bit busy with cosmic traffic right now! Ask me again in a moment.".into(),
            unavailable: "The space radio is quiet right now. Try again later!".into(),
        }
    }
}

impl TextFallbacks {
    pub fn pick(&self, reason: FailureKind) -> String {
        match reason {
            FailureKind::RateLimited => self.busy.clone(),
            FailureKind::Unavailable => self.unavailable.clone(),
        }
    }
}

pub async fn text_or_fallback<S: TextService>(service: &S, prompt: &str, fallbacks: &TextFallbacks) -> Fallback<String> {
    let result = service.request_text(prompt).await;
    Fallback::resolve("text service", result, |reason| fallbacks.pick(reason))
}

/// Image bytes, or `None` when generation failed
pub async fn image_or_none<S: ImageService>(service: &S, prompt: &str) -> Fallback<Option<Vec<u8>>> {
    let result = service.request_image(prompt).await.map(Some);
    Fallback::resolve("image service", result, |_| None)
}

/// Recent events, or an empty list when the feed is down
pub async fn events_or_empty<S: SpaceWeatherService>(
    service: &S,
    range: &DateRange,
    filters: &CmeFilters,
) -> Fallback<Vec<CmeEvent>> {
    let result = service.fetch_events(range, filters).await;
    Fallback::resolve("space weather", result, |_| Vec::new())
}

/// Identifies one request issued through a `RequestSlot`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Holds the latest result of a repeatable request. Only the newest ticket
/// may fill it, and only while its owner is still mounted.
#[derive(Debug, Clone)]
pub struct RequestSlot<T> {
    generation: u64,
    pending: bool,
    value: Option<T>,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            pending: false,
            value: None,
        }
    }
}

impl<T> RequestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any in flight
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.pending = true;
        Ticket(self.generation)
    }

    /// Store a result; false when it was stale or the owner is gone
    pub fn fulfill(&mut self, ticket: Ticket, owner: &LivenessToken, value: T) -> bool {
        if !owner.is_alive() {
            log::debug!("Dropping result for unmounted owner");
            return false;
        }
        if ticket.0 != self.generation {
            log::debug!("Dropping stale result (ticket {}, current {})", ticket.0, self.generation);
            return false;
        }
        self.value = Some(value);
        self.pending = false;
        true
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}
