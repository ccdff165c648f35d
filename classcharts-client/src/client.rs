//! Client core, builder and the endpoints shared by both personas

use crate::error::ClassChartsError;
use crate::options::{
    ActivityOptions, AttendanceOptions, BehaviourOptions, FullActivityOptions, HomeworkOptions,
    LessonsOptions,
};
use crate::parent::ParentClient;
use crate::session::Session;
use crate::student::StudentClient;
use crate::transport::{ApiRequest, Transport};
use crate::types::{
    ActivityPoint, ActivityResponse, AnnouncementsResponse, AttendanceResponse, BadgesResponse,
    BehaviourResponse, DetentionsResponse, HomeworksResponse, LessonsResponse, PupilFieldsResponse,
    StudentInfoResponse,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Site every client talks to unless overridden
pub const DEFAULT_BASE_URL: &str = "https://www.classcharts.com";

/// How long a session id stays valid before it is refreshed with a ping
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(3 * 60);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Transport plus session state, owned by one [`ParentClient`] or [`StudentClient`]
///
/// Exposed only so that [`ClassChartsClient`] implementors can hand it to the
/// shared endpoint methods.
#[derive(Debug)]
pub struct ClientCore {
    transport: Transport,
    api_base: &'static str,
    ping_interval: Duration,
    pub(crate) session: Session,
}

impl ClientCore {
    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Whether a login has succeeded and not been undone
    pub fn is_authenticated(&self) -> bool {
        self.session.is_active()
    }

    /// Identifier of the student whose data is requested
    pub fn student_id(&self) -> Option<i64> {
        self.session.student_id
    }

    pub(crate) fn ensure_authenticated(&self) -> Result<(), ClassChartsError> {
        if self.session.is_active() {
            Ok(())
        } else {
            Err(ClassChartsError::NoSession)
        }
    }

    pub(crate) fn require_student_id(&self) -> Result<i64, ClassChartsError> {
        self.ensure_authenticated()?;
        self.session
            .student_id
            .ok_or_else(|| ClassChartsError::validation("No pupil selected"))
    }

    /// `<endpoint>/<student id>`, failing if no pupil context exists
    pub(crate) fn pupil_path(&self, endpoint: &str) -> Result<String, ClassChartsError> {
        Ok(format!("{}/{}", endpoint, self.require_student_id()?))
    }

    /// Authenticated request, refreshing a stale session id first
    pub(crate) fn request<T: DeserializeOwned>(
        &mut self,
        request: ApiRequest,
    ) -> Result<T, ClassChartsError> {
        self.ensure_authenticated()?;
        if self.session.needs_refresh(self.ping_interval, Instant::now()) {
            log::debug!("Session ID is older than {:?}, revalidating", self.ping_interval);
            self.refresh_session_id()?;
        }
        self.send(&request)
    }

    fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ClassChartsError> {
        self.transport.execute(self.api_base, &self.session, request)
    }

    fn ping_request() -> ApiRequest {
        ApiRequest::post("ping").form(vec![("include_data", "true".to_string())])
    }

    /// Ping for a fresh session id without revalidating first
    pub(crate) fn refresh_session_id(&mut self) -> Result<(), ClassChartsError> {
        self.ensure_authenticated()?;
        let ping: StudentInfoResponse = self.send(&Self::ping_request())?;
        let session_id = ping
            .meta
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClassChartsError::authentication("Ping did not return a session ID"))?;
        self.session.record_ping(session_id, Instant::now());
        Ok(())
    }
}

/// Endpoints available to both parents and students
///
/// Implemented by [`ParentClient`] and [`StudentClient`]; bring it into scope
/// (or use [`crate::prelude`]) to call the shared methods.
///
/// Every method except [`login`](Self::login) fails with
/// [`ClassChartsError::NoSession`] until a login succeeds.
pub trait ClassChartsClient {
    /// Authenticate with ClassCharts
    ///
    /// On failure the client is left logged out.
    fn login(&mut self) -> Result<(), ClassChartsError>;

    #[doc(hidden)]
    fn core(&self) -> &ClientCore;

    #[doc(hidden)]
    fn core_mut(&mut self) -> &mut ClientCore;

    /// Forget the session locally; no request is made
    fn logout(&mut self) {
        self.core_mut().session.clear();
    }

    /// Whether a login has succeeded and not been undone
    fn is_authenticated(&self) -> bool {
        self.core().is_authenticated()
    }

    /// Revalidate the session id
    ///
    /// Called during login and automatically once the session id is older
    /// than the configured ping interval.
    fn get_new_session_id(&mut self) -> Result<(), ClassChartsError> {
        self.core_mut().refresh_session_id()
    }

    /// General information about the current student
    fn get_student_info(&mut self) -> Result<StudentInfoResponse, ClassChartsError> {
        self.core_mut().request(ClientCore::ping_request())
    }

    /// A single page of the current student's activity
    ///
    /// Used for pagination; see [`get_full_activity`](Self::get_full_activity).
    fn get_activity(&mut self, options: &ActivityOptions) -> Result<ActivityResponse, ClassChartsError> {
        let core = self.core_mut();
        let path = core.pupil_path("activity")?;
        core.request(ApiRequest::get(path).query(options.to_query()))
    }

    /// All activity between two dates, following the `last_id` cursor
    ///
    /// Pages are concatenated in the order the API returns them. Stops on an
    /// empty page, or when a page ends on the cursor it was requested with.
    fn get_full_activity(
        &mut self,
        options: &FullActivityOptions,
    ) -> Result<Vec<ActivityPoint>, ClassChartsError> {
        let mut page_options = options.first_page()?;
        let mut points = Vec::new();

        loop {
            let fragment = self.get_activity(&page_options)?.data;
            let Some(last) = fragment.last() else {
                break;
            };
            if page_options.last_id == Some(last.id) {
                log::warn!("Activity cursor did not advance past {}, stopping", last.id);
                break;
            }
            page_options.last_id = Some(last.id);
            points.extend(fragment);
        }

        Ok(points)
    }

    /// The current student's behaviour
    fn get_behaviour(&mut self, options: &BehaviourOptions) -> Result<BehaviourResponse, ClassChartsError> {
        let core = self.core_mut();
        let path = core.pupil_path("behaviour")?;
        core.request(ApiRequest::get(path).query(options.to_query()))
    }

    /// The current student's homework
    fn get_homeworks(&mut self, options: &HomeworkOptions) -> Result<HomeworksResponse, ClassChartsError> {
        let core = self.core_mut();
        let path = core.pupil_path("homeworks")?;
        core.request(ApiRequest::get(path).query(options.to_query()))
    }

    /// The current student's lessons on a given date
    ///
    /// Fails with [`ClassChartsError::Validation`] if no date is specified.
    fn get_lessons(&mut self, options: &LessonsOptions) -> Result<LessonsResponse, ClassChartsError> {
        let query = options.to_query()?;
        let core = self.core_mut();
        let path = core.pupil_path("timetable")?;
        core.request(ApiRequest::get(path).query(query))
    }

    /// The current student's earned badges
    fn get_badges(&mut self) -> Result<BadgesResponse, ClassChartsError> {
        let core = self.core_mut();
        let path = core.pupil_path("eventbadges")?;
        core.request(ApiRequest::get(path))
    }

    /// The current student's announcements
    fn get_announcements(&mut self) -> Result<AnnouncementsResponse, ClassChartsError> {
        let core = self.core_mut();
        let path = core.pupil_path("announcements")?;
        core.request(ApiRequest::get(path))
    }

    /// The current student's detentions
    fn get_detentions(&mut self) -> Result<DetentionsResponse, ClassChartsError> {
        let core = self.core_mut();
        let path = core.pupil_path("detentions")?;
        core.request(ApiRequest::get(path))
    }

    /// The current student's attendance between two dates
    ///
    /// Fails with [`ClassChartsError::Validation`] unless both dates are set
    /// and in order.
    fn get_attendance(&mut self, options: &AttendanceOptions) -> Result<AttendanceResponse, ClassChartsError> {
        let query = options.to_query()?;
        let core = self.core_mut();
        let path = core.pupil_path("attendance")?;
        core.request(ApiRequest::get(path).query(query))
    }

    /// The current student's custom pupil fields
    fn get_pupil_fields(&mut self) -> Result<PupilFieldsResponse, ClassChartsError> {
        let core = self.core_mut();
        let path = core.pupil_path("customfields")?;
        core.request(ApiRequest::get(path))
    }
}

/// Builder for configuring a [`ParentClient`] or [`StudentClient`]
///
/// Redirects are always disabled, whatever client builder is supplied: login
/// success is signalled by a 302 that has to be observed, not followed.
///
/// # Example
///
/// ```no_run
/// use classcharts_client::ClassChartsBuilder;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ClassChartsBuilder::new()
///     .base_url("http://localhost:1234")?
///     .client_builder(
///         reqwest::blocking::Client::builder()
///             .timeout(Duration::from_secs(10))
///     )
///     .parent("parent@example.com", "hunter2")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClassChartsBuilder {
    base_url: Option<reqwest::Url>,
    client_builder: Option<reqwest::blocking::ClientBuilder>,
    ping_interval: Duration,
}

impl ClassChartsBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            base_url: None,
            client_builder: None,
            ping_interval: DEFAULT_PING_INTERVAL,
        }
    }

    /// Set a custom base URL, e.g. a mock server
    ///
    /// # Errors
    ///
    /// Returns `ClassChartsError::ClientInit` if the URL cannot be parsed.
    pub fn base_url(mut self, url: impl reqwest::IntoUrl) -> Result<Self, ClassChartsError> {
        let url = url
            .into_url()
            .map_err(|e| ClassChartsError::ClientInit(e.to_string()))?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Set a custom HTTP client builder (timeouts, proxies, ...)
    pub fn client_builder(mut self, builder: reqwest::blocking::ClientBuilder) -> Self {
        self.client_builder = Some(builder);
        self
    }

    /// Set how long a session id is trusted before it is refreshed
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    fn build_core(self, api_base: &'static str) -> Result<ClientCore, ClassChartsError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => reqwest::Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| ClassChartsError::ClientInit(e.to_string()))?,
        };

        let builder = self
            .client_builder
            .unwrap_or_else(|| reqwest::blocking::Client::builder().use_rustls_tls());

        let client = builder
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClassChartsError::ClientInit(e.to_string()))?;

        Ok(ClientCore {
            transport: Transport::new(client, base_url),
            api_base,
            ping_interval: self.ping_interval,
            session: Session::default(),
        })
    }

    /// Build a client for a parent account
    ///
    /// The password is moved into zeroizing storage.
    pub fn parent(
        self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<ParentClient, ClassChartsError> {
        let core = self.build_core(ParentClient::API_BASE)?;
        Ok(ParentClient::from_core(core, email.into(), password.into()))
    }

    /// Build a client for a student account
    ///
    /// The student code is moved into zeroizing storage.
    pub fn student(
        self,
        student_code: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Result<StudentClient, ClassChartsError> {
        let core = self.build_core(StudentClient::API_BASE)?;
        Ok(StudentClient::from_core(core, student_code.into(), date_of_birth))
    }
}

impl Default for ClassChartsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
