//! Parent persona

use crate::client::{ClassChartsBuilder, ClassChartsClient, ClientCore};
use crate::error::ClassChartsError;
use crate::session::read_login_grant;
use crate::transport::ApiRequest;
use crate::types::{ChangePasswordResponse, Pupil, PupilsResponse};
use std::fmt;
use zeroize::Zeroizing;

/// Client for a parent account
///
/// A parent can see every pupil attached to the account. Login selects the
/// first one; switch with [`select_pupil`](Self::select_pupil).
///
/// # Example
///
/// ```no_run
/// use classcharts_client::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = ParentClient::new("parent@example.com", "hunter2")?;
/// client.login()?;
///
/// for pupil in client.pupils() {
///     println!("{} ({})", pupil.name(), pupil.id());
/// }
///
/// let homework = client.get_homeworks(&HomeworkOptions::default())?;
/// println!("{} homework task(s)", homework.data.len());
/// # Ok(())
/// # }
/// ```
pub struct ParentClient {
    core: ClientCore,
    email: String,
    password: Zeroizing<String>,
    pupils: Vec<Pupil>,
}

impl ParentClient {
    pub(crate) const API_BASE: &'static str = "apiv2parent";

    /// Create a parent client against the public ClassCharts site
    ///
    /// # Errors
    ///
    /// Returns `ClassChartsError::ClientInit` if the HTTP client cannot be initialized.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, ClassChartsError> {
        ClassChartsBuilder::new().parent(email, password)
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClassChartsBuilder {
        ClassChartsBuilder::new()
    }

    pub(crate) fn from_core(core: ClientCore, email: String, password: String) -> Self {
        Self {
            core,
            email,
            password: Zeroizing::new(password),
            pupils: Vec::new(),
        }
    }

    /// Pupils fetched during login (or by the last [`get_pupils`](Self::get_pupils))
    pub fn pupils(&self) -> &[Pupil] {
        &self.pupils
    }

    fn try_login(&mut self) -> Result<(), ClassChartsError> {
        if self.email.is_empty() {
            return Err(ClassChartsError::validation("Email not provided"));
        }
        if self.password.is_empty() {
            return Err(ClassChartsError::validation("Password not provided"));
        }

        let form = [
            ("_method", "POST"),
            ("email", self.email.as_str()),
            ("logintype", "existing"),
            ("password", self.password.as_str()),
            ("recaptcha-token", "no-token-available"),
        ];
        let response = self.core.transport().post_login("parent", &form)?;
        let grant = read_login_grant(&response, "parent_session_credentials")?;

        self.core.session.session_id = Zeroizing::new(grant.session_id);

        let pupils = self.get_pupils()?;
        let first = pupils
            .first()
            .ok_or_else(|| ClassChartsError::validation("Account has no pupils attached"))?;
        self.core.session.student_id = Some(first.id());
        log::info!(
            "Logged in as parent with {} pupil(s), selected pupil {}",
            pupils.len(),
            first.id()
        );
        Ok(())
    }

    /// Pupils connected to this parent's account
    ///
    /// Also refreshes the list [`select_pupil`](Self::select_pupil) checks against.
    /// A selected pupil that is no longer on the account is replaced by the
    /// first pupil in the new list.
    pub fn get_pupils(&mut self) -> Result<Vec<Pupil>, ClassChartsError> {
        let response: PupilsResponse = self.core.request(ApiRequest::get("pupils"))?;
        self.pupils = response.data.clone();

        if let Some(selected) = self.core.session.student_id
            && !self.pupils.iter().any(|pupil| pupil.id() == selected)
        {
            let fallback = self.pupils.first().map(Pupil::id);
            log::warn!(
                "Selected pupil {} is no longer on the account, now {:?}",
                selected,
                fallback
            );
            self.core.session.student_id = fallback;
        }
        Ok(response.data)
    }

    /// Select the pupil used by subsequent requests
    ///
    /// # Errors
    ///
    /// `ClassChartsError::Validation` if the id is 0 or is not one of
    /// [`pupils`](Self::pupils).
    pub fn select_pupil(&mut self, pupil_id: i64) -> Result<(), ClassChartsError> {
        if pupil_id == 0 {
            return Err(ClassChartsError::validation("No pupil ID specified"));
        }

        let pupil = self
            .pupils
            .iter()
            .find(|pupil| pupil.id() == pupil_id)
            .ok_or_else(|| ClassChartsError::validation("No pupil with specified ID found"))?;

        self.core.session.student_id = Some(pupil.id());
        log::info!("Selected pupil {}", pupil_id);
        Ok(())
    }

    /// Change the login password of this parent account
    ///
    /// The client keeps using the password it was built with; create a new
    /// client to log in with the new one.
    pub fn change_password(
        &mut self,
        current_password: &str,
        new_password: &str,
    ) -> Result<ChangePasswordResponse, ClassChartsError> {
        if new_password.is_empty() {
            return Err(ClassChartsError::validation("New password not provided"));
        }

        let form = vec![
            ("current", current_password.to_string()),
            ("new", new_password.to_string()),
            ("repeat", new_password.to_string()),
        ];
        self.core.request(ApiRequest::post("password").form(form))
    }
}

impl ClassChartsClient for ParentClient {
    fn login(&mut self) -> Result<(), ClassChartsError> {
        let result = self.try_login();
        if result.is_err() {
            self.core.session.clear();
            self.pupils.clear();
        }
        result
    }

    fn core(&self) -> &ClientCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ClientCore {
        &mut self.core
    }

    fn logout(&mut self) {
        self.core.session.clear();
        self.pupils.clear();
    }
}

impl fmt::Debug for ParentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentClient")
            .field("core", &self.core)
            .field("email", &self.email)
            .field("pupils", &self.pupils.len())
            .finish_non_exhaustive()
    }
}
