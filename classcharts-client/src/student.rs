//! Student persona

use crate::client::{ClassChartsBuilder, ClassChartsClient, ClientCore};
use crate::error::ClassChartsError;
use crate::options::StudentCodeOptions;
use crate::session::read_login_grant;
use crate::transport::ApiRequest;
use crate::types::{RewardPurchaseResponse, RewardsResponse, StudentCodeResponse};
use chrono::NaiveDate;
use std::fmt;
use zeroize::Zeroizing;

/// Client for a student account
///
/// Students log in with their ClassCharts code and date of birth.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use classcharts_client::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let date_of_birth = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
/// let mut client = StudentClient::new("ABCD1234", date_of_birth)?;
/// client.login()?;
///
/// let rewards = client.get_rewards()?;
/// println!("Balance: {}", rewards.meta.pupil_score_balance);
/// # Ok(())
/// # }
/// ```
pub struct StudentClient {
    core: ClientCore,
    student_code: Zeroizing<String>,
    date_of_birth: NaiveDate,
}

impl StudentClient {
    pub(crate) const API_BASE: &'static str = "apiv2student";

    /// Create a student client against the public ClassCharts site
    ///
    /// # Errors
    ///
    /// Returns `ClassChartsError::ClientInit` if the HTTP client cannot be initialized.
    pub fn new(student_code: impl Into<String>, date_of_birth: NaiveDate) -> Result<Self, ClassChartsError> {
        ClassChartsBuilder::new().student(student_code, date_of_birth)
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClassChartsBuilder {
        ClassChartsBuilder::new()
    }

    pub(crate) fn from_core(core: ClientCore, student_code: String, date_of_birth: NaiveDate) -> Self {
        Self {
            core,
            student_code: Zeroizing::new(student_code),
            date_of_birth,
        }
    }

    fn try_login(&mut self) -> Result<(), ClassChartsError> {
        if self.student_code.is_empty() {
            return Err(ClassChartsError::validation("Student Code not provided"));
        }

        let code = Zeroizing::new(self.student_code.to_uppercase());
        let dob = self.date_of_birth.format("%d/%m/%Y").to_string();
        let form = [
            ("_method", "POST"),
            ("code", code.as_str()),
            ("dob", dob.as_str()),
            ("remember_me", "1"),
            ("recaptcha-token", "no-token-available"),
        ];
        let response = self.core.transport().post_login("student", &form)?;
        let grant = read_login_grant(&response, "student_session_credentials")?;

        self.core.session.session_id = Zeroizing::new(grant.session_id);
        self.core.session.auth_cookies = grant.cookies.into_iter().map(Zeroizing::new).collect();

        self.get_new_session_id()?;
        let info = self.get_student_info()?;
        self.core.session.student_id = Some(info.data.user.id);
        log::info!("Logged in as student {}", info.data.user.id);
        Ok(())
    }

    /// Items in the current student's rewards shop
    pub fn get_rewards(&mut self) -> Result<RewardsResponse, ClassChartsError> {
        let path = self.core.pupil_path("rewards")?;
        self.core.request(ApiRequest::get(path))
    }

    /// Purchase an item from the current student's rewards shop
    ///
    /// The shop is checked first, so no purchase is attempted for an item
    /// that does not exist or that ClassCharts reports as not purchasable.
    ///
    /// # Errors
    ///
    /// `ClassChartsError::Validation` if the item is unknown or
    /// `can_purchase` is false (the message carries the upstream reason).
    pub fn purchase_reward(&mut self, item_id: i64) -> Result<RewardPurchaseResponse, ClassChartsError> {
        let rewards = self.get_rewards()?;
        let reward = rewards
            .data
            .iter()
            .find(|reward| reward.id == item_id)
            .ok_or_else(|| ClassChartsError::validation(format!("No reward with ID {} found", item_id)))?;

        if !reward.can_purchase {
            let reason = if reward.unable_to_purchase_reason.is_empty() {
                "not purchasable"
            } else {
                reward.unable_to_purchase_reason.as_str()
            };
            return Err(ClassChartsError::validation(format!(
                "Reward {} cannot be purchased: {}",
                item_id, reason
            )));
        }

        let pupil_id = self.core.require_student_id()?;
        self.core.request(
            ApiRequest::post(format!("purchase/{}", item_id))
                .form(vec![("pupil_id", pupil_id.to_string())]),
        )
    }

    /// Look up the current student's login code
    ///
    /// # Errors
    ///
    /// `ClassChartsError::Validation` if `date_of_birth` is not set.
    pub fn get_student_code(
        &mut self,
        options: &StudentCodeOptions,
    ) -> Result<StudentCodeResponse, ClassChartsError> {
        let form = options.to_form()?;
        self.core.request(ApiRequest::post("getcode").form(form))
    }
}

impl ClassChartsClient for StudentClient {
    fn login(&mut self) -> Result<(), ClassChartsError> {
        let result = self.try_login();
        if result.is_err() {
            self.core.session.clear();
        }
        result
    }

    fn core(&self) -> &ClientCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ClientCore {
        &mut self.core
    }
}

impl fmt::Debug for StudentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentClient")
            .field("core", &self.core)
            .field("date_of_birth", &self.date_of_birth)
            .finish_non_exhaustive()
    }
}
