//! Two-stage account registration.
//!
//! ```text
//! NotStarted ──start_signup──▶ Stage1Submitted ──fill_account_details──▶ Stage2Filled
//!                                                                          │
//!                            click_create_account + is_account_created ◀───┘
//!                                              │
//!                                              ▼
//!                                       AccountCreated
//! ```
//!
//! Stage 1 (name and email) lives on the login screen; stage 2 (account
//! details) on the signup screen that stage 1 leads to. There is no rollback:
//! a failed submission leaves the workflow in `Stage2Filled` and the caller
//! retries [`RegisterPage::click_create_account`] without re-running stage 1.

use crate::driver::BrowserEngine;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::registration::{RegisterData, Title};
use crate::result::{PagewrightError, PagewrightResult};
use crate::session::Session;
use std::fmt;
use tracing::{debug, info, warn};

/// Where a registration currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegistrationStage {
    /// Nothing submitted yet
    #[default]
    NotStarted,
    /// Name and email submitted from the login screen
    Stage1Submitted,
    /// Account-detail form populated
    Stage2Filled,
    /// The "account created" indicator was observed
    AccountCreated,
}

impl fmt::Display for RegistrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Stage1Submitted => "stage 1 submitted",
            Self::Stage2Filled => "stage 2 filled",
            Self::AccountCreated => "account created",
        };
        f.write_str(name)
    }
}

/// Registration workflow (starts on `/login`)
#[derive(Debug)]
pub struct RegisterPage<'s, E: BrowserEngine> {
    session: &'s Session<E>,
    stage: RegistrationStage,
    // stage 1
    signup_name: Locator,
    signup_email: Locator,
    signup_button: Locator,
    // stage 2
    title_mr: Locator,
    title_mrs: Locator,
    password: Locator,
    days: Locator,
    months: Locator,
    years: Locator,
    first_name: Locator,
    last_name: Locator,
    company: Locator,
    address: Locator,
    address2: Locator,
    country: Locator,
    state: Locator,
    city: Locator,
    zipcode: Locator,
    mobile_number: Locator,
    create_account: Locator,
    // after creation
    account_created: Locator,
    continue_button: Locator,
}

impl<'s, E: BrowserEngine> RegisterPage<'s, E> {
    /// Bind the page to a session
    #[must_use]
    pub fn new(session: &'s Session<E>) -> Self {
        Self {
            session,
            stage: RegistrationStage::NotStarted,
            signup_name: Locator::data_qa("signup-name"),
            signup_email: Locator::data_qa("signup-email"),
            signup_button: Locator::data_qa("signup-button"),
            title_mr: Locator::new("#id_gender1").described("title Mr"),
            title_mrs: Locator::new("#id_gender2").described("title Mrs"),
            password: Locator::data_qa("password"),
            days: Locator::data_qa("days"),
            months: Locator::data_qa("months"),
            years: Locator::data_qa("years"),
            first_name: Locator::data_qa("first_name"),
            last_name: Locator::data_qa("last_name"),
            company: Locator::data_qa("company"),
            address: Locator::data_qa("address"),
            address2: Locator::data_qa("address2"),
            country: Locator::data_qa("country"),
            state: Locator::data_qa("state"),
            city: Locator::data_qa("city"),
            zipcode: Locator::data_qa("zipcode"),
            mobile_number: Locator::data_qa("mobile_number"),
            create_account: Locator::data_qa("create-account"),
            account_created: Locator::data_qa("account-created"),
            continue_button: Locator::data_qa("continue-button"),
        }
    }

    /// Current stage
    #[must_use]
    pub const fn stage(&self) -> RegistrationStage {
        self.stage
    }

    /// Stage 1: submit name and email from the login screen
    pub async fn start_signup(&mut self, name: &str, email: &str) -> PagewrightResult<()> {
        self.require(&[RegistrationStage::NotStarted], "start_signup")?;
        info!(name, email, "submitting signup");
        self.session.fill(&self.signup_name, name).await?;
        self.session.fill(&self.signup_email, email).await?;
        self.session.click(&self.signup_button).await?;
        self.advance(RegistrationStage::Stage1Submitted);
        Ok(())
    }

    /// Stage 2: populate the account-detail form from `data`.
    ///
    /// Optional fields are written only when present. Repeating this call
    /// after a successful fill rewrites the form and stays in `Stage2Filled`;
    /// a failure part-way leaves the stage where it was.
    pub async fn fill_account_details(&mut self, data: &RegisterData) -> PagewrightResult<()> {
        self.require(
            &[
                RegistrationStage::Stage1Submitted,
                RegistrationStage::Stage2Filled,
            ],
            "fill_account_details",
        )?;
        let session = self.session;

        match data.title() {
            Some(Title::Mr) => session.check(&self.title_mr).await?,
            Some(Title::Mrs) => session.check(&self.title_mrs).await?,
            None => {}
        }
        session.fill(&self.password, data.password()).await?;
        if let Some(dob) = data.date_of_birth() {
            session.select_option(&self.days, dob.day()).await?;
            session.select_option(&self.months, dob.month()).await?;
            session.select_option(&self.years, dob.year()).await?;
        }
        session.fill(&self.first_name, data.first_name()).await?;
        session.fill(&self.last_name, data.last_name()).await?;
        if let Some(company) = data.company() {
            session.fill(&self.company, company).await?;
        }
        session.fill(&self.address, data.address()).await?;
        if let Some(address2) = data.address2() {
            session.fill(&self.address2, address2).await?;
        }
        session.select_option(&self.country, data.country()).await?;
        session.fill(&self.state, data.state()).await?;
        session.fill(&self.city, data.city()).await?;
        session.fill(&self.zipcode, data.zipcode()).await?;
        session.fill(&self.mobile_number, data.mobile_number()).await?;

        self.advance(RegistrationStage::Stage2Filled);
        Ok(())
    }

    /// Submit the account form.
    ///
    /// Completion is observed with [`is_account_created`](Self::is_account_created),
    /// not inferred from this call succeeding.
    pub async fn click_create_account(&mut self) -> PagewrightResult<()> {
        self.require(&[RegistrationStage::Stage2Filled], "click_create_account")?;
        self.session
            .click(&self.create_account)
            .await
            .map_err(|e| {
                warn!(error = %e, "account submission failed, form stays filled");
                e
            })
    }

    /// Whether the "Account Created!" heading is shown.
    ///
    /// Observing it after a submission completes the workflow.
    pub async fn is_account_created(&mut self) -> PagewrightResult<bool> {
        let created = self.session.is_visible(&self.account_created).await?;
        if created && self.stage == RegistrationStage::Stage2Filled {
            self.advance(RegistrationStage::AccountCreated);
        }
        Ok(created)
    }

    /// Leave the confirmation screen
    pub async fn click_continue(&self) -> PagewrightResult<()> {
        self.session.click(&self.continue_button).await
    }

    /// Run both stages and submit; stops at the first failing step
    pub async fn register(&mut self, data: &RegisterData) -> PagewrightResult<()> {
        self.start_signup(data.name(), data.email()).await?;
        self.fill_account_details(data).await?;
        self.click_create_account().await
    }

    fn require(&self, allowed: &[RegistrationStage], operation: &str) -> PagewrightResult<()> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(PagewrightError::invalid_state(format!(
                "{operation} is not allowed when registration is {}",
                self.stage
            )))
        }
    }

    fn advance(&mut self, next: RegistrationStage) {
        if self.stage != next {
            debug!(from = %self.stage, to = %next, "registration stage");
        }
        self.stage = next;
    }
}

impl<E: BrowserEngine> PageObject for RegisterPage<'_, E> {
    type Engine = E;

    fn session(&self) -> &Session<E> {
        self.session
    }

    fn path(&self) -> &str {
        "/login"
    }

    fn page_name(&self) -> &str {
        "register"
    }
}
