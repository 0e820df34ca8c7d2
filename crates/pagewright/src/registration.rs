//! Registration data record.
//!
//! A [`RegisterData`] is the only structured input the page objects accept.
//! Required fields are always present and non-empty; optional fields are
//! either absent or non-empty. The date of birth is a compound optional: it is
//! supplied as a full day/month/year triple or not at all, and a partial triple
//! is rejected when the record is built, so the registration page never has to
//! decide what to do with one.
//!
//! Records come from [`RegisterData::builder`] or from camelCase JSON/YAML:
//!
//! ```yaml
//! name: Filip
//! email: filip@example.test
//! password: s3cret
//! title: Mr
//! firstName: Filip
//! lastName: Novak
//! dateOfBirth: { day: "1", month: "January", year: "1990" }
//! address: Main Street 1
//! country: Canada
//! state: Ontario
//! city: Toronto
//! zipcode: M5H 2N2
//! mobileNumber: "5551234"
//! ```

use crate::result::{PagewrightError, PagewrightResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Form of address picked by a radio button on the account form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Title {
    /// `Mr.`
    Mr,
    /// `Mrs.`
    Mrs,
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mr => write!(f, "Mr"),
            Self::Mrs => write!(f, "Mrs"),
        }
    }
}

/// A complete date of birth, as the three select values of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateParts")]
pub struct DateOfBirth {
    day: String,
    month: String,
    year: String,
}

impl DateOfBirth {
    /// Build a date; every part must be non-empty
    pub fn new(
        day: impl Into<String>,
        month: impl Into<String>,
        year: impl Into<String>,
    ) -> PagewrightResult<Self> {
        DateParts {
            day: Some(day.into()),
            month: Some(month.into()),
            year: Some(year.into()),
        }
        .try_into()
    }

    /// Day select value
    #[must_use]
    pub fn day(&self) -> &str {
        &self.day
    }

    /// Month select value
    #[must_use]
    pub fn month(&self) -> &str {
        &self.month
    }

    /// Year select value
    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }
}

/// Date parts as supplied, before the full-or-absent check
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct DateParts {
    day: Option<String>,
    month: Option<String>,
    year: Option<String>,
}

impl TryFrom<DateParts> for DateOfBirth {
    type Error = PagewrightError;

    fn try_from(parts: DateParts) -> PagewrightResult<Self> {
        let missing: Vec<&str> = [
            ("day", &parts.day),
            ("month", &parts.month),
            ("year", &parts.year),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, is_blank))
        .map(|(name, _)| name)
        .collect();

        match (parts.day, parts.month, parts.year) {
            (Some(day), Some(month), Some(year)) if missing.is_empty() => {
                Ok(Self { day, month, year })
            }
            _ => Err(PagewrightError::invalid_record(format!(
                "dateOfBirth must supply day, month and year together (missing {})",
                missing.join(", ")
            ))),
        }
    }
}

/// Validated registration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RegisterDataBuilder")]
pub struct RegisterData {
    name: String,
    email: String,
    password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<Title>,
    first_name: String,
    last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<DateOfBirth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address2: Option<String>,
    country: String,
    state: String,
    city: String,
    zipcode: String,
    mobile_number: String,
}

impl RegisterData {
    /// Start building a record
    #[must_use]
    pub fn builder() -> RegisterDataBuilder {
        RegisterDataBuilder::default()
    }

    /// Parse a camelCase JSON record
    pub fn from_json(json: &str) -> PagewrightResult<Self> {
        let raw: RegisterDataBuilder = serde_json::from_str(json)?;
        raw.build()
    }

    /// Parse a camelCase YAML record
    pub fn from_yaml(yaml: &str) -> PagewrightResult<Self> {
        let raw: RegisterDataBuilder = serde_yaml_ng::from_str(yaml)?;
        raw.build()
    }

    /// Load a record file; `.json` is parsed as JSON, anything else as YAML
    pub fn from_path(path: &Path) -> PagewrightResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }

    /// Display name entered on the signup form
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signup email
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Account password
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Title, if one should be selected
    #[must_use]
    pub const fn title(&self) -> Option<Title> {
        self.title
    }

    /// First name
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Last name
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Date of birth, if one should be selected
    #[must_use]
    pub const fn date_of_birth(&self) -> Option<&DateOfBirth> {
        self.date_of_birth.as_ref()
    }

    /// Company
    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// First address line
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Second address line
    #[must_use]
    pub fn address2(&self) -> Option<&str> {
        self.address2.as_deref()
    }

    /// Country option label
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// State
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// City
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Zipcode
    #[must_use]
    pub fn zipcode(&self) -> &str {
        &self.zipcode
    }

    /// Mobile number
    #[must_use]
    pub fn mobile_number(&self) -> &str {
        &self.mobile_number
    }
}

/// Builder for [`RegisterData`]; also the shape records are read in
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDataBuilder {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    title: Option<Title>,
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<DateParts>,
    company: Option<String>,
    address: Option<String>,
    address2: Option<String>,
    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
    zipcode: Option<String>,
    mobile_number: Option<String>,
}

impl RegisterDataBuilder {
    /// Set name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set email
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set password
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set title
    #[must_use]
    pub const fn title(mut self, title: Title) -> Self {
        self.title = Some(title);
        self
    }

    /// Set first name
    #[must_use]
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Set last name
    #[must_use]
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Set the full date of birth
    #[must_use]
    pub fn date_of_birth(
        mut self,
        day: impl Into<String>,
        month: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        self.date_of_birth = Some(DateParts {
            day: Some(day.into()),
            month: Some(month.into()),
            year: Some(year.into()),
        });
        self
    }

    /// Set company
    #[must_use]
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set first address line
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set second address line
    #[must_use]
    pub fn address2(mut self, address2: impl Into<String>) -> Self {
        self.address2 = Some(address2.into());
        self
    }

    /// Set country
    #[must_use]
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Set state
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Set city
    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set zipcode
    #[must_use]
    pub fn zipcode(mut self, zipcode: impl Into<String>) -> Self {
        self.zipcode = Some(zipcode.into());
        self
    }

    /// Set mobile number
    #[must_use]
    pub fn mobile_number(mut self, mobile_number: impl Into<String>) -> Self {
        self.mobile_number = Some(mobile_number.into());
        self
    }

    /// Validate and build the record.
    ///
    /// Reports the first required field that is missing or blank, then any
    /// optional field that is present but blank, then a partial date of birth.
    pub fn build(self) -> PagewrightResult<RegisterData> {
        Ok(RegisterData {
            name: required("name", self.name)?,
            email: required("email", self.email)?,
            password: required("password", self.password)?,
            first_name: required("firstName", self.first_name)?,
            last_name: required("lastName", self.last_name)?,
            address: required("address", self.address)?,
            country: required("country", self.country)?,
            state: required("state", self.state)?,
            city: required("city", self.city)?,
            zipcode: required("zipcode", self.zipcode)?,
            mobile_number: required("mobileNumber", self.mobile_number)?,
            company: optional("company", self.company)?,
            address2: optional("address2", self.address2)?,
            title: self.title,
            date_of_birth: self.date_of_birth.map(DateOfBirth::try_from).transpose()?,
        })
    }
}

impl TryFrom<RegisterDataBuilder> for RegisterData {
    type Error = PagewrightError;

    fn try_from(builder: RegisterDataBuilder) -> PagewrightResult<Self> {
        builder.build()
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn required(field: &str, value: Option<String>) -> PagewrightResult<String> {
    match value {
        Some(v) if !is_blank(&v) => Ok(v),
        Some(_) => Err(PagewrightError::invalid_record(format!("{field} must not be empty"))),
        None => Err(PagewrightError::invalid_record(format!("missing field {field}"))),
    }
}

fn optional(field: &str, value: Option<String>) -> PagewrightResult<Option<String>> {
    match value {
        Some(v) if is_blank(&v) => Err(PagewrightError::invalid_record(format!(
            "{field} must be omitted rather than empty"
        ))),
        other => Ok(other),
    }
}
