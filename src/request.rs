//! # Analysis Request Validation
//!
//! Turns raw form fields into an [`AnalysisRequest`]. Validation runs before any
//! network work, so a rejected request never reaches the scraper or the
//! completion service.
//!
//! Missing or unparseable fields are reported as request-shape failures, while
//! present-but-unacceptable values (blank names, non-positive prices) are reported
//! as invalid values. A company URL that fails the URL grammar is reported as
//! [`Error::InvalidUrl`].

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::error::{Error, Result};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .expect("URL pattern must compile")
});

/// Validation failures for request fields
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was not supplied at all
    #[error("field `{field}` is required")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// A field was supplied but could not be parsed
    #[error("field `{field}` is malformed: {reason}")]
    Malformed {
        /// Name of the malformed field
        field: String,
        /// What went wrong while parsing
        reason: String,
    },

    /// A field parsed but its value is not acceptable
    #[error("{field}: {message}")]
    Invalid {
        /// Name of the offending field
        field: String,
        /// Human readable explanation
        message: String,
    },
}

impl ValidationError {
    /// Name of the field this error refers to
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::Malformed { field, .. }
            | ValidationError::Invalid { field, .. } => field,
        }
    }

    /// Whether the request shape itself was wrong rather than a value
    pub fn is_schema_error(&self) -> bool {
        !matches!(self, ValidationError::Invalid { .. })
    }

    pub(crate) fn invalid(field: &str, message: &str) -> Self {
        ValidationError::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// An uploaded attachment. Its bytes are read but not analysed.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    /// Client supplied file name
    pub filename: String,

    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Raw, unvalidated analysis form as received from a client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisForm {
    pub product_name: Option<String>,
    pub product_description: Option<String>,
    pub price: Option<String>,
    pub company_url: Option<String>,
    pub competitors: Option<String>,
    pub additional_notes: Option<String>,
    pub company_id: Option<String>,
    pub product_id: Option<String>,
    pub file: Option<UploadedFile>,
}

impl AnalysisForm {
    /// Set a text field by its wire name. Returns `false` for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "productName" => &mut self.product_name,
            "productDescription" => &mut self.product_description,
            "price" => &mut self.price,
            "companyUrl" => &mut self.company_url,
            "competitors" => &mut self.competitors,
            "additionalNotes" => &mut self.additional_notes,
            "companyId" => &mut self.company_id,
            "productId" => &mut self.product_id,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// A validated analysis request
///
/// Only [`validate_request`] constructs this type, so holding one means every
/// field rule has already been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    product_name: String,
    product_description: String,
    price: f64,
    company_url: String,
    competitors: Option<String>,
    additional_notes: Option<String>,
    company_id: Option<String>,
    product_id: Option<String>,
    file: Option<UploadedFile>,
}

impl AnalysisRequest {
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_description(&self) -> &str {
        &self.product_description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn company_url(&self) -> &str {
        &self.company_url
    }

    /// Competitor hosts, one per non-blank line
    pub fn competitor_hosts(&self) -> Vec<&str> {
        self.competitors
            .as_deref()
            .map(|c| {
                c.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn additional_notes(&self) -> Option<&str> {
        self.additional_notes.as_deref()
    }

    pub fn company_id(&self) -> Option<&str> {
        self.company_id.as_deref()
    }

    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }
}

/// Check a URL against the accepted absolute-URL grammar
///
/// Accepts `http`/`https` URLs whose host is a domain name, `localhost` or a
/// dotted-quad IPv4 address, with an optional port and path/query.
pub fn validate_url(url: &str) -> bool {
    URL_PATTERN.is_match(url)
}

/// Validate a raw form into an [`AnalysisRequest`]
pub fn validate_request(form: AnalysisForm) -> Result<AnalysisRequest> {
    let product_name = require(form.product_name, "productName")?;
    if product_name.is_empty() {
        return Err(ValidationError::invalid("productName", "Product name is required").into());
    }

    let product_description = require(form.product_description, "productDescription")?;
    if product_description.is_empty() {
        return Err(ValidationError::invalid(
            "productDescription",
            "Product description is required",
        )
        .into());
    }

    let price = parse_price(&require(form.price, "price")?)?;

    let company_url = require(form.company_url, "companyUrl")?;
    if company_url.is_empty() {
        return Err(ValidationError::invalid("companyUrl", "Company URL is required").into());
    }
    if !validate_url(&company_url) {
        return Err(Error::InvalidUrl(company_url));
    }

    Ok(AnalysisRequest {
        product_name,
        product_description,
        price,
        company_url,
        competitors: optional(form.competitors),
        additional_notes: optional(form.additional_notes),
        company_id: optional(form.company_id),
        product_id: optional(form.product_id),
        file: form.file,
    })
}

fn require(value: Option<String>, field: &str) -> std::result::Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .ok_or_else(|| ValidationError::MissingField {
            field: field.to_string(),
        })
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_price(raw: &str) -> std::result::Result<f64, ValidationError> {
    let price: f64 = raw.parse().map_err(|e| ValidationError::Malformed {
        field: "price".to_string(),
        reason: format!("{}", e),
    })?;
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::invalid("price", "Valid price is required"));
    }
    Ok(price)
}
