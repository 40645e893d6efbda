//! Configuration
//!
//! Explicit widget configuration, replacing the implicit environment lookups
//! of the original widget. Loaded from YAML; every field has a default
//! matching the original deployment so a minimal file only needs the
//! delivery identities.

use std::{fs, path::Path};

use rusty_money::iso::{self, Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{delivery::DeliveryConfig, render::BackendKind};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Column labels of the itemised order table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableLabels {
    /// Variant column label.
    pub variant: String,

    /// Quantity column label.
    pub qty: String,

    /// Unit price column label.
    pub price: String,

    /// Line total column label.
    pub total: String,

    /// Label of the trailing grand-total row.
    pub grand_total: String,
}

impl Default for TableLabels {
    fn default() -> Self {
        TableLabels {
            variant: "Вариант".to_string(),
            qty: "Кол-во".to_string(),
            price: "Цена".to_string(),
            total: "Стоимость".to_string(),
            grand_total: "Итого:".to_string(),
        }
    }
}

/// One colour stop of the background gradient.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GradientStop {
    /// Position of the stop in `0.0..=1.0`.
    pub offset: f32,

    /// Stop colour as a `#rrggbb` string.
    pub color: String,
}

/// Branding and localisation of the generated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    /// URL of the business logo, resolved to bytes at composition time.
    pub logo_url: String,

    /// Contact lines rendered right-aligned next to the logo.
    pub contact_lines: Vec<String>,

    /// Document heading.
    pub heading: String,

    /// Label in front of the customer name.
    pub name_label: String,

    /// Label in front of the customer email.
    pub email_label: String,

    /// Label in front of the order date.
    pub date_label: String,

    /// Table column labels.
    pub labels: TableLabels,

    /// ISO currency code used for the monetary suffix.
    pub currency: String,

    /// `chrono` format string for the order date.
    pub date_format: String,

    /// Background gradient stops, top to bottom.
    pub gradient: Vec<GradientStop>,

    /// Height of the background gradient band in document points.
    pub gradient_height: u32,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        BrandingConfig {
            logo_url: "https://static.tildacdn.com/tild6261-6433-4230-a362-373032656562/logo.png"
                .to_string(),
            contact_lines: vec![
                "+7 (917) 535-34-33".to_string(),
                "Владимир".to_string(),
                "Г. Москва, ул.Красного Маяка 22к5".to_string(),
            ],
            heading: "Заказ".to_string(),
            name_label: "Имя".to_string(),
            email_label: "Email".to_string(),
            date_label: "Дата".to_string(),
            labels: TableLabels::default(),
            currency: "RUB".to_string(),
            date_format: "%d.%m.%Y".to_string(),
            gradient: vec![
                GradientStop {
                    offset: 0.0,
                    color: "#000000".to_string(),
                },
                GradientStop {
                    offset: 0.5,
                    color: "#001f46".to_string(),
                },
                GradientStop {
                    offset: 1.0,
                    color: "#00132e".to_string(),
                },
            ],
            gradient_height: 200,
        }
    }
}

impl BrandingConfig {
    /// Resolves the configured currency code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] when the code is not a known
    /// ISO currency.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        iso::find(&self.currency).ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }
}

/// Complete widget configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetConfig {
    /// Branding and localisation.
    #[serde(default)]
    pub branding: BrandingConfig,

    /// Delivery identities for the outbound notification channels.
    pub delivery: DeliveryConfig,

    /// Which document backend renders the order document.
    #[serde(default)]
    pub backend: BackendKind,

    /// Filename used when saving the rendered document.
    #[serde(default = "default_download_filename")]
    pub download_filename: String,
}

fn default_download_filename() -> String {
    "document.pdf".to_string()
}

impl WidgetConfig {
    /// Parses a configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] when the YAML does not match the
    /// configuration shape.
    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Reads a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Yaml`] when it does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path)?;

        Self::from_str(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use testresult::TestResult;

    use super::*;

    const MINIMAL: &str = r"
delivery:
  service_id: svc_1
  owner_template_id: tpl_owner
  public_key: pk_test
  owner_email: owner@studio.example
";

    #[test]
    fn minimal_config_gets_defaults() -> TestResult {
        let config = WidgetConfig::from_str(MINIMAL)?;

        assert_eq!(config.branding.heading, "Заказ");
        assert_eq!(config.branding.currency, "RUB");
        assert_eq!(config.download_filename, "document.pdf");
        assert_eq!(config.backend, BackendKind::ContentTree);
        assert!(config.delivery.customer_template_id.is_none());

        Ok(())
    }

    #[test]
    fn overrides_are_honoured() -> TestResult {
        let yaml = format!(
            "{MINIMAL}
backend: text
download_filename: order.pdf
branding:
  heading: Order
  currency: USD
"
        );

        let config = WidgetConfig::from_str(&yaml)?;

        assert_eq!(config.backend, BackendKind::Text);
        assert_eq!(config.download_filename, "order.pdf");
        assert_eq!(config.branding.heading, "Order");
        assert_eq!(config.branding.currency()?.iso_alpha_code, "USD");

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected_on_resolution() -> TestResult {
        let yaml = format!(
            "{MINIMAL}
branding:
  currency: ZZZ
"
        );

        let config = WidgetConfig::from_str(&yaml)?;

        assert!(matches!(
            config.branding.currency(),
            Err(ConfigError::UnknownCurrency(code)) if code == "ZZZ"
        ));

        Ok(())
    }

    #[test]
    fn from_path_round_trips() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(MINIMAL.as_bytes())?;

        let config = WidgetConfig::from_path(file.path())?;

        assert_eq!(config.delivery.service_id, "svc_1");

        Ok(())
    }

    #[test]
    fn missing_delivery_section_is_an_error() {
        assert!(matches!(
            WidgetConfig::from_str("branding: {}"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
