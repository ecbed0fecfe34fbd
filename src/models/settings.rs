// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_COMPANY_NAME: &str = "Company Name";
pub const DEFAULT_PRIMARY_COLOR: &str = "#0d9488";
pub const DEFAULT_ACCENT_COLOR: &str = "#14b8a6";
pub const DEFAULT_CURRENCY: &str = "USD";

/// Company and rendering settings, stored as one JSON document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[schema(example = "Acme Builders")]
    pub company_name: Option<String>,

    // Local image file drawn in the payslip header
    #[schema(example = "./assets/logo.png")]
    pub company_logo_path: Option<String>,

    #[schema(example = "#0d9488")]
    pub pdf_primary_color: Option<String>,

    #[schema(example = "#14b8a6")]
    pub pdf_accent_color: Option<String>,

    #[schema(example = "USD")]
    pub currency: Option<String>,
}

impl Settings {
    pub fn company_name(&self) -> &str {
        self.company_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_COMPANY_NAME)
    }

    pub fn primary_color(&self) -> &str {
        self.pdf_primary_color.as_deref().unwrap_or(DEFAULT_PRIMARY_COLOR)
    }

    pub fn accent_color(&self) -> &str {
        self.pdf_accent_color.as_deref().unwrap_or(DEFAULT_ACCENT_COLOR)
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    /// Symbol printed before amounts; unknown codes print the code itself.
    pub fn currency_symbol(&self) -> String {
        match self.currency() {
            "USD" | "CAD" | "AUD" | "JMD" | "TTD" => "$".to_string(),
            "EUR" => "€".to_string(),
            "GBP" => "£".to_string(),
            other => format!("{} ", other),
        }
    }
}
