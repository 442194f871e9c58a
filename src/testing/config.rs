//! Scenario fixture configuration
//!
//! Defines the data a scenario run sends to the service: the account, the
//! product to create, the quantity to set, and where each endpoint lives.
//! Every field has a default, so an empty YAML document is a valid scenario.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::common::config::Credentials;
use crate::common::{Error, Result};

/// Placeholder replaced by the product id in the update endpoint
pub const ID_PLACEHOLDER: &str = "{id}";

/// A complete test scenario loaded from a YAML file
#[derive(Deserialize, Debug, Clone)]
pub struct TestScenario {
    /// Name of the test scenario
    #[serde(default = "default_name")]
    pub name: String,
    /// Optional description of what the scenario verifies
    pub description: Option<String>,
    /// Account to register and log in with
    pub credentials: Option<Credentials>,
    /// Product created by the scenario
    #[serde(default)]
    pub product: ProductFixture,
    /// Quantity the product is updated to, and expected in the listing
    #[serde(default = "default_updated_quantity")]
    pub updated_quantity: i64,
    /// Page size requested from the product listing
    pub list_limit: Option<u32>,
    /// Endpoint paths relative to the base URL
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Names of the response fields the steps read
    #[serde(default)]
    pub fields: FieldNames,
}

fn default_name() -> String {
    "Inventory API smoke test".to_string()
}

fn default_updated_quantity() -> i64 {
    15
}

impl Default for TestScenario {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            credentials: None,
            product: ProductFixture::default(),
            updated_quantity: default_updated_quantity(),
            list_limit: None,
            endpoints: Endpoints::default(),
            fields: FieldNames::default(),
        }
    }
}

/// Product payload sent to the create endpoint
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProductFixture {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sku: String,
    pub image_url: String,
    pub description: String,
    /// Initial quantity
    pub quantity: i64,
    pub price: f64,
}

impl Default for ProductFixture {
    fn default() -> Self {
        Self {
            name: "Phone".to_string(),
            kind: "Electronics".to_string(),
            sku: "PHN-001".to_string(),
            image_url: "https://example.com/phone.jpg".to_string(),
            description: "Latest Phone".to_string(),
            quantity: 5,
            price: 999.99,
        }
    }
}

/// Endpoint paths
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub register: String,
    pub login: String,
    /// Used both for creating (POST) and listing (GET)
    pub products: String,
    /// Must contain `{id}`
    pub update_quantity: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            register: "/register".to_string(),
            login: "/login".to_string(),
            products: "/products".to_string(),
            update_quantity: "/products/{id}/quantity".to_string(),
        }
    }
}

/// Response field names
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FieldNames {
    pub token: String,
    pub product_id: String,
    pub name: String,
    /// Also the key of the update request body
    pub quantity: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            token: "access_token".to_string(),
            product_id: "product_id".to_string(),
            name: "name".to_string(),
            quantity: "quantity".to_string(),
        }
    }
}

impl TestScenario {
    /// Load and validate a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        // A file holding no document (blank or only comments) means all defaults
        let scenario = if is_blank_document(&content) {
            TestScenario::default()
        } else {
            serde_yaml::from_str::<Option<TestScenario>>(&content)
                .map_err(|e| Error::ScenarioParse {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })?
                .unwrap_or_default()
        };

        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the fixture for values the steps cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.endpoints.update_quantity.contains(ID_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "endpoints.update_quantity '{}' must contain '{}'",
                self.endpoints.update_quantity, ID_PLACEHOLDER
            )));
        }
        if self.product.name.is_empty() {
            return Err(Error::Config("product.name must not be empty".to_string()));
        }
        if self.fields.token.is_empty() || self.fields.product_id.is_empty() {
            return Err(Error::Config(
                "fields.token and fields.product_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Account used by the scenario
    pub fn credentials(&self) -> Credentials {
        self.credentials.clone().unwrap_or_default()
    }
}

fn is_blank_document(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}
