//! Inventory API steps
//!
//! The five steps of the register → login → create → update → list journey.
//! Each one builds a request, sends it, checks the status against what it
//! accepts, and pulls out whatever later steps need.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::common::config::Credentials;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

use super::config::{ProductFixture, TestScenario, ID_PLACEHOLDER};
use super::outcome::{keys, ChainState, Failure, Outcome, StepOutput};
use super::runner::{Scenario, Step};

/// Build the full journey from a fixture
pub fn build_scenario(fixture: &TestScenario) -> Scenario {
    let credentials = fixture.credentials();

    Scenario::new(fixture.name.clone())
        .describe(fixture.description.clone())
        .step(RegisterStep {
            endpoint: fixture.endpoints.register.clone(),
            credentials: credentials.clone(),
        })
        .step(LoginStep {
            endpoint: fixture.endpoints.login.clone(),
            credentials,
            token_field: fixture.fields.token.clone(),
        })
        .step(CreateProductStep {
            endpoint: fixture.endpoints.products.clone(),
            product: fixture.product.clone(),
            id_field: fixture.fields.product_id.clone(),
        })
        .step(UpdateQuantityStep {
            endpoint: fixture.endpoints.update_quantity.clone(),
            quantity: fixture.updated_quantity,
            quantity_field: fixture.fields.quantity.clone(),
        })
        .step(ListProductsStep {
            endpoint: fixture.endpoints.products.clone(),
            product_name: fixture.product.name.clone(),
            expected_quantity: fixture.updated_quantity,
            name_field: fixture.fields.name.clone(),
            quantity_field: fixture.fields.quantity.clone(),
            limit: fixture.list_limit,
        })
}

/// Send a request, turning a transport fault into the step's outcome
async fn exchange(
    client: &dyn HttpClient,
    step: &str,
    request: HttpRequest,
) -> std::result::Result<HttpResponse, StepOutput> {
    let payload = request.body.clone();
    client.send(request).await.map_err(|e| {
        if e.is_transport() {
            warn!(step, error = %e, "service unreachable");
        } else {
            error!(step, error = %e, "client failed before reaching the service");
        }
        StepOutput::new(Outcome::TransportError {
            step: step.to_string(),
            request: payload,
            error: e.to_string(),
        })
    })
}

fn bearer(state: &ChainState) -> String {
    state.get_str(keys::TOKEN).unwrap_or_default().to_string()
}

fn credentials_payload(credentials: &Credentials) -> Value {
    json!({
        "username": credentials.username,
        "password": credentials.password,
    })
}

/// Scalar for notes: strings without their JSON quotes
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Quantities compare numerically, so `15` and `15.0` are the same
fn quantity_matches(value: &Value, expected: i64) -> bool {
    match value.as_i64() {
        Some(q) => q == expected,
        None => value.as_f64().is_some_and(|q| q == expected as f64),
    }
}

/// A listing is either a bare array or a paginated `{"docs": [...]}` page
fn records(body: &Value) -> Option<&Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(page) => page.get("docs").and_then(Value::as_array),
        _ => None,
    }
}

/// Creates the account; an existing account is fine
pub struct RegisterStep {
    pub endpoint: String,
    pub credentials: Credentials,
}

impl RegisterStep {
    const NAME: &'static str = "User Registration";
}

#[async_trait]
impl Step for RegisterStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, _state: &ChainState, client: &dyn HttpClient) -> StepOutput {
        let payload = credentials_payload(&self.credentials);
        let request = HttpRequest::post(&self.endpoint).json(payload.clone());

        let response = match exchange(client, Self::NAME, request).await {
            Ok(response) => response,
            Err(output) => return output,
        };

        if matches!(response.status, 201 | 409) {
            Outcome::passed(Self::NAME).into()
        } else {
            Failure::new(Self::NAME)
                .request(Some(&payload))
                .expected("201 or 409", response.status)
                .body(&response.body)
                .into()
        }
    }
}

/// Logs in and hands the access token to the following steps
pub struct LoginStep {
    pub endpoint: String,
    pub credentials: Credentials,
    pub token_field: String,
}

impl LoginStep {
    const NAME: &'static str = "Login Test";
}

#[async_trait]
impl Step for LoginStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn produces(&self) -> Option<&'static str> {
        Some(keys::TOKEN)
    }

    async fn execute(&self, _state: &ChainState, client: &dyn HttpClient) -> StepOutput {
        let payload = credentials_payload(&self.credentials);
        let request = HttpRequest::post(&self.endpoint).json(payload.clone());

        let response = match exchange(client, Self::NAME, request).await {
            Ok(response) => response,
            Err(output) => return output,
        };

        let failure = Failure::new(Self::NAME).request(Some(&payload));

        if response.status != 200 {
            return failure
                .expected(200, response.status)
                .body(&response.body)
                .into();
        }

        let expected = format!("JSON body with '{}'", self.token_field);
        let Some(body) = response.json_body() else {
            return failure
                .expected(expected, "Invalid JSON")
                .body(&response.body)
                .into();
        };

        // The token goes into an Authorization header, so only a non-empty
        // string is usable
        let actual = match body.get(&self.token_field) {
            Some(Value::String(token)) if !token.is_empty() => {
                return StepOutput::producing(Outcome::passed(Self::NAME), json!(token));
            }
            Some(Value::String(_)) => format!("empty '{}'", self.token_field),
            None | Some(Value::Null) => format!("no '{}' field", self.token_field),
            Some(_) => format!("non-string '{}'", self.token_field),
        };

        failure
            .expected(expected, actual)
            .body(&response.body)
            .into()
    }
}

/// Creates the fixture product
pub struct CreateProductStep {
    pub endpoint: String,
    pub product: ProductFixture,
    pub id_field: String,
}

impl CreateProductStep {
    const NAME: &'static str = "Add Product";
}

#[async_trait]
impl Step for CreateProductStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn requires(&self) -> &[&'static str] {
        &[keys::TOKEN]
    }

    fn produces(&self) -> Option<&'static str> {
        Some(keys::PRODUCT_ID)
    }

    async fn execute(&self, state: &ChainState, client: &dyn HttpClient) -> StepOutput {
        let payload = match serde_json::to_value(&self.product) {
            Ok(payload) => payload,
            Err(e) => {
                return Failure::new(Self::NAME)
                    .message(format!("Could not encode product: {}", e))
                    .into()
            }
        };
        let request = HttpRequest::post(&self.endpoint)
            .json(payload.clone())
            .bearer(bearer(state));

        let response = match exchange(client, Self::NAME, request).await {
            Ok(response) => response,
            Err(output) => return output,
        };

        let failure = Failure::new(Self::NAME).request(Some(&payload));

        if response.status != 201 {
            return failure
                .expected(201, response.status)
                .body(&response.body)
                .into();
        }

        // Ids may be strings (document stores) or numbers (SQL backends)
        let id = response
            .json_body()
            .and_then(|body| match body.get(&self.id_field) {
                Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            });

        match id {
            Some(id) => StepOutput::producing(Outcome::passed(Self::NAME), json!(id)),
            None => failure
                .expected(format!("'{}' in response", self.id_field), "missing")
                .body(&response.body)
                .into(),
        }
    }
}

/// Sets the product's quantity
pub struct UpdateQuantityStep {
    /// Path containing `{id}`
    pub endpoint: String,
    pub quantity: i64,
    pub quantity_field: String,
}

impl UpdateQuantityStep {
    const NAME: &'static str = "Update Quantity";
}

#[async_trait]
impl Step for UpdateQuantityStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn requires(&self) -> &[&'static str] {
        &[keys::TOKEN, keys::PRODUCT_ID]
    }

    fn produces(&self) -> Option<&'static str> {
        Some(keys::QUANTITY)
    }

    async fn execute(&self, state: &ChainState, client: &dyn HttpClient) -> StepOutput {
        let product_id = state.get_str(keys::PRODUCT_ID).unwrap_or_default();
        let path = self.endpoint.replace(ID_PLACEHOLDER, product_id);
        let mut payload = json!({});
        payload[self.quantity_field.as_str()] = json!(self.quantity);
        let request = HttpRequest::put(path)
            .json(payload.clone())
            .bearer(bearer(state));

        let response = match exchange(client, Self::NAME, request).await {
            Ok(response) => response,
            Err(output) => return output,
        };

        if response.status != 200 {
            return Failure::new(Self::NAME)
                .request(Some(&payload))
                .expected(200, response.status)
                .body(&response.body)
                .into();
        }

        // The body is informational only; the status already decided the outcome
        if !response.has_body() {
            return Outcome::passed_with(Self::NAME, "but response body is empty").into();
        }
        let Some(body) = response.json_body() else {
            return Outcome::passed_with(Self::NAME, "but response body is not valid JSON").into();
        };

        match body.get(&self.quantity_field) {
            Some(quantity) if !quantity.is_null() => StepOutput::producing(
                Outcome::passed_with(
                    Self::NAME,
                    format!("Updated quantity: {}", display_value(quantity)),
                ),
                quantity.clone(),
            ),
            _ => Outcome::passed_with(Self::NAME, "Updated quantity: unknown").into(),
        }
    }
}

/// Lists products and checks the fixture product's quantity
pub struct ListProductsStep {
    pub endpoint: String,
    pub product_name: String,
    pub expected_quantity: i64,
    pub name_field: String,
    pub quantity_field: String,
    /// Page size, for paginated listings
    pub limit: Option<u32>,
}

impl ListProductsStep {
    const NAME: &'static str = "Get Products";
}

#[async_trait]
impl Step for ListProductsStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn requires(&self) -> &[&'static str] {
        &[keys::TOKEN]
    }

    async fn execute(&self, state: &ChainState, client: &dyn HttpClient) -> StepOutput {
        let mut request = HttpRequest::get(&self.endpoint).bearer(bearer(state));
        if let Some(limit) = self.limit {
            request = request.query("limit", limit);
        }

        let response = match exchange(client, Self::NAME, request).await {
            Ok(response) => response,
            Err(output) => return output,
        };

        let failure = Failure::new(Self::NAME).body(&response.body);

        if response.status != 200 {
            return failure.expected(200, response.status).into();
        }

        let body = response.json_body();
        let Some(items) = body.as_ref().and_then(records) else {
            return failure.expected("valid JSON list", "Invalid JSON").into();
        };

        let found = items
            .iter()
            .find(|p| p.get(&self.name_field).and_then(Value::as_str) == Some(self.product_name.as_str()));

        let Some(product) = found else {
            return failure
                .message(format!(
                    "Could not find product named '{}'",
                    self.product_name
                ))
                .into();
        };

        let missing = Value::Null;
        let quantity = product.get(&self.quantity_field).unwrap_or(&missing);
        if quantity_matches(quantity, self.expected_quantity) {
            Outcome::passed_with(Self::NAME, format!("Quantity = {}", display_value(quantity)))
                .into()
        } else {
            // Raw JSON here, so a string "15" is told apart from the number 15
            failure.expected(self.expected_quantity, quantity).into()
        }
    }
}
