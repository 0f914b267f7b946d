//! Customer HTTP endpoints under `/api/Customers`.
//!
//! - `GET    /api/Customers`                 every customer, 404 when none
//! - `GET    /api/Customers/{name}`          first/last name substring match, 404 when none
//! - `POST   /api/Customers/CreateCustomer`  insert, 201 with the stored record
//! - `PUT    /api/Customers/UpdateCustomer`  replace, 200 with the updated record
//! - `DELETE /api/Customers/{id}`            remove, 200 with the removed record
//!
//! `CreateCustomer` and `UpdateCustomer` are also ordinary `{name}` / `{id}` segments
//! for the methods they do not claim. Every service failure becomes a 400 with a
//! plain-text message.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use roster_core::domain::customer::{Customer, CustomerId};
use roster_core::errors::{ApplicationError, InterfaceError};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::service::CustomerService;

const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct CustomersState {
    service: Arc<dyn CustomerService>,
}

pub fn router(service: Arc<dyn CustomerService>) -> Router {
    Router::new()
        .route("/api/Customers", get(get_all_customers))
        .route("/api/Customers/", get(get_all_customers))
        .route(
            "/api/Customers/CreateCustomer",
            literal_segment("CreateCustomer").post(create_customer),
        )
        .route(
            "/api/Customers/UpdateCustomer",
            literal_segment("UpdateCustomer").put(update_customer),
        )
        .route("/api/Customers/{key}", get(get_customers_by_name).delete(delete_customer))
        .with_state(CustomersState { service })
}

/// GET and DELETE for a path segment that a static route shadows from `{key}`.
fn literal_segment(segment: &'static str) -> MethodRouter<CustomersState> {
    get(move |correlation: CorrelationId, State(state): State<CustomersState>| {
        search_customers(correlation, state, segment.to_string())
    })
    .delete(move |correlation: CorrelationId, State(state): State<CustomersState>| {
        remove_customer(correlation, state, segment.to_string())
    })
}

/// Request-scoped id. The first extractor to ask stores it in the request
/// extensions so every later extractor and the handler see the same value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<CorrelationId>() {
            return Ok(existing.clone());
        }
        let assigned = CorrelationId(Uuid::new_v4().to_string());
        parts.extensions.insert(assigned.clone());
        Ok(assigned)
    }
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let correlation_id = self.0.correlation_id().to_string();
        match self.0 {
            InterfaceError::BadRequest { message, .. } => {
                (StatusCode::BAD_REQUEST, [(CORRELATION_HEADER, correlation_id)], message)
                    .into_response()
            }
            InterfaceError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, [(CORRELATION_HEADER, correlation_id)]).into_response()
            }
        }
    }
}

/// A request body that parsed as a `Customer` and passed every field constraint.
pub struct ValidCustomer(pub Customer);

impl<S> FromRequest<S> for ValidCustomer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let CorrelationId(correlation_id) =
            match CorrelationId::from_request_parts(&mut parts, state).await {
                Ok(assigned) => assigned,
                Err(never) => match never {},
            };
        let req = Request::from_parts(parts, body);

        let parsed = Json::<Customer>::from_request(req, state).await;
        let Json(customer) = parsed.map_err(|rejection| {
            warn!(
                event_name = "api.customers.body_rejected",
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "customer request body could not be parsed"
            );
            ApiError(
                InterfaceError::bad_request(rejection.body_text())
                    .with_correlation_id(&correlation_id),
            )
        })?;

        if let Err(error) = customer.ensure_valid() {
            warn!(
                event_name = "api.customers.validation_failed",
                correlation_id = %correlation_id,
                request = %to_payload(&customer),
                error = %error,
                "customer failed field validation"
            );
            return Err(ApiError(error.into_interface(correlation_id)));
        }

        Ok(Self(customer))
    }
}

async fn get_all_customers(
    CorrelationId(correlation_id): CorrelationId,
    State(state): State<CustomersState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = state
        .service
        .get_all_customers()
        .await
        .map_err(|error| failure("get_all_customers", &correlation_id, "{}".to_string(), error))?;

    if customers.is_empty() {
        return Err(not_found(correlation_id));
    }
    Ok(Json(customers))
}

async fn get_customers_by_name(
    correlation: CorrelationId,
    Path(name): Path<String>,
    State(state): State<CustomersState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    search_customers(correlation, state, name).await
}

async fn search_customers(
    CorrelationId(correlation_id): CorrelationId,
    state: CustomersState,
    name: String,
) -> Result<Json<Vec<Customer>>, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError(
            InterfaceError::bad_request("name is required").with_correlation_id(correlation_id),
        ));
    }

    let customers = state
        .service
        .get_customers_by_name(&name)
        .await
        .map_err(|error| {
            failure("get_customers_by_name", &correlation_id, to_payload(&name), error)
        })?;

    if customers.is_empty() {
        return Err(not_found(correlation_id));
    }
    Ok(Json(customers))
}

async fn create_customer(
    CorrelationId(correlation_id): CorrelationId,
    State(state): State<CustomersState>,
    ValidCustomer(customer): ValidCustomer,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let payload = to_payload(&customer);
    let created = state
        .service
        .add_customer(customer)
        .await
        .map_err(|error| failure("create_customer", &correlation_id, payload, error))?;

    info!(
        event_name = "api.customers.created",
        correlation_id = %correlation_id,
        customer_id = %created.id,
        "customer created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_customer(
    CorrelationId(correlation_id): CorrelationId,
    State(state): State<CustomersState>,
    ValidCustomer(customer): ValidCustomer,
) -> Result<Json<Customer>, ApiError> {
    let payload = to_payload(&customer);
    let updated = state
        .service
        .update_customer(customer)
        .await
        .map_err(|error| failure("update_customer", &correlation_id, payload, error))?;

    info!(
        event_name = "api.customers.updated",
        correlation_id = %correlation_id,
        customer_id = %updated.id,
        "customer updated"
    );
    Ok(Json(updated))
}

async fn delete_customer(
    correlation: CorrelationId,
    Path(key): Path<String>,
    State(state): State<CustomersState>,
) -> Result<Json<Customer>, ApiError> {
    remove_customer(correlation, state, key).await
}

async fn remove_customer(
    CorrelationId(correlation_id): CorrelationId,
    state: CustomersState,
    key: String,
) -> Result<Json<Customer>, ApiError> {
    let id = key.parse::<CustomerId>().map_err(|error| {
        warn!(
            event_name = "api.customers.invalid_id",
            correlation_id = %correlation_id,
            request = %to_payload(&key),
            error = %error,
            "customer id is not a valid identifier"
        );
        ApiError(
            InterfaceError::bad_request(format!("`{key}` is not a valid customer id: {error}"))
                .with_correlation_id(&correlation_id),
        )
    })?;

    let removed = state
        .service
        .delete_customer(&id)
        .await
        .map_err(|error| failure("delete_customer", &correlation_id, to_payload(&id), error))?;

    info!(
        event_name = "api.customers.deleted",
        correlation_id = %correlation_id,
        customer_id = %removed.id,
        "customer deleted"
    );
    Ok(Json(removed))
}

fn failure(
    operation: &'static str,
    correlation_id: &str,
    request: String,
    error: ApplicationError,
) -> ApiError {
    error!(
        event_name = "api.customers.request_failed",
        correlation_id = %correlation_id,
        operation,
        request = %request,
        error = %error,
        "customer request failed"
    );
    ApiError(error.into_interface(correlation_id))
}

fn not_found(correlation_id: String) -> ApiError {
    ApiError(InterfaceError::not_found().with_correlation_id(correlation_id))
}

fn to_payload<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|error| format!("<unserializable: {error}>"))
}
