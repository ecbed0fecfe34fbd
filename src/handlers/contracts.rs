// src/handlers/contracts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::contract::{Contract, ContractPayload},
};

// GET /api/contracts
#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Contracts",
    responses((status = 200, description = "All contracts", body = Vec<Contract>))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let contracts = app_state.contract_service.list_contracts().await?;
    Ok((StatusCode::OK, Json(contracts)))
}

// POST /api/contracts
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Contracts",
    request_body = ContractPayload,
    responses(
        (status = 201, description = "Contract created", body = Contract),
        (status = 422, description = "Invalid fields")
    )
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    Json(payload): Json<ContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let contract = app_state.contract_service.create_contract(payload).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

// DELETE /api/contracts/{id}
#[utoipa::path(
    delete,
    path = "/api/contracts/{contract_id}",
    tag = "Contracts",
    responses(
        (status = 204, description = "Contract removed; existing work logs keep their copy"),
        (status = 404, description = "Unknown contract")
    ),
    params(("contract_id" = String, Path, description = "Contract id"))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    Path(contract_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contract_service.delete_contract(&contract_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
