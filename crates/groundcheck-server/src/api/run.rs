use axum::{extract::State, http::StatusCode, Extension, Json};
use groundcheck_core::SheetRange;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, ResponseMeta};
use crate::middleware::RequestId;
use crate::runner::{RunController, RunDescription, RunStatus, StartError};

#[derive(Debug, Deserialize)]
pub(super) struct StartRunRequest {
    sheet_name: String,
    #[serde(default = "default_start_row")]
    start_row: usize,
    #[serde(default = "default_max_rows")]
    max_rows: usize,
}

const fn default_start_row() -> usize {
    1
}

const fn default_max_rows() -> usize {
    100
}

#[derive(Debug, Serialize)]
pub(super) struct StopRunResponse {
    stopping: bool,
}

pub(super) async fn start_run(
    State(controller): State<RunController>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<StartRunRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RunDescription>>), ApiError> {
    let rid = &req_id.0;

    let sheet_name = body.sheet_name.trim().to_owned();
    if sheet_name.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "sheet_name must not be empty",
        ));
    }
    if body.start_row == 0 || body.max_rows == 0 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "start_row and max_rows must be at least 1",
        ));
    }

    let range = SheetRange {
        sheet_name,
        start_row: body.start_row,
        max_rows: body.max_rows,
    };

    match controller.start(range).await {
        Ok(description) => Ok((
            StatusCode::ACCEPTED,
            Json(ApiResponse {
                data: description,
                meta: ResponseMeta::new(req_id.0),
            }),
        )),
        Err(e @ StartError::AlreadyRunning { .. }) => {
            Err(ApiError::new(rid, "conflict", e.to_string()))
        }
    }
}

pub(super) async fn stop_run(
    State(controller): State<RunController>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<StopRunResponse>> {
    let stopping = controller.stop().await;
    Json(ApiResponse {
        data: StopRunResponse { stopping },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn run_status(
    State(controller): State<RunController>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<RunStatus>> {
    Json(ApiResponse {
        data: controller.status().await,
        meta: ResponseMeta::new(req_id.0),
    })
}
