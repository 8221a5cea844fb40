//! HTTP handler functions for the wastelog API.

use actix_web::{HttpResponse, web};
use wastelog_core::{
    model::{RecordId, ScheduleId},
    service::ServiceError,
    validation::{RecordInput, ScheduleInput, parse_date},
};

use crate::AppState;
use crate::api::{ApiError, ApiHealth, RecordQueryParams};

/// `GET /api/health`
pub(crate) async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_owned(),
        store: state.service.backend_kind().to_string(),
    })
}

/// `POST /api/records`
pub(crate) async fn create_record(
    state: web::Data<AppState>,
    body: web::Json<RecordInput>,
) -> HttpResponse {
    match state.service.create_record(body.into_inner()).await {
        Ok(record) => HttpResponse::Created().json(record),
        Err(err) => error_response(&err),
    }
}

/// `GET /api/records`
///
/// Lists records, optionally filtered and sorted newest first.
pub(crate) async fn records(
    state: web::Data<AppState>,
    params: web::Query<RecordQueryParams>,
) -> HttpResponse {
    let (filter, order) = match params.into_inner().into_query() {
        Ok(query) => query,
        Err(err) => return HttpResponse::BadRequest().json(ApiError::from(&err)),
    };

    match state.service.query_records(&filter, order).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(err) => error_response(&err),
    }
}

/// `GET /api/records/daily/{date}`
pub(crate) async fn daily_report(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let date = match parse_date("date", &path) {
        Ok(date) => date,
        Err(err) => return HttpResponse::BadRequest().json(ApiError::from(&err)),
    };

    match state.service.daily_report(date).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_response(&err),
    }
}

/// `DELETE /api/records/{id}`
pub(crate) async fn delete_record(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let Ok(id) = path.parse::<RecordId>() else {
        return not_found("record", &path);
    };

    match state.service.delete_record(id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(&err),
    }
}

/// `POST /api/schedules`
pub(crate) async fn create_schedule(
    state: web::Data<AppState>,
    body: web::Json<ScheduleInput>,
) -> HttpResponse {
    match state.service.create_schedule(body.into_inner()).await {
        Ok(schedule) => HttpResponse::Created().json(schedule),
        Err(err) => error_response(&err),
    }
}

/// `GET /api/schedules`
///
/// Lists schedules ordered by collection date.
pub(crate) async fn schedules(state: web::Data<AppState>) -> HttpResponse {
    match state.service.schedules().await {
        Ok(schedules) => HttpResponse::Ok().json(schedules),
        Err(err) => error_response(&err),
    }
}

/// `PATCH /api/schedules/{id}/complete`
pub(crate) async fn complete_schedule(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let Ok(id) = path.parse::<ScheduleId>() else {
        return not_found("schedule", &path);
    };

    match state.service.complete_schedule(id).await {
        Ok(schedule) => HttpResponse::Ok().json(schedule),
        Err(err) => error_response(&err),
    }
}

/// `DELETE /api/schedules/{id}`
pub(crate) async fn delete_schedule(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let Ok(id) = path.parse::<ScheduleId>() else {
        return not_found("schedule", &path);
    };

    match state.service.delete_schedule(id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(&err),
    }
}

/// `GET /api/statistics`
///
/// Recomputes summary statistics over both stores.
pub(crate) async fn statistics(state: web::Data<AppState>) -> HttpResponse {
    match state.service.statistics().await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => error_response(&err),
    }
}

fn not_found(entity: &str, raw_id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiError::new(format!("{entity} {raw_id} not found")))
}

/// Maps service failures onto 400, 404, or 500 responses.
fn error_response(err: &ServiceError) -> HttpResponse {
    match err {
        ServiceError::Validation(inner) => HttpResponse::BadRequest().json(ApiError::from(inner)),
        ServiceError::NotFound { .. } => HttpResponse::NotFound().json(ApiError::new(err.to_string())),
        ServiceError::StoreUnavailable(_) => {
            log::error!("Request failed: {err}");
            HttpResponse::InternalServerError().json(ApiError::new(err.to_string()))
        }
    }
}
