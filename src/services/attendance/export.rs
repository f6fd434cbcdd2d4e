use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error::ErrorInternalServerError};
use tracing::{error, info};

use super::AttendanceService;
use crate::models::attendance::requests::AttendanceListParams;
use crate::models::{ApiResponse, ErrorCode};

// 导出指定日期的签到记录为 CSV
pub async fn export_records(
    service: &AttendanceService,
    request: &HttpRequest,
    classroom_id: i64,
    params: AttendanceListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let classroom = match service.ensure_owner(request, classroom_id).await {
        Ok(classroom) => classroom,
        Err(response) => return Ok(response),
    };

    let date = super::list::resolve_date(&params);

    let records = match storage.list_attendance(classroom_id, &date).await {
        Ok(response) => response.items,
        Err(e) => {
            error!(
                "Failed to export attendance for classroom {} on {}: {}",
                classroom_id, date, e
            );
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to export attendance: {e}"),
                )),
            );
        }
    };

    let mut writer = csv::Writer::from_writer(vec![]);

    writer
        .write_record([
            "student_id",
            "student_name",
            "course_name",
            "date",
            "session_id",
            "submitted_at",
            "photo_token",
        ])
        .map_err(ErrorInternalServerError)?;

    for record in &records {
        writer
            .write_record([
                record.student_id.to_string(),
                record.student_name.clone(),
                classroom.course_name.clone(),
                date.clone(),
                record.session_id.to_string(),
                record.submitted_at.to_rfc3339(),
                record.photo_token.clone(),
            ])
            .map_err(ErrorInternalServerError)?;
    }

    let csv_data = writer
        .into_inner()
        .map_err(|e| ErrorInternalServerError(e.to_string()))?;

    info!(
        "Exported {} attendance records for classroom {} on {}",
        records.len(),
        classroom_id,
        date
    );

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"attendance-{classroom_id}-{date}.csv\""),
        ))
        .body(csv_data))
}
