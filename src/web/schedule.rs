use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::schedule::{day_schedule, DaySchedule, WeekWindow};

use super::AppState;

#[derive(Deserialize)]
pub struct ScheduleQuery {
    day: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    week_start: NaiveDate,
    days: [NaiveDate; 7],
    slots: Vec<String>,
    schedule: DaySchedule,
}

fn parse_day(raw: Option<&str>, state: &AppState) -> Result<NaiveDate, ApiError> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("invalid day '{raw}', expected YYYY-MM-DD"))),
        None => Ok(Utc::now().with_timezone(&state.offset).date_naive()),
    }
}

/// Week of `day` plus that day's agenda, computed from the stored appointments.
pub async fn get_schedule(query: web::Query<ScheduleQuery>, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let day = parse_day(query.day.as_deref(), &state)?;
    let week = WeekWindow::containing(day);
    let appointments = state.store.lock().unwrap().list_appointments();
    let schedule = day_schedule(&appointments, day, &state.slots, &state.offset);

    Ok(HttpResponse::Ok().json(ScheduleResponse {
        week_start: week.start(),
        days: week.days(),
        slots: state.slots.labels().to_vec(),
        schedule,
    }))
}

pub async fn index() -> HttpResponse {
    let html = include_str!("../../templates/agenda.html");
    HttpResponse::Ok().content_type("text/html").body(html)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/schedule", web::get().to(get_schedule));
}
