// ==========================================
// EventApi - consultas
// ==========================================

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::event::Event;
use crate::repository::event_repo::EventRepository;
use crate::repository::student_participation_repo::StudentParticipationRepository;
use crate::repository::teacher_participation_repo::TeacherParticipationRepository;

use super::lifecycle::EventApi;
use super::types::EventDetail;

impl EventApi {
    /// Evento com status derivado e participações ativas.
    ///
    /// O status Rescheduled só existe olhando o substituto, por isso a
    /// leitura inteira acontece sob o mesmo lock.
    pub fn get_event_detail(&self, event_id: i64) -> ApiResult<EventDetail> {
        let conn = self.get_conn()?;

        let event = EventRepository::find_by_id_in(&conn, event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("evento (id={})", event_id)))?;

        let superseded = if event.is_canceled() {
            EventRepository::has_active_replacement_in(&conn, event_id)?
        } else {
            false
        };

        let student_participations =
            StudentParticipationRepository::find_active_by_event_in(&conn, event_id)?;
        let teacher_participations =
            TeacherParticipationRepository::find_active_by_event_in(&conn, event_id)?;

        Ok(EventDetail {
            status: event.status(superseded),
            event,
            student_participations,
            teacher_participations,
        })
    }

    /// Eventos agendados no intervalo de datas (inclusivo).
    pub fn list_events_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<Event>> {
        if from > to {
            return Err(ApiError::InvalidInput(format!(
                "intervalo invertido: {} > {}",
                from.format("%d/%m/%Y"),
                to.format("%d/%m/%Y")
            )));
        }
        Ok(self.repos.event_repo.find_in_range(from, to)?)
    }
}
