// ==========================================
// Agenda Escolar - disponibilidade de sala e professor
// ==========================================
// Funções associadas sobre &Connection: as operações de ciclo de
// vida chamam estes testes dentro da própria transação, fechando a
// janela entre verificação e gravação.
// Intervalos são meio-abertos: fim encostado em início não conflita.
// ==========================================

use crate::repository::event_repo::EventRepository;
use crate::repository::class_group_repo::ClassGroupRepository;
use crate::repository::error::RepositoryResult;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use rusqlite::Connection;

// Margem de busca antes do candidato: nenhum evento dura mais de
// um dia, então basta olhar inícios a partir da véspera.
const SEARCH_MARGIN_HOURS: i64 = 24;

/// Sobreposição de intervalos meio-abertos [início, início+duração)
pub fn intervals_overlap(
    start_a: NaiveDateTime,
    duration_a_minutes: i32,
    start_b: NaiveDateTime,
    duration_b_minutes: i32,
) -> bool {
    let end_a = start_a + Duration::minutes(duration_a_minutes as i64);
    let end_b = start_b + Duration::minutes(duration_b_minutes as i64);
    start_a < end_b && start_b < end_a
}

// ==========================================
// RoomAvailability - ocupação de sala
// ==========================================
pub struct RoomAvailability;

impl RoomAvailability {
    /// A sala está ocupada no intervalo candidato?
    ///
    /// Salas virtuais (lista configurada) nunca ocupam: aulas online
    /// simultâneas são permitidas. Eventos cancelados liberam a vaga.
    /// `ignore_event_id` exclui o próprio evento em edição/reagendamento.
    pub fn is_occupied(
        conn: &Connection,
        virtual_room_ids: &[i64],
        room_id: i64,
        starts_at: NaiveDateTime,
        duration_minutes: i32,
        ignore_event_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        if virtual_room_ids.contains(&room_id) {
            return Ok(false);
        }

        let window_start = starts_at - Duration::hours(SEARCH_MARGIN_HOURS);
        let window_end = starts_at + Duration::minutes(duration_minutes as i64);

        let candidates =
            EventRepository::find_active_in_room_between_in(conn, room_id, window_start, window_end)?;

        let occupied = candidates.iter().any(|event| {
            Some(event.id) != ignore_event_id
                && intervals_overlap(
                    event.scheduled_at,
                    event.duration_minutes,
                    starts_at,
                    duration_minutes,
                )
        });

        Ok(occupied)
    }
}

// ==========================================
// TeacherAvailability - agenda do professor
// ==========================================
pub struct TeacherAvailability;

impl TeacherAvailability {
    /// O professor tem outra turma ativa no mesmo dia e horário?
    pub fn has_recurring_class_conflict(
        conn: &Connection,
        teacher_id: i64,
        day_of_week: i32,
        time_of_day: NaiveTime,
        ignore_class_group_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        ClassGroupRepository::exists_other_active_at_in(
            conn,
            teacher_id,
            day_of_week,
            time_of_day,
            ignore_class_group_id,
        )
    }

    /// O professor tem participação ativa em evento ativo que
    /// sobrepõe o intervalo candidato?
    pub fn has_participation_conflict(
        conn: &Connection,
        teacher_id: i64,
        starts_at: NaiveDateTime,
        duration_minutes: i32,
        ignore_event_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let window_start = starts_at - Duration::hours(SEARCH_MARGIN_HOURS);
        let window_end = starts_at + Duration::minutes(duration_minutes as i64);

        let candidates = EventRepository::find_active_with_teacher_between_in(
            conn,
            teacher_id,
            window_start,
            window_end,
        )?;

        let conflict = candidates.iter().any(|event| {
            Some(event.id) != ignore_event_id
                && intervals_overlap(
                    event.scheduled_at,
                    event.duration_minutes,
                    starts_at,
                    duration_minutes,
                )
        });

        Ok(conflict)
    }
}
