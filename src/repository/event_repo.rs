// ==========================================
// Agenda Escolar - repositório de eventos
// ==========================================
// Regra da camada: repositório não contém regra de negócio.
// As variantes *_in recebem uma conexão emprestada para rodar
// dentro da transação aberta pela operação chamadora.
// ==========================================

use crate::domain::event::{Event, NewEvent};
use crate::domain::types::EventType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// EventRepository - eventos agendados
// ==========================================
pub struct EventRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EventRepository {
    /// Cria uma nova instância de EventRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insere um evento e devolve o id gerado
    pub fn insert(&self, new_event: &NewEvent, now: NaiveDateTime) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, new_event, now)
    }

    /// Insere um evento usando a conexão emprestada
    pub fn insert_in(
        conn: &Connection,
        new_event: &NewEvent,
        now: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"INSERT INTO events (
                event_type, scheduled_at, duration_minutes, room_id, max_capacity,
                finalized, canceled_at, cancel_reason, rescheduled_from_id,
                class_group_id, curriculum_week_id, created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 0, NULL, NULL, ?, ?, ?, ?, ?, ?)"#,
            params![
                new_event.event_type.to_db_str(),
                new_event.scheduled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                new_event.duration_minutes,
                new_event.room_id,
                new_event.max_capacity,
                new_event.rescheduled_from_id,
                new_event.class_group_id,
                new_event.curriculum_week_id,
                &new_event.created_by,
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Busca evento por id
    pub fn find_by_id(&self, event_id: i64) -> RepositoryResult<Option<Event>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, event_id)
    }

    /// Busca evento por id usando a conexão emprestada
    pub fn find_by_id_in(conn: &Connection, event_id: i64) -> RepositoryResult<Option<Event>> {
        match conn.query_row(
            r#"SELECT id, event_type, scheduled_at, duration_minutes, room_id,
                      max_capacity, finalized, canceled_at, cancel_reason,
                      rescheduled_from_id, class_group_id, curriculum_week_id,
                      created_by, created_at, updated_at
               FROM events
               WHERE id = ?"#,
            params![event_id],
            Self::map_row,
        ) {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Eventos de uma turma em uma data (inclui cancelados)
    ///
    /// Cancelados contam para a supressão de pseudo-eventos, por isso
    /// o filtro de status fica a cargo do chamador.
    pub fn find_by_class_group_and_date(
        &self,
        class_group_id: i64,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Event>> {
        let conn = self.get_conn()?;
        Self::find_by_class_group_and_date_in(&conn, class_group_id, date)
    }

    /// Variante com conexão emprestada
    pub fn find_by_class_group_and_date_in(
        conn: &Connection,
        class_group_id: i64,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Event>> {
        let day = date.format("%Y-%m-%d").to_string();

        let mut stmt = conn.prepare(
            r#"SELECT id, event_type, scheduled_at, duration_minutes, room_id,
                      max_capacity, finalized, canceled_at, cancel_reason,
                      rescheduled_from_id, class_group_id, curriculum_week_id,
                      created_by, created_at, updated_at
               FROM events
               WHERE class_group_id = ?
                 AND scheduled_at BETWEEN ? AND ?
               ORDER BY scheduled_at"#,
        )?;

        let events = stmt
            .query_map(
                params![
                    class_group_id,
                    format!("{} 00:00:00", day),
                    format!("{} 23:59:59", day),
                ],
                Self::map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(events)
    }

    /// Eventos agendados dentro do intervalo de datas (inclusivo)
    pub fn find_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<Event>> {
        let conn = self.get_conn()?;
        Self::find_in_range_in(&conn, from, to)
    }

    /// Variante com conexão emprestada
    pub fn find_in_range_in(
        conn: &Connection,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<Event>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, event_type, scheduled_at, duration_minutes, room_id,
                      max_capacity, finalized, canceled_at, cancel_reason,
                      rescheduled_from_id, class_group_id, curriculum_week_id,
                      created_by, created_at, updated_at
               FROM events
               WHERE scheduled_at BETWEEN ? AND ?
               ORDER BY scheduled_at"#,
        )?;

        let events = stmt
            .query_map(
                params![
                    format!("{} 00:00:00", from.format("%Y-%m-%d")),
                    format!("{} 23:59:59", to.format("%Y-%m-%d")),
                ],
                Self::map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(events)
    }

    /// Eventos ativos de uma sala com início dentro da janela dada
    ///
    /// Janela de busca para teste de sobreposição: o chamador passa
    /// uma margem antes do candidato (nenhum evento dura mais de um
    /// dia) e compara os intervalos em memória.
    pub fn find_active_in_room_between_in(
        conn: &Connection,
        room_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<Event>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, event_type, scheduled_at, duration_minutes, room_id,
                      max_capacity, finalized, canceled_at, cancel_reason,
                      rescheduled_from_id, class_group_id, curriculum_week_id,
                      created_by, created_at, updated_at
               FROM events
               WHERE room_id = ?
                 AND canceled_at IS NULL
                 AND scheduled_at BETWEEN ? AND ?
               ORDER BY scheduled_at"#,
        )?;

        let events = stmt
            .query_map(
                params![
                    room_id,
                    from.format("%Y-%m-%d %H:%M:%S").to_string(),
                    to.format("%Y-%m-%d %H:%M:%S").to_string(),
                ],
                Self::map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(events)
    }

    /// Eventos ativos em que o professor tem participação ativa,
    /// com início dentro da janela dada
    pub fn find_active_with_teacher_between_in(
        conn: &Connection,
        teacher_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<Event>> {
        let mut stmt = conn.prepare(
            r#"SELECT e.id, e.event_type, e.scheduled_at, e.duration_minutes, e.room_id,
                      e.max_capacity, e.finalized, e.canceled_at, e.cancel_reason,
                      e.rescheduled_from_id, e.class_group_id, e.curriculum_week_id,
                      e.created_by, e.created_at, e.updated_at
               FROM events e
               JOIN teacher_participations tp ON tp.event_id = e.id
               WHERE tp.teacher_id = ?
                 AND tp.deactivated_at IS NULL
                 AND e.canceled_at IS NULL
                 AND e.scheduled_at BETWEEN ? AND ?
               ORDER BY e.scheduled_at"#,
        )?;

        let events = stmt
            .query_map(
                params![
                    teacher_id,
                    from.format("%Y-%m-%d %H:%M:%S").to_string(),
                    to.format("%Y-%m-%d %H:%M:%S").to_string(),
                ],
                Self::map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(events)
    }

    /// Existe evento ativo da turma vinculado à semana de roteiro?
    pub fn exists_active_for_group_week_in(
        conn: &Connection,
        class_group_id: i64,
        curriculum_week_id: i64,
        ignore_event_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*)
               FROM events
               WHERE class_group_id = ?
                 AND curriculum_week_id = ?
                 AND canceled_at IS NULL
                 AND id IS NOT ?"#,
            params![class_group_id, curriculum_week_id, ignore_event_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Existe evento ativo apontando para este como origem de reagendamento?
    pub fn has_active_replacement(&self, event_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        Self::has_active_replacement_in(&conn, event_id)
    }

    /// Variante com conexão emprestada
    pub fn has_active_replacement_in(conn: &Connection, event_id: i64) -> RepositoryResult<bool> {
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*)
               FROM events
               WHERE rescheduled_from_id = ? AND canceled_at IS NULL"#,
            params![event_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Atualiza agenda, sala, capacidade e semana de roteiro
    pub fn update_schedule_in(
        conn: &Connection,
        event_id: i64,
        scheduled_at: NaiveDateTime,
        duration_minutes: i32,
        room_id: i64,
        max_capacity: i32,
        curriculum_week_id: Option<i64>,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE events
               SET scheduled_at = ?, duration_minutes = ?, room_id = ?,
                   max_capacity = ?, curriculum_week_id = ?, updated_at = ?
               WHERE id = ?"#,
            params![
                scheduled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                duration_minutes,
                room_id,
                max_capacity,
                curriculum_week_id,
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                event_id,
            ],
        )?;

        Ok(count)
    }

    /// Cancela (soft) o evento com motivo
    pub fn cancel_in(
        conn: &Connection,
        event_id: i64,
        canceled_at: NaiveDateTime,
        reason: &str,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE events
               SET canceled_at = ?, cancel_reason = ?, updated_at = ?
               WHERE id = ?"#,
            params![
                canceled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                reason,
                canceled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                event_id,
            ],
        )?;

        Ok(count)
    }

    /// Liga/desliga o flag de finalização
    pub fn set_finalized_in(
        conn: &Connection,
        event_id: i64,
        finalized: bool,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE events SET finalized = ?, updated_at = ? WHERE id = ?"#,
            params![
                if finalized { 1 } else { 0 },
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                event_id,
            ],
        )?;

        Ok(count)
    }

    /// Mapeia uma linha do banco para Event
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Event> {
        let type_str: String = row.get(1)?;
        let event_type = EventType::from_str(&type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                format!("tipo de evento desconhecido: {}", type_str).into(),
            )
        })?;

        Ok(Event {
            id: row.get(0)?,
            event_type,
            scheduled_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(2)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            duration_minutes: row.get(3)?,
            room_id: row.get(4)?,
            max_capacity: row.get(5)?,
            finalized: row.get::<_, i32>(6)? == 1,
            canceled_at: match row.get::<_, Option<String>>(7)? {
                Some(s) => Some(
                    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            7,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                ),
                None => None,
            },
            cancel_reason: row.get(8)?,
            rescheduled_from_id: row.get(9)?,
            class_group_id: row.get(10)?,
            curriculum_week_id: row.get(11)?,
            created_by: row.get(12)?,
            created_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(13)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    13,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            updated_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(14)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    14,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
        })
    }
}
