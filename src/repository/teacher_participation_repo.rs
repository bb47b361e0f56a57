// ==========================================
// Agenda Escolar - repositório de participações de professor
// ==========================================
// Troca de professor substitui o vínculo: o antigo é desativado
// (soft) e um novo registro ativo é inserido.
// ==========================================

use crate::domain::participation::TeacherParticipation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// TeacherParticipationRepository
// ==========================================
pub struct TeacherParticipationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeacherParticipationRepository {
    /// Cria uma nova instância de TeacherParticipationRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insere um vínculo ativo e devolve o id gerado
    pub fn insert_in(
        conn: &Connection,
        event_id: i64,
        teacher_id: i64,
        now: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"INSERT INTO teacher_participations (
                event_id, teacher_id, attendance, observation,
                deactivated_at, created_at, updated_at
            ) VALUES (?, ?, NULL, NULL, NULL, ?, ?)"#,
            params![
                event_id,
                teacher_id,
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Vínculos ativos de um evento
    pub fn find_active_by_event(&self, event_id: i64) -> RepositoryResult<Vec<TeacherParticipation>> {
        let conn = self.get_conn()?;
        Self::find_active_by_event_in(&conn, event_id)
    }

    /// Variante com conexão emprestada
    pub fn find_active_by_event_in(
        conn: &Connection,
        event_id: i64,
    ) -> RepositoryResult<Vec<TeacherParticipation>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, event_id, teacher_id, attendance, observation,
                      deactivated_at, created_at, updated_at
               FROM teacher_participations
               WHERE event_id = ? AND deactivated_at IS NULL
               ORDER BY id"#,
        )?;

        let participations = stmt
            .query_map(params![event_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(participations)
    }

    /// Vínculos ativos de eventos agendados no intervalo de datas
    pub fn find_in_event_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<TeacherParticipation>> {
        let conn = self.get_conn()?;
        Self::find_in_event_range_in(&conn, from, to)
    }

    /// Variante com conexão emprestada
    pub fn find_in_event_range_in(
        conn: &Connection,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<TeacherParticipation>> {
        let mut stmt = conn.prepare(
            r#"SELECT tp.id, tp.event_id, tp.teacher_id, tp.attendance, tp.observation,
                      tp.deactivated_at, tp.created_at, tp.updated_at
               FROM teacher_participations tp
               JOIN events e ON e.id = tp.event_id
               WHERE tp.deactivated_at IS NULL
                 AND e.scheduled_at BETWEEN ? AND ?
               ORDER BY tp.id"#,
        )?;

        let participations = stmt
            .query_map(
                params![
                    format!("{} 00:00:00", from.format("%Y-%m-%d")),
                    format!("{} 23:59:59", to.format("%Y-%m-%d")),
                ],
                Self::map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(participations)
    }

    /// Desativa (soft) um vínculo
    pub fn deactivate_in(
        conn: &Connection,
        participation_id: i64,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE teacher_participations
               SET deactivated_at = ?, updated_at = ?
               WHERE id = ? AND deactivated_at IS NULL"#,
            params![
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                participation_id,
            ],
        )?;

        Ok(count)
    }

    /// Desativa todos os vínculos ativos de um evento
    pub fn deactivate_for_event_in(
        conn: &Connection,
        event_id: i64,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE teacher_participations
               SET deactivated_at = ?, updated_at = ?
               WHERE event_id = ? AND deactivated_at IS NULL"#,
            params![
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                event_id,
            ],
        )?;

        Ok(count)
    }

    /// Grava presença e observação do professor na finalização
    pub fn write_finalization_in(
        conn: &Connection,
        participation_id: i64,
        attendance: bool,
        observation: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE teacher_participations
               SET attendance = ?, observation = ?, updated_at = ?
               WHERE id = ?"#,
            params![
                if attendance { 1 } else { 0 },
                observation,
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                participation_id,
            ],
        )?;

        Ok(count)
    }

    /// Mapeia uma linha do banco para TeacherParticipation
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<TeacherParticipation> {
        Ok(TeacherParticipation {
            id: row.get(0)?,
            event_id: row.get(1)?,
            teacher_id: row.get(2)?,
            attendance: row.get::<_, Option<i32>>(3)?.map(|v| v == 1),
            observation: row.get(4)?,
            deactivated_at: match row.get::<_, Option<String>>(5)? {
                Some(s) => Some(
                    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            5,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                ),
                None => None,
            },
            created_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(6)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            updated_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(7)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
        })
    }
}
