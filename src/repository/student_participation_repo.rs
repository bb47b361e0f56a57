// ==========================================
// Agenda Escolar - repositório de participações de aluno
// ==========================================
// Participações são desativadas (soft), nunca apagadas; o índice
// único parcial do schema garante no máximo uma ativa por
// (event_id, student_id).
// ==========================================

use crate::domain::participation::{NewStudentParticipation, StudentParticipation, WorkbookProgress};
use crate::domain::types::ContactStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// StudentParticipationRepository
// ==========================================
pub struct StudentParticipationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentParticipationRepository {
    /// Cria uma nova instância de StudentParticipationRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insere uma participação ativa e devolve o id gerado
    pub fn insert(
        &self,
        new_participation: &NewStudentParticipation,
        now: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, new_participation, now)
    }

    /// Insere uma participação usando a conexão emprestada
    pub fn insert_in(
        conn: &Connection,
        new_participation: &NewStudentParticipation,
        now: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"INSERT INTO student_participations (
                event_id, student_id, attendance, deactivated_at,
                made_up_from_event_id, contact_status,
                abacus_book, abacus_page, challenge_book, challenge_page,
                created_at, updated_at
            ) VALUES (?, ?, NULL, NULL, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                new_participation.event_id,
                new_participation.student_id,
                new_participation.made_up_from_event_id,
                ContactStatus::NotContacted.to_db_str(),
                new_participation.workbook.abacus_book,
                new_participation.workbook.abacus_page,
                new_participation.workbook.challenge_book,
                new_participation.workbook.challenge_page,
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Busca participação por id
    pub fn find_by_id(&self, participation_id: i64) -> RepositoryResult<Option<StudentParticipation>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, participation_id)
    }

    /// Variante com conexão emprestada
    pub fn find_by_id_in(
        conn: &Connection,
        participation_id: i64,
    ) -> RepositoryResult<Option<StudentParticipation>> {
        match conn.query_row(
            r#"SELECT id, event_id, student_id, attendance, deactivated_at,
                      made_up_from_event_id, contact_status,
                      abacus_book, abacus_page, challenge_book, challenge_page,
                      created_at, updated_at
               FROM student_participations
               WHERE id = ?"#,
            params![participation_id],
            Self::map_row,
        ) {
            Ok(participation) => Ok(Some(participation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Participações ativas de um evento
    pub fn find_active_by_event(&self, event_id: i64) -> RepositoryResult<Vec<StudentParticipation>> {
        let conn = self.get_conn()?;
        Self::find_active_by_event_in(&conn, event_id)
    }

    /// Variante com conexão emprestada
    pub fn find_active_by_event_in(
        conn: &Connection,
        event_id: i64,
    ) -> RepositoryResult<Vec<StudentParticipation>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, event_id, student_id, attendance, deactivated_at,
                      made_up_from_event_id, contact_status,
                      abacus_book, abacus_page, challenge_book, challenge_page,
                      created_at, updated_at
               FROM student_participations
               WHERE event_id = ? AND deactivated_at IS NULL
               ORDER BY id"#,
        )?;

        let participations = stmt
            .query_map(params![event_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(participations)
    }

    /// Participação ativa de um aluno em um evento
    pub fn find_active_by_event_and_student_in(
        conn: &Connection,
        event_id: i64,
        student_id: i64,
    ) -> RepositoryResult<Option<StudentParticipation>> {
        match conn.query_row(
            r#"SELECT id, event_id, student_id, attendance, deactivated_at,
                      made_up_from_event_id, contact_status,
                      abacus_book, abacus_page, challenge_book, challenge_page,
                      created_at, updated_at
               FROM student_participations
               WHERE event_id = ? AND student_id = ? AND deactivated_at IS NULL"#,
            params![event_id, student_id],
            Self::map_row,
        ) {
            Ok(participation) => Ok(Some(participation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Quantidade de participações ativas de um evento
    pub fn count_active_by_event_in(conn: &Connection, event_id: i64) -> RepositoryResult<i64> {
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*)
               FROM student_participations
               WHERE event_id = ? AND deactivated_at IS NULL"#,
            params![event_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// Participações (ativas e desativadas) de eventos agendados no intervalo
    ///
    /// A cadeia de reposição passa por registros desativados, então a
    /// carga em lote traz tudo e os engines filtram em memória.
    pub fn find_in_event_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<StudentParticipation>> {
        let conn = self.get_conn()?;
        Self::find_in_event_range_in(&conn, from, to)
    }

    /// Variante com conexão emprestada
    pub fn find_in_event_range_in(
        conn: &Connection,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<StudentParticipation>> {
        let mut stmt = conn.prepare(
            r#"SELECT sp.id, sp.event_id, sp.student_id, sp.attendance, sp.deactivated_at,
                      sp.made_up_from_event_id, sp.contact_status,
                      sp.abacus_book, sp.abacus_page, sp.challenge_book, sp.challenge_page,
                      sp.created_at, sp.updated_at
               FROM student_participations sp
               JOIN events e ON e.id = sp.event_id
               WHERE e.scheduled_at BETWEEN ? AND ?
               ORDER BY sp.id"#,
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

    /// Participação criada como reposição a partir do evento de origem
    ///
    /// Usada para seguir a cadeia de reposições; devolve a mais recente
    /// quando houve mais de uma transferência a partir da mesma origem.
    pub fn find_makeup_follow_up_in(
        conn: &Connection,
        source_event_id: i64,
        student_id: i64,
    ) -> RepositoryResult<Option<StudentParticipation>> {
        match conn.query_row(
            r#"SELECT id, event_id, student_id, attendance, deactivated_at,
                      made_up_from_event_id, contact_status,
                      abacus_book, abacus_page, challenge_book, challenge_page,
                      created_at, updated_at
               FROM student_participations
               WHERE made_up_from_event_id = ? AND student_id = ?
               ORDER BY id DESC
               LIMIT 1"#,
            params![source_event_id, student_id],
            Self::map_row,
        ) {
            Ok(participation) => Ok(Some(participation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Desativa (soft) uma participação
    pub fn deactivate_in(
        conn: &Connection,
        participation_id: i64,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE student_participations
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

    /// Desativa todas as participações ativas de um evento
    pub fn deactivate_for_event_in(
        conn: &Connection,
        event_id: i64,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE student_participations
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

    /// Marca a presença de uma participação
    pub fn set_attendance_in(
        conn: &Connection,
        participation_id: i64,
        attendance: bool,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE student_participations
               SET attendance = ?, updated_at = ?
               WHERE id = ?"#,
            params![
                if attendance { 1 } else { 0 },
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                participation_id,
            ],
        )?;

        Ok(count)
    }

    /// Grava o resultado da finalização na participação
    ///
    /// made_up_from_event_id só é sobrescrito quando informado.
    pub fn write_finalization_in(
        conn: &Connection,
        participation_id: i64,
        attendance: bool,
        workbook: &WorkbookProgress,
        made_up_from_event_id: Option<i64>,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE student_participations
               SET attendance = ?,
                   abacus_book = ?, abacus_page = ?,
                   challenge_book = ?, challenge_page = ?,
                   made_up_from_event_id = COALESCE(?, made_up_from_event_id),
                   updated_at = ?
               WHERE id = ?"#,
            params![
                if attendance { 1 } else { 0 },
                workbook.abacus_book,
                workbook.abacus_page,
                workbook.challenge_book,
                workbook.challenge_page,
                made_up_from_event_id,
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                participation_id,
            ],
        )?;

        Ok(count)
    }

    /// Atualiza o status de contato de uma participação
    pub fn set_contact_status_in(
        conn: &Connection,
        participation_id: i64,
        status: ContactStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE student_participations
               SET contact_status = ?, updated_at = ?
               WHERE id = ?"#,
            params![
                status.to_db_str(),
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                participation_id,
            ],
        )?;

        Ok(count)
    }

    /// Atualiza o status de contato de todas as participações ativas do evento
    pub fn set_contact_status_for_event_in(
        conn: &Connection,
        event_id: i64,
        status: ContactStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE student_participations
               SET contact_status = ?, updated_at = ?
               WHERE event_id = ? AND deactivated_at IS NULL"#,
            params![
                status.to_db_str(),
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                event_id,
            ],
        )?;

        Ok(count)
    }

    /// Mapeia uma linha do banco para StudentParticipation
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<StudentParticipation> {
        Ok(StudentParticipation {
            id: row.get(0)?,
            event_id: row.get(1)?,
            student_id: row.get(2)?,
            attendance: row.get::<_, Option<i32>>(3)?.map(|v| v == 1),
            deactivated_at: match row.get::<_, Option<String>>(4)? {
                Some(s) => Some(
                    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                ),
                None => None,
            },
            made_up_from_event_id: row.get(5)?,
            contact_status: ContactStatus::from_str(&row.get::<_, String>(6)?),
            workbook: WorkbookProgress {
                abacus_book: row.get(7)?,
                abacus_page: row.get(8)?,
                challenge_book: row.get(9)?,
                challenge_page: row.get(10)?,
            },
            created_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(11)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    11,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            updated_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(12)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    12,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
        })
    }
}
