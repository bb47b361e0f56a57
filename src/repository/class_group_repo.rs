// ==========================================
// Agenda Escolar - repositório de turmas e vigências
// ==========================================
// Turmas e vigências de matrícula são dados de referência: o motor
// lê, nunca escreve. Dia da semana: 0=segunda .. 6=domingo.
// ==========================================

use crate::domain::class_group::{ClassGroup, EnrollmentWindow};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ClassGroupRepository - turmas
// ==========================================
pub struct ClassGroupRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClassGroupRepository {
    /// Cria uma nova instância de ClassGroupRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Busca turma por id
    pub fn find_by_id(&self, class_group_id: i64) -> RepositoryResult<Option<ClassGroup>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, class_group_id)
    }

    /// Variante com conexão emprestada
    pub fn find_by_id_in(
        conn: &Connection,
        class_group_id: i64,
    ) -> RepositoryResult<Option<ClassGroup>> {
        match conn.query_row(
            r#"SELECT id, name, day_of_week, time_of_day, duration_minutes,
                      room_id, teacher_id, max_capacity, eligible_profiles, active
               FROM class_groups
               WHERE id = ?"#,
            params![class_group_id],
            Self::map_row,
        ) {
            Ok(group) => Ok(Some(group)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Lista todas as turmas ativas
    pub fn list_active(&self) -> RepositoryResult<Vec<ClassGroup>> {
        let conn = self.get_conn()?;
        Self::list_active_in(&conn)
    }

    /// Variante com conexão emprestada
    pub fn list_active_in(conn: &Connection) -> RepositoryResult<Vec<ClassGroup>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, name, day_of_week, time_of_day, duration_minutes,
                      room_id, teacher_id, max_capacity, eligible_profiles, active
               FROM class_groups
               WHERE active = 1
               ORDER BY day_of_week, time_of_day, id"#,
        )?;

        let groups = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(groups)
    }

    /// Turmas ativas de um dia da semana
    pub fn list_active_by_weekday_in(
        conn: &Connection,
        day_of_week: i32,
    ) -> RepositoryResult<Vec<ClassGroup>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, name, day_of_week, time_of_day, duration_minutes,
                      room_id, teacher_id, max_capacity, eligible_profiles, active
               FROM class_groups
               WHERE active = 1 AND day_of_week = ?
               ORDER BY time_of_day, id"#,
        )?;

        let groups = stmt
            .query_map(params![day_of_week], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(groups)
    }

    /// Outra turma ativa do professor no mesmo dia e horário?
    pub fn exists_other_active_at_in(
        conn: &Connection,
        teacher_id: i64,
        day_of_week: i32,
        time_of_day: NaiveTime,
        ignore_class_group_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*)
               FROM class_groups
               WHERE active = 1
                 AND teacher_id = ?
                 AND day_of_week = ?
                 AND time_of_day = ?
                 AND id IS NOT ?"#,
            params![
                teacher_id,
                day_of_week,
                time_of_day.format("%H:%M").to_string(),
                ignore_class_group_id,
            ],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Mapeia uma linha do banco para ClassGroup
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ClassGroup> {
        let time_str: String = row.get(3)?;
        let time_of_day = NaiveTime::parse_from_str(&time_str, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&time_str, "%H:%M:%S"))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        let profiles_csv: String = row.get(8)?;
        let eligible_profiles = profiles_csv
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(ClassGroup {
            id: row.get(0)?,
            name: row.get(1)?,
            day_of_week: row.get(2)?,
            time_of_day,
            duration_minutes: row.get(4)?,
            room_id: row.get(5)?,
            teacher_id: row.get(6)?,
            max_capacity: row.get(7)?,
            eligible_profiles,
            active: row.get::<_, i32>(9)? == 1,
        })
    }
}

// ==========================================
// EnrollmentWindowRepository - vigências de matrícula
// ==========================================
pub struct EnrollmentWindowRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EnrollmentWindowRepository {
    /// Cria uma nova instância de EnrollmentWindowRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Vigências de um aluno
    pub fn find_for_student(&self, student_id: i64) -> RepositoryResult<Vec<EnrollmentWindow>> {
        let conn = self.get_conn()?;
        Self::find_for_student_in(&conn, student_id)
    }

    /// Variante com conexão emprestada
    pub fn find_for_student_in(
        conn: &Connection,
        student_id: i64,
    ) -> RepositoryResult<Vec<EnrollmentWindow>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, student_id, class_group_id, valid_from, valid_to
               FROM enrollment_windows
               WHERE student_id = ?
               ORDER BY valid_from"#,
        )?;

        let windows = stmt
            .query_map(params![student_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(windows)
    }

    /// Vigências de uma turma que cobrem a data
    pub fn find_covering_date_in(
        conn: &Connection,
        class_group_id: i64,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<EnrollmentWindow>> {
        let day = date.format("%Y-%m-%d").to_string();

        let mut stmt = conn.prepare(
            r#"SELECT id, student_id, class_group_id, valid_from, valid_to
               FROM enrollment_windows
               WHERE class_group_id = ?
                 AND valid_from <= ?
                 AND (valid_to IS NULL OR valid_to >= ?)
               ORDER BY student_id"#,
        )?;

        let windows = stmt
            .query_map(params![class_group_id, day, day], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(windows)
    }

    /// Vigências que intersectam o intervalo de datas
    pub fn find_intersecting_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<EnrollmentWindow>> {
        let conn = self.get_conn()?;
        Self::find_intersecting_range_in(&conn, from, to)
    }

    /// Variante com conexão emprestada
    pub fn find_intersecting_range_in(
        conn: &Connection,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<EnrollmentWindow>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, student_id, class_group_id, valid_from, valid_to
               FROM enrollment_windows
               WHERE valid_from <= ?
                 AND (valid_to IS NULL OR valid_to >= ?)
               ORDER BY student_id, valid_from"#,
        )?;

        let windows = stmt
            .query_map(
                params![
                    to.format("%Y-%m-%d").to_string(),
                    from.format("%Y-%m-%d").to_string(),
                ],
                Self::map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(windows)
    }

    /// Mapeia uma linha do banco para EnrollmentWindow
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<EnrollmentWindow> {
        Ok(EnrollmentWindow {
            id: row.get(0)?,
            student_id: row.get(1)?,
            class_group_id: row.get(2)?,
            valid_from: NaiveDate::parse_from_str(&row.get::<_, String>(3)?, "%Y-%m-%d")
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            valid_to: match row.get::<_, Option<String>>(4)? {
                Some(s) => Some(NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?),
                None => None,
            },
        })
    }
}
