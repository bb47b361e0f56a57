// ==========================================
// Agenda Escolar - repositório de semanas de roteiro
// ==========================================
// O ano letivo é particionado em semanas temáticas numeradas;
// semanas de recesso não recebem aula.
// ==========================================

use crate::domain::curriculum::CurriculumWeek;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// CurriculumWeekRepository
// ==========================================
pub struct CurriculumWeekRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CurriculumWeekRepository {
    /// Cria uma nova instância de CurriculumWeekRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Busca semana por id
    pub fn find_by_id(&self, week_id: i64) -> RepositoryResult<Option<CurriculumWeek>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, week_id)
    }

    /// Variante com conexão emprestada
    pub fn find_by_id_in(conn: &Connection, week_id: i64) -> RepositoryResult<Option<CurriculumWeek>> {
        match conn.query_row(
            r#"SELECT id, week_number, start_date, end_date, theme, color_tag, is_recess
               FROM curriculum_weeks
               WHERE id = ?"#,
            params![week_id],
            Self::map_row,
        ) {
            Ok(week) => Ok(Some(week)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Semanas que intersectam o ano civil, em ordem cronológica
    pub fn weeks_for_year(&self, year: i32) -> RepositoryResult<Vec<CurriculumWeek>> {
        let conn = self.get_conn()?;
        Self::weeks_for_year_in(&conn, year)
    }

    /// Variante com conexão emprestada
    pub fn weeks_for_year_in(conn: &Connection, year: i32) -> RepositoryResult<Vec<CurriculumWeek>> {
        Self::weeks_in_range_in(
            conn,
            NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default(),
            NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or_default(),
        )
    }

    /// Semanas que intersectam o intervalo de datas
    pub fn weeks_in_range_in(
        conn: &Connection,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<CurriculumWeek>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, week_number, start_date, end_date, theme, color_tag, is_recess
               FROM curriculum_weeks
               WHERE start_date <= ? AND end_date >= ?
               ORDER BY start_date"#,
        )?;

        let weeks = stmt
            .query_map(
                params![
                    to.format("%Y-%m-%d").to_string(),
                    from.format("%Y-%m-%d").to_string(),
                ],
                Self::map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(weeks)
    }

    /// Semana que cobre a data, se houver
    pub fn week_covering_in(
        conn: &Connection,
        date: NaiveDate,
    ) -> RepositoryResult<Option<CurriculumWeek>> {
        let day = date.format("%Y-%m-%d").to_string();

        match conn.query_row(
            r#"SELECT id, week_number, start_date, end_date, theme, color_tag, is_recess
               FROM curriculum_weeks
               WHERE start_date <= ? AND end_date >= ?
               ORDER BY start_date
               LIMIT 1"#,
            params![day, day],
            Self::map_row,
        ) {
            Ok(week) => Ok(Some(week)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Mapeia uma linha do banco para CurriculumWeek
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<CurriculumWeek> {
        Ok(CurriculumWeek {
            id: row.get(0)?,
            week_number: row.get(1)?,
            start_date: NaiveDate::parse_from_str(&row.get::<_, String>(2)?, "%Y-%m-%d")
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            end_date: NaiveDate::parse_from_str(&row.get::<_, String>(3)?, "%Y-%m-%d")
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            theme: row.get(4)?,
            color_tag: row.get(5)?,
            is_recess: row.get::<_, i32>(6)? == 1,
        })
    }
}
