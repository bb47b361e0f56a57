// ==========================================
// Agenda Escolar - repositório de alunos
// ==========================================
// Cadastro de aluno é dado de referência; o motor só escreve os
// cursores de apostila e os ponteiros de primeira aula / aula zero.
// ==========================================

use crate::domain::class_group::Student;
use crate::domain::participation::WorkbookProgress;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// StudentRepository - alunos
// ==========================================
pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    /// Cria uma nova instância de StudentRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Busca aluno por id
    pub fn find_by_id(&self, student_id: i64) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, student_id)
    }

    /// Variante com conexão emprestada
    pub fn find_by_id_in(conn: &Connection, student_id: i64) -> RepositoryResult<Option<Student>> {
        match conn.query_row(
            r#"SELECT id, name, active, cognitive_profile,
                      abacus_book, abacus_page, challenge_book, challenge_page,
                      first_class_event_id, zero_class_event_id
               FROM students
               WHERE id = ?"#,
            params![student_id],
            Self::map_row,
        ) {
            Ok(student) => Ok(Some(student)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Aluno existe e está ativo?
    pub fn exists_active_in(conn: &Connection, student_id: i64) -> RepositoryResult<bool> {
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM students WHERE id = ? AND active = 1"#,
            params![student_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Lista todos os alunos
    pub fn list_all(&self) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        Self::list_all_in(&conn)
    }

    /// Variante com conexão emprestada
    pub fn list_all_in(conn: &Connection) -> RepositoryResult<Vec<Student>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, name, active, cognitive_profile,
                      abacus_book, abacus_page, challenge_book, challenge_page,
                      first_class_event_id, zero_class_event_id
               FROM students
               ORDER BY name, id"#,
        )?;

        let students = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(students)
    }

    /// Atualiza os cursores de apostila do aluno
    pub fn update_workbook_in(
        conn: &Connection,
        student_id: i64,
        workbook: &WorkbookProgress,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE students
               SET abacus_book = ?, abacus_page = ?,
                   challenge_book = ?, challenge_page = ?
               WHERE id = ?"#,
            params![
                workbook.abacus_book,
                workbook.abacus_page,
                workbook.challenge_book,
                workbook.challenge_page,
                student_id,
            ],
        )?;

        Ok(count)
    }

    /// Reaponta o ponteiro de primeira aula do aluno
    pub fn set_first_class_event_in(
        conn: &Connection,
        student_id: i64,
        event_id: Option<i64>,
    ) -> RepositoryResult<usize> {
        let count = conn.execute(
            r#"UPDATE students SET first_class_event_id = ? WHERE id = ?"#,
            params![event_id, student_id],
        )?;

        Ok(count)
    }

    /// Limpa ponteiros de primeira aula / aula zero que referenciam o evento
    ///
    /// Chamado no cancelamento: o evento some da agenda e os marcos do
    /// aluno voltam a ficar pendentes.
    pub fn clear_event_pointers_in(conn: &Connection, event_id: i64) -> RepositoryResult<usize> {
        let first = conn.execute(
            r#"UPDATE students SET first_class_event_id = NULL WHERE first_class_event_id = ?"#,
            params![event_id],
        )?;

        let zero = conn.execute(
            r#"UPDATE students SET zero_class_event_id = NULL WHERE zero_class_event_id = ?"#,
            params![event_id],
        )?;

        Ok(first + zero)
    }

    /// Mapeia uma linha do banco para Student
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Student> {
        Ok(Student {
            id: row.get(0)?,
            name: row.get(1)?,
            active: row.get::<_, i32>(2)? == 1,
            cognitive_profile: row.get(3)?,
            workbook: WorkbookProgress {
                abacus_book: row.get(4)?,
                abacus_page: row.get(5)?,
                challenge_book: row.get(6)?,
                challenge_page: row.get(7)?,
            },
            first_class_event_id: row.get(8)?,
            zero_class_event_id: row.get(9)?,
        })
    }
}
