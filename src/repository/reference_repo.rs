// ==========================================
// Agenda Escolar - repositórios de salas e professores
// ==========================================
// Dados de referência mantidos fora do motor; aqui só leitura.
// ==========================================

use crate::domain::class_group::{Room, Teacher};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// RoomRepository - salas
// ==========================================
pub struct RoomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoomRepository {
    /// Cria uma nova instância de RoomRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Busca sala por id
    pub fn find_by_id(&self, room_id: i64) -> RepositoryResult<Option<Room>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, room_id)
    }

    /// Variante com conexão emprestada
    pub fn find_by_id_in(conn: &Connection, room_id: i64) -> RepositoryResult<Option<Room>> {
        match conn.query_row(
            r#"SELECT id, name, capacity, active FROM rooms WHERE id = ?"#,
            params![room_id],
            Self::map_row,
        ) {
            Ok(room) => Ok(Some(room)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Sala existe e está ativa?
    pub fn exists_active_in(conn: &Connection, room_id: i64) -> RepositoryResult<bool> {
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM rooms WHERE id = ? AND active = 1"#,
            params![room_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Mapeia uma linha do banco para Room
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Room> {
        Ok(Room {
            id: row.get(0)?,
            name: row.get(1)?,
            capacity: row.get(2)?,
            active: row.get::<_, i32>(3)? == 1,
        })
    }
}

// ==========================================
// TeacherRepository - professores
// ==========================================
pub struct TeacherRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeacherRepository {
    /// Cria uma nova instância de TeacherRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Busca professor por id
    pub fn find_by_id(&self, teacher_id: i64) -> RepositoryResult<Option<Teacher>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, teacher_id)
    }

    /// Variante com conexão emprestada
    pub fn find_by_id_in(conn: &Connection, teacher_id: i64) -> RepositoryResult<Option<Teacher>> {
        match conn.query_row(
            r#"SELECT id, name, active FROM teachers WHERE id = ?"#,
            params![teacher_id],
            Self::map_row,
        ) {
            Ok(teacher) => Ok(Some(teacher)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Professor existe e está ativo?
    pub fn exists_active_in(conn: &Connection, teacher_id: i64) -> RepositoryResult<bool> {
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM teachers WHERE id = ? AND active = 1"#,
            params![teacher_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Mapeia uma linha do banco para Teacher
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Teacher> {
        Ok(Teacher {
            id: row.get(0)?,
            name: row.get(1)?,
            active: row.get::<_, i32>(2)? == 1,
        })
    }
}
