// ==========================================
// Agenda Escolar - repositório da trilha de auditoria
// ==========================================
// Regra da camada: toda operação de escrita bem-sucedida registra
// uma entrada; a inserção roda na mesma transação da operação.
// ==========================================

use crate::domain::audit::AuditLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// AuditLogRepository
// ==========================================
pub struct AuditLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AuditLogRepository {
    /// Cria uma nova instância de AuditLogRepository
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insere um registro de auditoria
    pub fn insert(&self, log: &AuditLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, log)
    }

    /// Insere usando a conexão emprestada
    pub fn insert_in(conn: &Connection, log: &AuditLog) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO audit_log (
                audit_id, action_type, action_ts, actor, payload_json, detail
            ) VALUES (?, ?, ?, ?, ?, ?)"#,
            params![
                &log.audit_id,
                &log.action_type,
                log.action_ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                &log.actor,
                log.payload_json.as_ref().map(|v| v.to_string()),
                &log.detail,
            ],
        )?;

        Ok(())
    }

    /// Registros mais recentes, do mais novo para o mais antigo
    pub fn find_recent(&self, limit: u32) -> RepositoryResult<Vec<AuditLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT audit_id, action_type, action_ts, actor, payload_json, detail
               FROM audit_log
               ORDER BY action_ts DESC, audit_id DESC
               LIMIT ?"#,
        )?;

        let logs = stmt
            .query_map(params![limit], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(logs)
    }

    /// Registros de um tipo de ação, do mais novo para o mais antigo
    pub fn find_by_action(&self, action_type: &str, limit: u32) -> RepositoryResult<Vec<AuditLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT audit_id, action_type, action_ts, actor, payload_json, detail
               FROM audit_log
               WHERE action_type = ?
               ORDER BY action_ts DESC, audit_id DESC
               LIMIT ?"#,
        )?;

        let logs = stmt
            .query_map(params![action_type, limit], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(logs)
    }

    /// Mapeia uma linha do banco para AuditLog
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<AuditLog> {
        Ok(AuditLog {
            audit_id: row.get(0)?,
            action_type: row.get(1)?,
            action_ts: NaiveDateTime::parse_from_str(
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
            actor: row.get(3)?,
            payload_json: row
                .get::<_, Option<String>>(4)?
                .and_then(|s| serde_json::from_str(&s).ok()),
            detail: row.get(5)?,
        })
    }
}
