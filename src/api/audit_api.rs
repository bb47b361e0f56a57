// ==========================================
// AuditApi - consulta da trilha de auditoria
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::error::ApiResult;
use crate::domain::audit::{AuditAction, AuditLog};
use crate::repository::audit_log_repo::AuditLogRepository;

pub struct AuditApi {
    repo: AuditLogRepository,
}

impl AuditApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            repo: AuditLogRepository::new(conn),
        }
    }

    /// Registros mais recentes, do mais novo para o mais antigo.
    pub fn recent(&self, limit: u32) -> ApiResult<Vec<AuditLog>> {
        Ok(self.repo.find_recent(limit)?)
    }

    /// Registros de uma ação específica.
    pub fn by_action(&self, action: AuditAction, limit: u32) -> ApiResult<Vec<AuditLog>> {
        Ok(self.repo.find_by_action(action.as_str(), limit)?)
    }
}
