// ==========================================
// ConfigApi - parâmetros operacionais
// ==========================================
// Leitura e gravação de chaves da tabela config_kv com trilha de
// auditoria registrando valor anterior e novo.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult, OperationResponse};
use crate::config::config_manager::ConfigManager;
use crate::domain::audit::{AuditAction, AuditLog, AuditPayload};
use crate::i18n::t;
use crate::repository::audit_log_repo::AuditLogRepository;

pub struct ConfigApi {
    config: Arc<ConfigManager>,
    audit_repo: AuditLogRepository,
}

impl ConfigApi {
    pub fn new(conn: Arc<Mutex<Connection>>, config: Arc<ConfigManager>) -> Self {
        Self {
            config,
            audit_repo: AuditLogRepository::new(conn),
        }
    }

    pub fn get_config_value(&self, key: &str) -> ApiResult<Option<String>> {
        self.config
            .get_global_config_value(key)
            .map_err(|e| ApiError::InternalError(format!("leitura de configuração: {}", e)))
    }

    /// Todas as chaves gravadas no escopo global, ordenadas por chave.
    ///
    /// Chaves nunca gravadas não aparecem aqui: o valor efetivo delas é o
    /// padrão embutido do gerenciador.
    pub fn list_config_values(&self) -> ApiResult<Vec<ConfigEntry>> {
        let entries = self
            .config
            .list_global_config_values()
            .map_err(|e| ApiError::InternalError(format!("listagem de configuração: {}", e)))?;

        Ok(entries
            .into_iter()
            .map(|(key, value, updated_at)| ConfigEntry {
                key,
                value,
                updated_at,
            })
            .collect())
    }

    pub fn set_config_value(
        &self,
        key: &str,
        value: &str,
        actor: &str,
    ) -> ApiResult<OperationResponse<()>> {
        OperationResponse::from_result(
            self.try_set_config_value(key, value, actor),
            t("common.success"),
        )
    }

    fn try_set_config_value(&self, key: &str, value: &str, actor: &str) -> ApiResult<()> {
        if key.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "chave de configuração vazia".to_string(),
            ));
        }

        let old_value = self
            .config
            .get_global_config_value(key)
            .map_err(|e| ApiError::InternalError(format!("leitura de configuração: {}", e)))?;
        self.config
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::InternalError(format!("gravação de configuração: {}", e)))?;

        let log = AuditLog::new(AuditAction::UpdateConfig, actor)
            .with_payload(&AuditPayload::Config {
                key: key.to_string(),
                old_value,
                new_value: value.to_string(),
            })
            .with_detail(format!("Configuração {} alterada", key));
        self.audit_repo.insert(&log)?;

        info!(key, actor, "configuração alterada");
        Ok(())
    }
}

// ==========================================
// DTOs
// ==========================================

/// Entrada gravada na tabela de configuração
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}
