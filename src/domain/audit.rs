// ==========================================
// Agenda Escolar - trilha de auditoria
// ==========================================
// Toda operação de escrita bem-sucedida gera um registro em
// audit_log com ator, ação e payload estruturado.
// ==========================================

use crate::domain::event::Event;
use crate::domain::types::ContactStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// ==========================================
// Ação auditada (Audit Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateEvent,
    UpdateEvent,
    CancelEvent,
    RescheduleEvent,
    FinalizeEvent,
    ReopenEvent,
    AddStudentParticipation,
    CancelStudentParticipation,
    UpdateContactStatus,
    TransferMakeup,
    UpdateConfig,
}

impl AuditAction {
    /// String armazenada na coluna action_type
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CreateEvent => "CREATE_EVENT",
            AuditAction::UpdateEvent => "UPDATE_EVENT",
            AuditAction::CancelEvent => "CANCEL_EVENT",
            AuditAction::RescheduleEvent => "RESCHEDULE_EVENT",
            AuditAction::FinalizeEvent => "FINALIZE_EVENT",
            AuditAction::ReopenEvent => "REOPEN_EVENT",
            AuditAction::AddStudentParticipation => "ADD_STUDENT_PARTICIPATION",
            AuditAction::CancelStudentParticipation => "CANCEL_STUDENT_PARTICIPATION",
            AuditAction::UpdateContactStatus => "UPDATE_CONTACT_STATUS",
            AuditAction::TransferMakeup => "TRANSFER_MAKEUP",
            AuditAction::UpdateConfig => "UPDATE_CONFIG",
        }
    }

    /// Converte a partir da string do banco
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATE_EVENT" => Some(AuditAction::CreateEvent),
            "UPDATE_EVENT" => Some(AuditAction::UpdateEvent),
            "CANCEL_EVENT" => Some(AuditAction::CancelEvent),
            "RESCHEDULE_EVENT" => Some(AuditAction::RescheduleEvent),
            "FINALIZE_EVENT" => Some(AuditAction::FinalizeEvent),
            "REOPEN_EVENT" => Some(AuditAction::ReopenEvent),
            "ADD_STUDENT_PARTICIPATION" => Some(AuditAction::AddStudentParticipation),
            "CANCEL_STUDENT_PARTICIPATION" => Some(AuditAction::CancelStudentParticipation),
            "UPDATE_CONTACT_STATUS" => Some(AuditAction::UpdateContactStatus),
            "TRANSFER_MAKEUP" => Some(AuditAction::TransferMakeup),
            "UPDATE_CONFIG" => Some(AuditAction::UpdateConfig),
            _ => None,
        }
    }
}

// ==========================================
// Payload estruturado por tipo de entidade
// ==========================================
// Serializado em payload_json; o discriminante "entity" permite
// reconstruir o formato certo ao consultar a trilha.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditPayload {
    /// Snapshot completo do evento (criação / edição)
    Event { event: Event },
    /// Transição de estado do ciclo de vida
    Transition {
        event_id: i64,
        from: String,
        to: String,
        reason: Option<String>,
    },
    /// Reagendamento: origem cancelada + substituto criado
    Reschedule {
        source_event_id: i64,
        replacement_event_id: i64,
        new_scheduled_at: NaiveDateTime,
        new_room_id: i64,
        carried_students: usize,
    },
    /// Participação de aluno adicionada ou desativada
    Participation {
        participation_id: i64,
        event_id: i64,
        student_id: i64,
        made_up_from_event_id: Option<i64>,
    },
    /// Mudança de status de contato pós-falta
    Contact {
        event_id: i64,
        student_id: i64,
        status: ContactStatus,
    },
    /// Transferência de reposição entre eventos
    Makeup {
        student_id: i64,
        source_event_id: i64,
        destination_event_id: i64,
        retroactive_absence: bool,
    },
    /// Fechamento de presenças
    Finalization {
        event_id: i64,
        present: usize,
        absent: usize,
    },
    /// Alteração de configuração
    Config {
        key: String,
        old_value: Option<String>,
        new_value: String,
    },
}

// ==========================================
// AuditLog - registro da trilha
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub audit_id: String,                // UUID do registro
    pub action_type: String,             // Ação (CREATE_EVENT, ...)
    pub action_ts: NaiveDateTime,        // Momento da ação
    pub actor: String,                   // Quem executou
    pub payload_json: Option<JsonValue>, // Payload estruturado
    pub detail: Option<String>,          // Descrição legível
}

impl AuditLog {
    /// Cria um registro para a ação, datado de agora
    pub fn new(action: AuditAction, actor: &str) -> Self {
        Self {
            audit_id: Uuid::new_v4().to_string(),
            action_type: action.as_str().to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.to_string(),
            payload_json: None,
            detail: None,
        }
    }

    /// Anexa o payload estruturado
    pub fn with_payload(mut self, payload: &AuditPayload) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// Anexa a descrição legível
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        for action in [
            AuditAction::CreateEvent,
            AuditAction::CancelEvent,
            AuditAction::RescheduleEvent,
            AuditAction::TransferMakeup,
            AuditAction::UpdateConfig,
        ] {
            assert_eq!(AuditAction::from_str(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::from_str("ACAO_INEXISTENTE"), None);
    }

    #[test]
    fn test_payload_com_discriminante_entity() {
        let payload = AuditPayload::Makeup {
            student_id: 7,
            source_event_id: 10,
            destination_event_id: 11,
            retroactive_absence: true,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["entity"], "MAKEUP");
        assert_eq!(value["student_id"], 7);
    }

    #[test]
    fn test_builder_de_registro() {
        let log = AuditLog::new(AuditAction::CancelEvent, "secretaria")
            .with_detail("Cancelamento de teste")
            .with_payload(&AuditPayload::Transition {
                event_id: 3,
                from: "ACTIVE".to_string(),
                to: "CANCELED".to_string(),
                reason: Some("chuva".to_string()),
            });

        assert_eq!(log.action_type, "CANCEL_EVENT");
        assert_eq!(log.actor, "secretaria");
        assert!(log.payload_json.is_some());
        assert_eq!(log.payload_json.unwrap()["entity"], "TRANSITION");
    }
}
