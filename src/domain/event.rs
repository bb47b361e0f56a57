// ==========================================
// Agenda Escolar - modelo de domínio de evento
// ==========================================
// Um evento é uma ocorrência agendada: aula regular (instância
// de turma), aula extra, aula zero, oficina, reunião ou superação.
// ==========================================

use crate::domain::types::{EventStatus, EventType};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Event - evento agendado
// ==========================================
// Invariantes:
// - evento com canceled_at preenchido é imutável (exceto os próprios
//   metadados de cancelamento)
// - finalized só volta a false pela operação explícita de reabertura
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,                            // ID do evento
    pub event_type: EventType,              // Tipo do evento
    pub scheduled_at: NaiveDateTime,        // Data e hora agendadas
    pub duration_minutes: i32,              // Duração em minutos
    pub room_id: i64,                       // Sala
    pub max_capacity: i32,                  // Capacidade máxima de alunos
    pub finalized: bool,                    // Finalizado (presenças travadas)
    pub canceled_at: Option<NaiveDateTime>, // Momento do cancelamento (soft)
    pub cancel_reason: Option<String>,      // Motivo do cancelamento
    pub rescheduled_from_id: Option<i64>,   // Evento que este substitui (reagendamento)
    pub class_group_id: Option<i64>,        // Turma (quando instância de aula regular)
    pub curriculum_week_id: Option<i64>,    // Semana de roteiro vinculada
    pub created_by: String,                 // Ator que criou
    pub created_at: NaiveDateTime,          // Criado em
    pub updated_at: NaiveDateTime,          // Atualizado em
}

impl Event {
    /// Fim do intervalo ocupado (exclusivo): scheduled_at + duração
    pub fn ends_at(&self) -> NaiveDateTime {
        self.scheduled_at + Duration::minutes(self.duration_minutes as i64)
    }

    /// Data da ocorrência (componente de data de scheduled_at)
    pub fn occurrence_date(&self) -> NaiveDate {
        self.scheduled_at.date()
    }

    /// Evento ainda ativo (não cancelado)
    pub fn is_active(&self) -> bool {
        self.canceled_at.is_none()
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }

    /// Status derivado do próprio registro
    ///
    /// Cancelamento por reagendamento só é distinguível olhando o
    /// substituto; `superseded` indica se existe evento ativo com
    /// rescheduled_from_id apontando para este.
    pub fn status(&self, superseded: bool) -> EventStatus {
        if self.canceled_at.is_some() {
            if superseded {
                EventStatus::Rescheduled
            } else {
                EventStatus::Canceled
            }
        } else if self.finalized {
            EventStatus::Finalized
        } else {
            EventStatus::Active
        }
    }
}

// ==========================================
// NewEvent - dados para inserção de evento
// ==========================================
// O id é gerado pelo banco (rowid); created_at/updated_at são
// preenchidos no momento da inserção.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub event_type: EventType,            // Tipo do evento
    pub scheduled_at: NaiveDateTime,      // Data e hora agendadas
    pub duration_minutes: i32,            // Duração em minutos
    pub room_id: i64,                     // Sala
    pub max_capacity: i32,                // Capacidade máxima
    pub rescheduled_from_id: Option<i64>, // Evento substituído (reagendamento)
    pub class_group_id: Option<i64>,      // Turma vinculada
    pub curriculum_week_id: Option<i64>,  // Semana de roteiro
    pub created_by: String,               // Ator que cria
}
