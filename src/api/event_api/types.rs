// ==========================================
// DTOs do ciclo de vida de eventos
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::event::Event;
use crate::domain::participation::{StudentParticipation, TeacherParticipation, WorkbookProgress};
use crate::domain::types::{EventStatus, EventType};

// ==========================================
// Criação
// ==========================================

/// Pedido de criação de evento.
///
/// Para aula regular com `student_ids` vazio, a lista de alunos é
/// preenchida a partir das vigências de matrícula da turma na data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub event_type: EventType,         // Tipo do evento
    pub scheduled_at: NaiveDateTime,   // Início
    pub duration_minutes: i32,         // Duração em minutos
    pub room_id: i64,                  // Sala
    pub max_capacity: i32,             // Vagas
    pub class_group_id: Option<i64>,   // Turma (obrigatória em aula regular)
    pub curriculum_week_id: Option<i64>, // Semana do roteiro, se aplicável
    #[serde(default)]
    pub teacher_ids: Vec<i64>,         // Professores escalados
    #[serde(default)]
    pub student_ids: Vec<i64>,         // Alunos (vazio = matrícula vigente)
}

// ==========================================
// Atualização
// ==========================================

/// Pedido de atualização de horário/sala/capacidade.
///
/// `teacher_ids = None` mantém a escala atual; `Some(lista)` substitui
/// a escala, desativando participações de quem saiu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub event_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub room_id: i64,
    pub max_capacity: i32,
    pub curriculum_week_id: Option<i64>,
    #[serde(default)]
    pub teacher_ids: Option<Vec<i64>>,
}

// ==========================================
// Reagendamento
// ==========================================

/// Pedido de reagendamento: cancela o evento original e cria um
/// substituto com `rescheduled_from_id` apontando para ele.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleEventRequest {
    pub event_id: i64,
    pub new_scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub new_room_id: Option<i64>, // None = mesma sala
    #[serde(default)]
    pub new_duration_minutes: Option<i32>, // None = mesma duração
}

// ==========================================
// Fechamento
// ==========================================

/// Resultado de presença de um aluno no fechamento do evento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeStudentResult {
    pub student_id: i64,
    pub attendance: bool,
    pub workbook: WorkbookProgress, // Cursores apurados na aula
    #[serde(default)]
    pub made_up_from_event_id: Option<i64>, // Presença veio de reposição
}

/// Resultado de presença de um professor no fechamento do evento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeTeacherResult {
    pub teacher_id: i64,
    pub attendance: bool,
    #[serde(default)]
    pub observation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeEventRequest {
    pub event_id: i64,
    pub student_results: Vec<FinalizeStudentResult>,
    pub teacher_results: Vec<FinalizeTeacherResult>,
}

// ==========================================
// Consulta
// ==========================================

/// Evento com status derivado e participações ativas anexadas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetail {
    pub event: Event,
    pub status: EventStatus,
    pub student_participations: Vec<StudentParticipation>,
    pub teacher_participations: Vec<TeacherParticipation>,
}
