// ==========================================
// Agenda Escolar - participações em eventos
// ==========================================
// Participação de aluno: vínculo aluno x evento com presença,
// cursores de apostila e referência de reposição.
// Participação de professor: vínculo professor x evento.
// ==========================================

use crate::domain::types::ContactStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// WorkbookProgress - cursores de apostila
// ==========================================
// Dois cursores independentes: ábaco e apostila de desafios.
// Copiados do cadastro do aluno na criação da participação e
// gravados de volta na finalização.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookProgress {
    pub abacus_book: Option<i32>,    // Livro de ábaco
    pub abacus_page: Option<i32>,    // Página de ábaco
    pub challenge_book: Option<i32>, // Apostila de desafios
    pub challenge_page: Option<i32>, // Página de desafios
}

impl WorkbookProgress {
    pub fn is_empty(&self) -> bool {
        self.abacus_book.is_none()
            && self.abacus_page.is_none()
            && self.challenge_book.is_none()
            && self.challenge_page.is_none()
    }
}

// ==========================================
// StudentParticipation - participação de aluno
// ==========================================
// Nunca é removida fisicamente depois que o evento finaliza;
// desativação é sempre soft (deactivated_at).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentParticipation {
    pub id: i64,                               // ID da participação
    pub event_id: i64,                         // Evento
    pub student_id: i64,                       // Aluno
    pub attendance: Option<bool>,              // None=pendente, true=presente, false=falta
    pub deactivated_at: Option<NaiveDateTime>, // Desativação soft
    pub made_up_from_event_id: Option<i64>,    // Evento de origem da reposição
    pub contact_status: ContactStatus,         // Status de contato pós-falta
    pub workbook: WorkbookProgress,            // Cursores de apostila (snapshot)
    pub created_at: NaiveDateTime,             // Criada em
    pub updated_at: NaiveDateTime,             // Atualizada em
}

impl StudentParticipation {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }

    /// Participação criada por transferência de reposição
    pub fn is_makeup(&self) -> bool {
        self.made_up_from_event_id.is_some()
    }
}

// ==========================================
// NewStudentParticipation - dados para inserção
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudentParticipation {
    pub event_id: i64,                      // Evento
    pub student_id: i64,                    // Aluno
    pub made_up_from_event_id: Option<i64>, // Origem de reposição, se houver
    pub workbook: WorkbookProgress,         // Snapshot dos cursores do aluno
}

// ==========================================
// TeacherParticipation - participação de professor
// ==========================================
// Troca de professor em evento substitui a participação:
// a antiga é desativada e uma nova é inserida.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherParticipation {
    pub id: i64,                               // ID da participação
    pub event_id: i64,                         // Evento
    pub teacher_id: i64,                       // Professor
    pub attendance: Option<bool>,              // Presença do professor
    pub observation: Option<String>,           // Observação registrada na finalização
    pub deactivated_at: Option<NaiveDateTime>, // Desativação soft
    pub created_at: NaiveDateTime,             // Criada em
    pub updated_at: NaiveDateTime,             // Atualizada em
}

impl TeacherParticipation {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }
}
