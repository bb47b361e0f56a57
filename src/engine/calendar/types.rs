use crate::domain::occurrence::Occurrence;
use crate::domain::types::EventStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// CalendarStudent - aluno exibido na ocorrência
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarStudent {
    /// Id do aluno
    pub student_id: i64,

    /// Nome do aluno
    pub name: String,

    /// Presença (None = pendente)
    pub attendance: Option<bool>,

    /// Participação veio de transferência de reposição
    pub is_makeup: bool,
}

// ==========================================
// CalendarEntry - ocorrência do calendário
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Ocorrência persistida ou sintetizada
    pub occurrence: Occurrence,

    /// Status derivado (None quando sintetizada: ainda é só projeção)
    pub status: Option<EventStatus>,

    /// Título de exibição (nome da turma ou rótulo do tipo)
    pub title: String,

    /// Alunos vinculados à ocorrência
    pub students: Vec<CalendarStudent>,

    /// Professores vinculados à ocorrência
    pub teacher_ids: Vec<i64>,

    /// Número da semana de roteiro coberta
    pub week_number: Option<i32>,

    /// Tema da semana de roteiro
    pub theme: Option<String>,
}

// ==========================================
// CalendarFilters - filtros da consulta
// ==========================================
// Todos opcionais; filtros se combinam por E lógico. Ocorrências sem
// turma/professor/aluno (oficina e reuniões sintetizadas) só aparecem
// com o filtro vazio, pois não têm como satisfazer nenhuma dimensão.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarFilters {
    /// Restringe a uma turma
    pub class_group_id: Option<i64>,

    /// Restringe a um professor
    pub teacher_id: Option<i64>,

    /// Restringe a um aluno
    pub student_id: Option<i64>,

    /// Restringe a turmas que aceitam o perfil cognitivo
    pub cognitive_profile: Option<String>,
}

impl CalendarFilters {
    /// Nenhum filtro aplicado
    pub fn is_empty(&self) -> bool {
        self.class_group_id.is_none()
            && self.teacher_id.is_none()
            && self.student_id.is_none()
            && self.cognitive_profile.is_none()
    }
}
