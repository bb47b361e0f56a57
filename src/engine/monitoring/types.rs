use crate::domain::curriculum::CurriculumWeek;
use crate::domain::participation::WorkbookProgress;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// WeekColumn - coluna da matriz (semana de roteiro)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekColumn {
    pub curriculum_week_id: i64,
    pub week_number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub theme: String,
    pub color_tag: Option<String>,
    pub is_recess: bool,
}

impl From<&CurriculumWeek> for WeekColumn {
    fn from(week: &CurriculumWeek) -> Self {
        Self {
            curriculum_week_id: week.id,
            week_number: week.week_number,
            start_date: week.start_date,
            end_date: week.end_date,
            theme: week.theme.clone(),
            color_tag: week.color_tag.clone(),
            is_recess: week.is_recess,
        }
    }
}

// ==========================================
// MakeupLink - elo da cadeia de reposição
// ==========================================
// Cada elo aponta a ocorrência de destino da transferência, com a
// anotação de semana/feriado da própria data de destino.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeupLink {
    /// Evento de destino da reposição
    pub event_id: i64,

    /// Data da ocorrência de destino
    pub occurrence_date: NaiveDate,

    /// Presença registrada no destino (None = pendente)
    pub attendance: Option<bool>,

    /// Número da semana de roteiro da data de destino
    pub week_number: Option<i32>,

    /// Tema da semana de roteiro da data de destino
    pub theme: Option<String>,

    /// Feriado na data de destino, se houver
    pub holiday: Option<String>,

    /// Rótulo de exibição do elo
    pub status_label: String,
}

// ==========================================
// MonitoringCell - célula da matriz
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringCell {
    /// Semana de roteiro da célula
    pub curriculum_week_id: i64,

    /// Célula exibida na matriz (false: recesso, feriado, sem vigência
    /// ou não resolvida)
    pub visible: bool,

    /// Rótulo de exibição (catálogo i18n)
    pub status_label: String,

    /// Data concreta da ocorrência resolvida
    pub occurrence_date: Option<NaiveDate>,

    /// Evento persistido resolvido, se houver
    pub event_id: Option<i64>,

    /// Turma resolvida pela vigência
    pub class_group_id: Option<i64>,

    /// Presença (None = pendente)
    pub attendance: Option<bool>,

    /// Cursores de apostila (da participação ou do cadastro do aluno)
    pub workbook: Option<WorkbookProgress>,

    /// Cadeia de reposição a partir desta célula, em ordem
    pub makeup_links: Vec<MakeupLink>,
}

impl MonitoringCell {
    /// Célula oculta com apenas o rótulo de motivo
    pub fn hidden(curriculum_week_id: i64, status_label: String) -> Self {
        Self {
            curriculum_week_id,
            visible: false,
            status_label,
            occurrence_date: None,
            event_id: None,
            class_group_id: None,
            attendance: None,
            workbook: None,
            makeup_links: Vec::new(),
        }
    }
}

// ==========================================
// StudentRow - linha da matriz (aluno)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRow {
    pub student_id: i64,
    pub student_name: String,

    /// Células alinhadas com a ordem das colunas de semana
    pub cells: Vec<MonitoringCell>,
}

// ==========================================
// YearMatrix - matriz anual
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearMatrix {
    pub year: i32,
    pub weeks: Vec<WeekColumn>,
    pub rows: Vec<StudentRow>,
}

// ==========================================
// MonitoringFilters - filtros da consulta
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringFilters {
    /// Restringe as linhas a alunos com vigência nesta turma no ano
    pub class_group_id: Option<i64>,

    /// Restringe as linhas a estes alunos
    pub student_ids: Option<Vec<i64>>,
}

impl MonitoringFilters {
    pub fn allows_student(&self, student_id: i64) -> bool {
        self.student_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&student_id))
    }
}
