// ==========================================
// Agenda Escolar - turma, vigência e cadastros de referência
// ==========================================
// Turma (ClassGroup): definição semanal recorrente; geradora de
// pseudo-eventos até a instância ser materializada.
// Vigência (EnrollmentWindow): janela de matrícula aluno x turma.
// Cadastros de sala/professor/aluno pertencem ao subsistema de
// gestão; o motor apenas lê (e grava somente os cursores e os
// ponteiros de primeira aula do aluno).
// ==========================================

use crate::domain::participation::WorkbookProgress;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ClassGroup - turma semanal recorrente
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassGroup {
    pub id: i64,                       // ID da turma
    pub name: String,                  // Nome (ex.: "Turma Seg 10h")
    pub day_of_week: i32,              // Dia da semana (0=segunda .. 6=domingo)
    pub time_of_day: NaiveTime,        // Horário da aula
    pub duration_minutes: i32,         // Duração em minutos
    pub room_id: i64,                  // Sala fixa
    pub teacher_id: i64,               // Professor titular
    pub max_capacity: i32,             // Capacidade máxima
    pub eligible_profiles: Vec<String>, // Perfis cognitivos elegíveis (vazio = sem restrição)
    pub active: bool,                  // Turma ativa
}

impl ClassGroup {
    /// A data cai no dia da semana desta turma
    pub fn matches_weekday(&self, date: NaiveDate) -> bool {
        date.weekday().num_days_from_monday() as i32 == self.day_of_week
    }

    /// Início da ocorrência da turma na data informada
    pub fn starts_at_on(&self, date: NaiveDate) -> NaiveDateTime {
        NaiveDateTime::new(date, self.time_of_day)
    }

    /// Perfil cognitivo aceito pela turma (conjunto vazio = irrestrito)
    pub fn accepts_profile(&self, profile: &str) -> bool {
        if self.eligible_profiles.is_empty() {
            return true;
        }
        let wanted = profile.trim().to_uppercase();
        self.eligible_profiles
            .iter()
            .any(|p| p.trim().to_uppercase() == wanted)
    }
}

// ==========================================
// EnrollmentWindow - vigência de matrícula
// ==========================================
// Invariante: no máximo uma vigência aberta (valid_to = NULL)
// por aluno; janelas históricas não se sobrepõem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentWindow {
    pub id: i64,                     // ID da vigência
    pub student_id: i64,             // Aluno
    pub class_group_id: i64,         // Turma
    pub valid_from: NaiveDate,       // Início da vigência
    pub valid_to: Option<NaiveDate>, // Fim da vigência (inclusivo; NULL = aberta)
}

impl EnrollmentWindow {
    /// A vigência cobre a data informada (limites inclusivos)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && self.valid_to.map_or(true, |end| date <= end)
    }

    /// A vigência intersecta o intervalo [from, to] (inclusivo)
    pub fn intersects(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.valid_from <= to && self.valid_to.map_or(true, |end| end >= from)
    }
}

/// Resolve qual vigência do aluno cobria a data informada
///
/// Janelas históricas não se sobrepõem; havendo mais de uma por
/// inconsistência de cadastro, vence a de início mais recente.
pub fn active_window_for_date<'a>(
    windows: &'a [EnrollmentWindow],
    student_id: i64,
    date: NaiveDate,
) -> Option<&'a EnrollmentWindow> {
    windows
        .iter()
        .filter(|w| w.student_id == student_id && w.covers(date))
        .max_by_key(|w| w.valid_from)
}

// ==========================================
// Student - cadastro de aluno
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,                            // ID do aluno
    pub name: String,                       // Nome
    pub active: bool,                       // Aluno ativo
    pub cognitive_profile: String,          // Perfil cognitivo
    pub workbook: WorkbookProgress,         // Posição atual nas apostilas
    pub first_class_event_id: Option<i64>,  // Evento marcado como primeira aula
    pub zero_class_event_id: Option<i64>,   // Evento marcado como aula zero
}

// ==========================================
// Teacher - cadastro de professor
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,      // ID do professor
    pub name: String, // Nome
    pub active: bool, // Professor ativo
}

// ==========================================
// Room - cadastro de sala
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,               // ID da sala
    pub name: String,          // Nome
    pub capacity: Option<i32>, // Capacidade física (informativa)
    pub active: bool,          // Sala ativa
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(id: i64, from: (i32, u32, u32), to: Option<(i32, u32, u32)>) -> EnrollmentWindow {
        EnrollmentWindow {
            id,
            student_id: 1,
            class_group_id: 10,
            valid_from: NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
            valid_to: to.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        }
    }

    #[test]
    fn test_covers_limites_inclusivos() {
        let w = window(1, (2026, 2, 1), Some((2026, 6, 30)));
        assert!(w.covers(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
        assert!(w.covers(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()));
        assert!(!w.covers(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()));
        assert!(!w.covers(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()));
    }

    #[test]
    fn test_vigencia_aberta_cobre_futuro() {
        let w = window(1, (2026, 2, 1), None);
        assert!(w.covers(NaiveDate::from_ymd_opt(2030, 12, 25).unwrap()));
    }

    #[test]
    fn test_active_window_for_date_historico() {
        // Aluno trocou de turma: duas janelas consecutivas
        let windows = vec![
            window(1, (2025, 2, 1), Some((2025, 7, 31))),
            window(2, (2025, 8, 1), None),
        ];

        let early = active_window_for_date(&windows, 1, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(early.map(|w| w.id), Some(1));

        let late = active_window_for_date(&windows, 1, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert_eq!(late.map(|w| w.id), Some(2));

        let none = active_window_for_date(&windows, 1, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(none.is_none());

        let other_student =
            active_window_for_date(&windows, 99, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert!(other_student.is_none());
    }

    #[test]
    fn test_accepts_profile() {
        let mut group = ClassGroup {
            id: 10,
            name: "Turma Seg 10h".to_string(),
            day_of_week: 0,
            time_of_day: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_minutes: 120,
            room_id: 5,
            teacher_id: 1,
            max_capacity: 12,
            eligible_profiles: vec!["INFANTIL".to_string(), "JUVENIL".to_string()],
            active: true,
        };

        assert!(group.accepts_profile("infantil"));
        assert!(!group.accepts_profile("ADULTO"));

        // Conjunto vazio libera qualquer perfil
        group.eligible_profiles.clear();
        assert!(group.accepts_profile("ADULTO"));
    }

    #[test]
    fn test_matches_weekday() {
        let group = ClassGroup {
            id: 10,
            name: "Turma Seg 10h".to_string(),
            day_of_week: 0, // segunda
            time_of_day: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_minutes: 120,
            room_id: 5,
            teacher_id: 1,
            max_capacity: 12,
            eligible_profiles: vec![],
            active: true,
        };

        // 2026-03-02 é segunda-feira
        assert!(group.matches_weekday(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
        assert!(!group.matches_weekday(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()));
    }
}
