// ==========================================
// Agenda Escolar - ocorrência de calendário
// ==========================================
// União discriminada: ocorrência persistida (linha de events) ou
// sintetizada (projeção de turma/atividade fixa sem linha própria).
// Substitui o id sentinela -1 usado para pseudo-eventos.
// ==========================================

use crate::domain::event::Event;
use crate::domain::types::{EventType, MeetingKind};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// PseudoEvent - ocorrência sintetizada
// ==========================================
// Nunca é gravado; existe apenas na resposta de calendário.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PseudoEvent {
    pub event_type: EventType,             // Tipo projetado
    pub meeting_kind: Option<MeetingKind>, // Tipo de reunião fixa, quando aplicável
    pub class_group_id: Option<i64>,       // Turma geradora, quando aula regular
    pub occurrence_date: NaiveDate,        // Data da ocorrência
    pub scheduled_at: NaiveDateTime,       // Data e hora projetadas
    pub duration_minutes: i32,             // Duração projetada
    pub room_id: Option<i64>,              // Sala (None = indefinida)
    pub teacher_id: Option<i64>,           // Professor titular projetado
    pub max_capacity: i32,                 // Capacidade (0 = placeholder)
    pub curriculum_week_id: Option<i64>,   // Semana de roteiro coberta
    pub theme: Option<String>,             // Tema da semana
}

// ==========================================
// Occurrence - persistida ou sintetizada
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Occurrence {
    Persisted(Event),
    Synthesized(PseudoEvent),
}

impl Occurrence {
    pub fn scheduled_at(&self) -> NaiveDateTime {
        match self {
            Occurrence::Persisted(e) => e.scheduled_at,
            Occurrence::Synthesized(p) => p.scheduled_at,
        }
    }

    pub fn occurrence_date(&self) -> NaiveDate {
        match self {
            Occurrence::Persisted(e) => e.occurrence_date(),
            Occurrence::Synthesized(p) => p.occurrence_date,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Occurrence::Persisted(e) => e.event_type,
            Occurrence::Synthesized(p) => p.event_type,
        }
    }

    pub fn class_group_id(&self) -> Option<i64> {
        match self {
            Occurrence::Persisted(e) => e.class_group_id,
            Occurrence::Synthesized(p) => p.class_group_id,
        }
    }

    /// Id do evento quando a ocorrência é persistida
    pub fn persisted_id(&self) -> Option<i64> {
        match self {
            Occurrence::Persisted(e) => Some(e.id),
            Occurrence::Synthesized(_) => None,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self, Occurrence::Synthesized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurrence_sintetizada_sem_id() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let pseudo = PseudoEvent {
            event_type: EventType::RegularClass,
            meeting_kind: None,
            class_group_id: Some(10),
            occurrence_date: date,
            scheduled_at: date.and_hms_opt(10, 0, 0).unwrap(),
            duration_minutes: 120,
            room_id: Some(5),
            teacher_id: Some(1),
            max_capacity: 12,
            curriculum_week_id: None,
            theme: None,
        };

        let occurrence = Occurrence::Synthesized(pseudo);
        assert!(occurrence.is_synthesized());
        assert_eq!(occurrence.persisted_id(), None);
        assert_eq!(occurrence.class_group_id(), Some(10));
        assert_eq!(occurrence.occurrence_date(), date);
    }

    #[test]
    fn test_serializacao_com_discriminante() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let pseudo = PseudoEvent {
            event_type: EventType::Workshop,
            meeting_kind: None,
            class_group_id: None,
            occurrence_date: date,
            scheduled_at: date.and_hms_opt(10, 0, 0).unwrap(),
            duration_minutes: 120,
            room_id: None,
            teacher_id: None,
            max_capacity: 0,
            curriculum_week_id: None,
            theme: Some("Multiplicação no ábaco".to_string()),
        };

        let json = serde_json::to_value(Occurrence::Synthesized(pseudo)).unwrap();
        assert_eq!(json["origin"], "SYNTHESIZED");
        assert_eq!(json["event_type"], "WORKSHOP");
    }
}
