// ==========================================
// Agenda Escolar - tipos de domínio
// ==========================================
// Formato de serialização: SCREAMING_SNAKE_CASE (igual ao banco)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Tipo de evento (Event Type)
// ==========================================
// REGULAR_CLASS gera instâncias semanais a partir de uma turma;
// os demais tipos são sempre avulsos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    RegularClass, // Aula regular (instância de turma)
    ExtraClass,   // Aula extra
    ZeroClass,    // Aula zero (primeira aula experimental)
    Workshop,     // Oficina
    Meeting,      // Reunião
    Escalation,   // Superação
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl EventType {
    /// Converte a partir da string do banco
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "REGULAR_CLASS" => Some(EventType::RegularClass),
            "EXTRA_CLASS" => Some(EventType::ExtraClass),
            "ZERO_CLASS" => Some(EventType::ZeroClass),
            "WORKSHOP" => Some(EventType::Workshop),
            "MEETING" => Some(EventType::Meeting),
            "ESCALATION" => Some(EventType::Escalation),
            _ => None,
        }
    }

    /// Converte para a string armazenada no banco
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventType::RegularClass => "REGULAR_CLASS",
            EventType::ExtraClass => "EXTRA_CLASS",
            EventType::ZeroClass => "ZERO_CLASS",
            EventType::Workshop => "WORKSHOP",
            EventType::Meeting => "MEETING",
            EventType::Escalation => "ESCALATION",
        }
    }
}

// ==========================================
// Status derivado do evento (Event Status)
// ==========================================
// Não é coluna própria: deriva de canceled_at / finalized /
// da existência de evento substituto (reagendamento).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Active,      // Ativo
    Canceled,    // Cancelado
    Rescheduled, // Cancelado por reagendamento (existe substituto)
    Finalized,   // Finalizado (presenças travadas)
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Active => write!(f, "ACTIVE"),
            EventStatus::Canceled => write!(f, "CANCELED"),
            EventStatus::Rescheduled => write!(f, "RESCHEDULED"),
            EventStatus::Finalized => write!(f, "FINALIZED"),
        }
    }
}

// ==========================================
// Status de contato (Contact Status)
// ==========================================
// Acompanhamento de contato com o aluno após falta ou cancelamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    NotContacted,  // Ainda não contatado
    Contacted,     // Contato realizado
    Resolved,      // Situação resolvida
    ClassCanceled, // Aula cancelada pela escola
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ContactStatus {
    /// Converte a partir da string do banco
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CONTACTED" => ContactStatus::Contacted,
            "RESOLVED" => ContactStatus::Resolved,
            "CLASS_CANCELED" => ContactStatus::ClassCanceled,
            _ => ContactStatus::NotContacted, // Valor padrão
        }
    }

    /// Converte para a string armazenada no banco
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContactStatus::NotContacted => "NOT_CONTACTED",
            ContactStatus::Contacted => "CONTACTED",
            ContactStatus::Resolved => "RESOLVED",
            ContactStatus::ClassCanceled => "CLASS_CANCELED",
        }
    }
}

// ==========================================
// Tipo de reunião fixa (Meeting Kind)
// ==========================================
// Reuniões de dia fixo sintetizadas pelo calendário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingKind {
    General,     // Reunião geral
    Monitoring,  // Reunião de monitoria
    Pedagogical, // Reunião pedagógica
}

impl fmt::Display for MeetingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingKind::General => write!(f, "GENERAL"),
            MeetingKind::Monitoring => write!(f, "MONITORING"),
            MeetingKind::Pedagogical => write!(f, "PEDAGOGICAL"),
        }
    }
}

impl MeetingKind {
    pub const ALL: [MeetingKind; 3] = [
        MeetingKind::General,
        MeetingKind::Monitoring,
        MeetingKind::Pedagogical,
    ];

    /// Chave do rótulo de exibição no catálogo i18n
    pub fn label_key(&self) -> &'static str {
        match self {
            MeetingKind::General => "calendar.meeting_general",
            MeetingKind::Monitoring => "calendar.meeting_monitoring",
            MeetingKind::Pedagogical => "calendar.meeting_pedagogical",
        }
    }
}
