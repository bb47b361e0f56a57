// ==========================================
// Agenda Escolar - roteiro e feriados
// ==========================================
// Semana de roteiro (CurriculumWeek): bloco temático que determina
// a qual tema/semana uma ocorrência de aula pertence.
// Feriado (Holiday): dado externo anual, consumido pelo feed.
// ==========================================

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ==========================================
// CurriculumWeek - semana de roteiro
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumWeek {
    pub id: i64,                   // ID da semana
    pub week_number: i32,          // Número da semana no ano letivo
    pub start_date: NaiveDate,     // Início (inclusivo)
    pub end_date: NaiveDate,       // Fim (inclusivo)
    pub theme: String,             // Tema do roteiro
    pub color_tag: Option<String>, // Cor de exibição
    pub is_recess: bool,           // Semana de recesso
}

impl CurriculumWeek {
    /// A semana cobre a data informada (limites inclusivos)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Data concreta dentro da semana que cai no dia de semana informado
    ///
    /// day_of_week: 0=segunda .. 6=domingo. Retorna None se a semana
    /// não contém esse dia (semana truncada no início/fim do ano).
    pub fn occurrence_date_for_weekday(&self, day_of_week: i32) -> Option<NaiveDate> {
        let mut date = self.start_date;
        while date <= self.end_date {
            if date.weekday().num_days_from_monday() as i32 == day_of_week {
                return Some(date);
            }
            date += Duration::days(1);
        }
        None
    }
}

// ==========================================
// Holiday - feriado externo
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,     // Data do feriado
    pub description: String, // Descrição (ex.: "Carnaval")
}
