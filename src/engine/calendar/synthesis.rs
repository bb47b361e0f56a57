use crate::config::ConfigManager;
use crate::domain::class_group::ClassGroup;
use crate::domain::occurrence::PseudoEvent;
use crate::domain::types::{EventType, MeetingKind};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::error::Error;

use super::indexes::CalendarIndexes;

/// Dia da semana da data (0=segunda .. 6=domingo)
pub(super) fn weekday_of(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_monday() as i32
}

// ==========================================
// SynthesisConfig - parâmetros das ocorrências fixas
// ==========================================
// Lido uma vez por requisição; a oficina e as reuniões fixas não têm
// turma geradora, então a grade vem da configuração.
pub(super) struct SynthesisConfig {
    pub workshop_weekday: i32,
    pub workshop_time: NaiveTime,
    pub workshop_duration_minutes: i32,
    pub meeting_time: NaiveTime,
    pub meeting_duration_minutes: i32,
    pub meeting_weekdays: [(MeetingKind, i32); 3],
}

impl SynthesisConfig {
    pub fn load(config: &ConfigManager) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            workshop_weekday: config.get_workshop_weekday()?,
            workshop_time: config.get_workshop_time()?,
            workshop_duration_minutes: config.get_workshop_duration_minutes()?,
            meeting_time: config.get_meeting_time()?,
            meeting_duration_minutes: config.get_meeting_duration_minutes()?,
            meeting_weekdays: [
                (
                    MeetingKind::General,
                    config.get_meeting_weekday(MeetingKind::General)?,
                ),
                (
                    MeetingKind::Monitoring,
                    config.get_meeting_weekday(MeetingKind::Monitoring)?,
                ),
                (
                    MeetingKind::Pedagogical,
                    config.get_meeting_weekday(MeetingKind::Pedagogical)?,
                ),
            ],
        })
    }
}

/// Sintetiza a oficina da data, se devida e ainda não materializada
///
/// Placeholder sem sala e com capacidade 0; o tema vem da semana de
/// roteiro que cobre a data.
pub(super) fn synthesize_workshop(
    date: NaiveDate,
    cfg: &SynthesisConfig,
    indexes: &CalendarIndexes,
) -> Option<PseudoEvent> {
    if weekday_of(date) != cfg.workshop_weekday {
        return None;
    }
    if indexes.workshop_dates.contains(&date) {
        return None;
    }

    let week = indexes.week_covering(date);

    Some(PseudoEvent {
        event_type: EventType::Workshop,
        meeting_kind: None,
        class_group_id: None,
        occurrence_date: date,
        scheduled_at: NaiveDateTime::new(date, cfg.workshop_time),
        duration_minutes: cfg.workshop_duration_minutes,
        room_id: None,
        teacher_id: None,
        max_capacity: 0,
        curriculum_week_id: week.map(|w| w.id),
        theme: week.map(|w| w.theme.clone()),
    })
}

/// Sintetiza as reuniões fixas devidas na data
///
/// Reunião persistida na data suprime a síntese do dia inteiro; os
/// tipos se distinguem apenas pelo dia da semana configurado.
pub(super) fn synthesize_meetings(
    date: NaiveDate,
    cfg: &SynthesisConfig,
    indexes: &CalendarIndexes,
) -> Vec<PseudoEvent> {
    if indexes.meeting_dates.contains(&date) {
        return Vec::new();
    }

    let day = weekday_of(date);

    cfg.meeting_weekdays
        .iter()
        .filter(|(_, meeting_day)| *meeting_day == day)
        .map(|(kind, _)| PseudoEvent {
            event_type: EventType::Meeting,
            meeting_kind: Some(*kind),
            class_group_id: None,
            occurrence_date: date,
            scheduled_at: NaiveDateTime::new(date, cfg.meeting_time),
            duration_minutes: cfg.meeting_duration_minutes,
            room_id: None,
            teacher_id: None,
            max_capacity: 0,
            curriculum_week_id: None,
            theme: None,
        })
        .collect()
}

/// Sintetiza a ocorrência da turma na data, se devida e não materializada
///
/// Devolve o pseudo-evento e os alunos com vigência cobrindo a data.
pub(super) fn synthesize_class(
    group: &ClassGroup,
    date: NaiveDate,
    indexes: &CalendarIndexes,
) -> Option<(PseudoEvent, Vec<i64>)> {
    if !group.matches_weekday(date) {
        return None;
    }
    if indexes.class_event_dates.contains(&(group.id, date)) {
        return None;
    }

    let student_ids = indexes.enrolled_student_ids(group.id, date);
    let week = indexes.week_covering(date);

    let pseudo = PseudoEvent {
        event_type: EventType::RegularClass,
        meeting_kind: None,
        class_group_id: Some(group.id),
        occurrence_date: date,
        scheduled_at: group.starts_at_on(date),
        duration_minutes: group.duration_minutes,
        room_id: Some(group.room_id),
        teacher_id: Some(group.teacher_id),
        max_capacity: group.max_capacity,
        curriculum_week_id: week.map(|w| w.id),
        theme: week.map(|w| w.theme.clone()),
    };

    Some((pseudo, student_ids))
}
