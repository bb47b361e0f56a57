// ==========================================
// Agenda Escolar - materialização de calendário
// ==========================================
// Regra da camada: somente leitura; pseudo-eventos nunca são gravados.
// Regra da camada: evento persistido suprime o pseudo-evento da mesma
// (turma, data), inclusive quando cancelado.
// ==========================================

use crate::config::ConfigManager;
use crate::domain::class_group::ClassGroup;
use crate::domain::event::Event;
use crate::domain::occurrence::{Occurrence, PseudoEvent};
use crate::domain::types::{EventType, MeetingKind};
use crate::i18n::t;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{
    ClassGroupRepository, CurriculumWeekRepository, EnrollmentWindowRepository, EventRepository,
    StudentParticipationRepository, StudentRepository, TeacherParticipationRepository,
};
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::indexes::CalendarIndexes;
use super::synthesis::{self, SynthesisConfig};
use super::types::{CalendarEntry, CalendarFilters, CalendarStudent};

// ==========================================
// CalendarMaterializer - visão de calendário
// ==========================================
pub struct CalendarMaterializer {
    conn: Arc<Mutex<Connection>>,
    config: Arc<ConfigManager>,
}

impl CalendarMaterializer {
    pub fn new(conn: Arc<Mutex<Connection>>, config: Arc<ConfigManager>) -> Self {
        Self { conn, config }
    }

    /// Obtém a conexão com o banco
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Materializa o calendário do intervalo [from, to] (inclusivo)
    ///
    /// 1. Eventos persistidos do intervalo, anotados com status derivado
    /// 2. Síntese dia a dia: oficina semanal, reuniões fixas e as
    ///    ocorrências de turma ainda sem linha própria
    ///
    /// Saída ordenada por horário; rotulagem via catálogo i18n.
    pub fn get_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        filters: &CalendarFilters,
    ) -> RepositoryResult<Vec<CalendarEntry>> {
        if from > to {
            return Ok(Vec::new());
        }

        let cfg = SynthesisConfig::load(&self.config)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        // Carga em lote sob um único lock
        let (events, superseded_ids, groups, indexes) = {
            let conn = self.get_conn()?;

            let events = EventRepository::find_in_range_in(&conn, from, to)?;

            // Cancelado com substituto ativo exibe como reagendado
            let mut superseded_ids = HashSet::new();
            for event in events.iter().filter(|e| e.is_canceled()) {
                if EventRepository::has_active_replacement_in(&conn, event.id)? {
                    superseded_ids.insert(event.id);
                }
            }

            let student_parts =
                StudentParticipationRepository::find_in_event_range_in(&conn, from, to)?;
            let teacher_parts =
                TeacherParticipationRepository::find_in_event_range_in(&conn, from, to)?;
            let students = StudentRepository::list_all_in(&conn)?;
            let groups = ClassGroupRepository::list_active_in(&conn)?;
            let windows = EnrollmentWindowRepository::find_intersecting_range_in(&conn, from, to)?;
            let weeks = CurriculumWeekRepository::weeks_in_range_in(&conn, from, to)?;

            let indexes = CalendarIndexes::build(
                &events,
                student_parts,
                teacher_parts,
                students,
                &groups,
                windows,
                weeks,
            );

            (events, superseded_ids, groups, indexes)
        };

        let mut entries = Vec::new();

        // 1. Eventos persistidos anotados
        for event in &events {
            if !persisted_passes_filters(event, &indexes, filters) {
                continue;
            }
            entries.push(entry_for_persisted(
                event,
                &indexes,
                superseded_ids.contains(&event.id),
            ));
        }

        // 2. Síntese dia a dia
        let mut date = from;
        while date <= to {
            // Oficina e reuniões não têm turma/professor/aluno: qualquer
            // filtro as exclui.
            if filters.is_empty() {
                if let Some(pseudo) = synthesis::synthesize_workshop(date, &cfg, &indexes) {
                    entries.push(entry_for_pseudo(pseudo, Vec::new(), &indexes));
                }
                for pseudo in synthesis::synthesize_meetings(date, &cfg, &indexes) {
                    entries.push(entry_for_pseudo(pseudo, Vec::new(), &indexes));
                }
            }

            for group in &groups {
                if !group_passes_filters(group, filters) {
                    continue;
                }
                if let Some((pseudo, student_ids)) =
                    synthesis::synthesize_class(group, date, &indexes)
                {
                    if let Some(student_id) = filters.student_id {
                        if !student_ids.contains(&student_id) {
                            continue;
                        }
                    }
                    entries.push(entry_for_pseudo(pseudo, student_ids, &indexes));
                }
            }

            date += Duration::days(1);
        }

        entries.sort_by(|a, b| {
            a.occurrence
                .scheduled_at()
                .cmp(&b.occurrence.scheduled_at())
                .then_with(|| a.title.cmp(&b.title))
        });

        debug!(
            from = %from,
            to = %to,
            persisted = events.len(),
            total = entries.len(),
            "calendário materializado"
        );

        Ok(entries)
    }
}

// ==========================================
// Filtros
// ==========================================

fn persisted_passes_filters(
    event: &Event,
    indexes: &CalendarIndexes,
    filters: &CalendarFilters,
) -> bool {
    if let Some(group_id) = filters.class_group_id {
        if event.class_group_id != Some(group_id) {
            return false;
        }
    }

    if let Some(teacher_id) = filters.teacher_id {
        let has_teacher = indexes
            .teacher_ids_by_event
            .get(&event.id)
            .map_or(false, |ids| ids.contains(&teacher_id));
        if !has_teacher {
            return false;
        }
    }

    if let Some(student_id) = filters.student_id {
        let has_student = indexes
            .student_parts_by_event
            .get(&event.id)
            .map_or(false, |parts| {
                parts.iter().any(|p| p.student_id == student_id)
            });
        if !has_student {
            return false;
        }
    }

    if let Some(profile) = &filters.cognitive_profile {
        let accepted = event
            .class_group_id
            .and_then(|group_id| indexes.groups_by_id.get(&group_id))
            .map_or(false, |g| g.accepts_profile(profile));
        if !accepted {
            return false;
        }
    }

    true
}

fn group_passes_filters(group: &ClassGroup, filters: &CalendarFilters) -> bool {
    if let Some(group_id) = filters.class_group_id {
        if group.id != group_id {
            return false;
        }
    }

    if let Some(teacher_id) = filters.teacher_id {
        if group.teacher_id != teacher_id {
            return false;
        }
    }

    if let Some(profile) = &filters.cognitive_profile {
        if !group.accepts_profile(profile) {
            return false;
        }
    }

    true
}

// ==========================================
// Montagem de entradas
// ==========================================

fn entry_for_persisted(event: &Event, indexes: &CalendarIndexes, superseded: bool) -> CalendarEntry {
    let students = indexes
        .student_parts_by_event
        .get(&event.id)
        .map(|parts| {
            parts
                .iter()
                .map(|p| CalendarStudent {
                    student_id: p.student_id,
                    name: student_name(indexes, p.student_id),
                    attendance: p.attendance,
                    is_makeup: p.is_makeup(),
                })
                .collect()
        })
        .unwrap_or_default();

    let teacher_ids = indexes
        .teacher_ids_by_event
        .get(&event.id)
        .cloned()
        .unwrap_or_default();

    // Semana vinculada no registro; sem vínculo, a que cobre a data
    let week = event
        .curriculum_week_id
        .and_then(|id| indexes.week_by_id(id))
        .or_else(|| indexes.week_covering(event.occurrence_date()));

    let group = event
        .class_group_id
        .and_then(|id| indexes.groups_by_id.get(&id));

    CalendarEntry {
        status: Some(event.status(superseded)),
        title: title_for(event.event_type, None, group),
        students,
        teacher_ids,
        week_number: week.map(|w| w.week_number),
        theme: week.map(|w| w.theme.clone()),
        occurrence: Occurrence::Persisted(event.clone()),
    }
}

fn entry_for_pseudo(
    pseudo: PseudoEvent,
    student_ids: Vec<i64>,
    indexes: &CalendarIndexes,
) -> CalendarEntry {
    let students = student_ids
        .into_iter()
        .map(|student_id| CalendarStudent {
            student_id,
            name: student_name(indexes, student_id),
            attendance: None,
            is_makeup: false,
        })
        .collect();

    let group = pseudo
        .class_group_id
        .and_then(|id| indexes.groups_by_id.get(&id));

    let title = title_for(pseudo.event_type, pseudo.meeting_kind, group);

    let week_number = pseudo
        .curriculum_week_id
        .and_then(|id| indexes.week_by_id(id))
        .map(|w| w.week_number);

    let theme = pseudo.theme.clone();
    let teacher_ids: Vec<i64> = pseudo.teacher_id.into_iter().collect();

    CalendarEntry {
        status: None,
        title,
        students,
        teacher_ids,
        week_number,
        theme,
        occurrence: Occurrence::Synthesized(pseudo),
    }
}

fn student_name(indexes: &CalendarIndexes, student_id: i64) -> String {
    indexes
        .students_by_id
        .get(&student_id)
        .map(|s| s.name.clone())
        .unwrap_or_default()
}

/// Título de exibição: nome da turma quando houver, senão rótulo do tipo
fn title_for(
    event_type: EventType,
    meeting_kind: Option<MeetingKind>,
    group: Option<&ClassGroup>,
) -> String {
    if let Some(group) = group {
        return group.name.clone();
    }

    match event_type {
        EventType::RegularClass => t("calendar.regular_class"),
        EventType::ExtraClass => t("calendar.extra_class"),
        EventType::ZeroClass => t("calendar.zero_class"),
        EventType::Workshop => t("calendar.workshop"),
        EventType::Meeting => meeting_kind
            .map(|k| t(k.label_key()))
            .unwrap_or_else(|| t("calendar.meeting")),
        EventType::Escalation => t("calendar.escalation"),
    }
}
