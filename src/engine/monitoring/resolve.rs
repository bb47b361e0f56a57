// ==========================================
// Agenda Escolar - resolução de célula da matriz
// ==========================================
// Cruza vigência, semana de roteiro, feriados e eventos persistidos
// para decidir o que cada célula aluno x semana exibe. Opera apenas
// sobre os índices pré-carregados; nenhuma consulta ao banco aqui.
// ==========================================

use crate::domain::class_group::{ClassGroup, EnrollmentWindow, Student};
use crate::domain::curriculum::CurriculumWeek;
use crate::domain::event::Event;
use crate::domain::participation::StudentParticipation;
use crate::i18n::{t, t_with_args};
use chrono::NaiveDate;
use std::collections::HashMap;

use super::types::{MakeupLink, MonitoringCell};

// ==========================================
// RawMakeupLink - elo de reposição carregado do banco
// ==========================================
pub(super) struct RawMakeupLink {
    pub event: Event,
    pub participation: StudentParticipation,
}

// ==========================================
// ResolutionContext - índices em memória do ano
// ==========================================
pub(super) struct ResolutionContext {
    /// Semanas do ano em ordem cronológica
    pub weeks: Vec<CurriculumWeek>,
    /// Turmas ativas por id
    pub groups_by_id: HashMap<i64, ClassGroup>,
    /// Vigências do aluno que intersectam o ano
    pub windows_by_student: HashMap<i64, Vec<EnrollmentWindow>>,
    /// Eventos persistidos por (turma, data da ocorrência)
    pub events_by_group_date: HashMap<(i64, NaiveDate), Vec<Event>>,
    /// Participação por (evento, aluno); ativa tem precedência
    pub parts_by_event_student: HashMap<(i64, i64), StudentParticipation>,
    /// Feriados do feed por data
    pub holidays_by_date: HashMap<NaiveDate, String>,
    /// Cadeias de reposição já seguidas, por (evento de origem, aluno)
    pub makeup_chains: HashMap<(i64, i64), Vec<RawMakeupLink>>,
}

/// Resultado da resolução de vigência para uma semana
enum SlotResolution<'a> {
    /// Turma e data concreta da ocorrência na semana
    Resolved { group: &'a ClassGroup, date: NaiveDate },
    /// Nenhuma vigência cobre a ocorrência na semana
    NoEnrollment,
    /// Vigência aponta para turma inexistente ou inativa
    Unresolved,
}

impl ResolutionContext {
    /// Semana de roteiro que cobre a data, se houver
    pub fn week_covering(&self, date: NaiveDate) -> Option<&CurriculumWeek> {
        self.weeks.iter().find(|w| w.covers(date))
    }

    fn holiday_on(&self, date: NaiveDate) -> Option<&str> {
        self.holidays_by_date.get(&date).map(String::as_str)
    }

    /// Resolve a célula do aluno para uma semana de roteiro
    pub fn resolve_cell(&self, student: &Student, week: &CurriculumWeek) -> MonitoringCell {
        if week.is_recess {
            return MonitoringCell::hidden(week.id, t("monitoring.recess"));
        }

        let (group, date) = match self.resolve_slot(student.id, week) {
            SlotResolution::Resolved { group, date } => (group, date),
            SlotResolution::NoEnrollment => {
                return MonitoringCell::hidden(week.id, t("monitoring.no_enrollment"));
            }
            SlotResolution::Unresolved => {
                return MonitoringCell::hidden(week.id, t("monitoring.unresolved"));
            }
        };

        // Feriado na data da ocorrência cancela a aula apenas na exibição
        if let Some(holiday) = self.holiday_on(date) {
            let mut cell = MonitoringCell::hidden(
                week.id,
                t_with_args("monitoring.holiday_auto_canceled", &[("holiday", holiday)]),
            );
            cell.occurrence_date = Some(date);
            cell.class_group_id = Some(group.id);
            return cell;
        }

        match self
            .events_by_group_date
            .get(&(group.id, date))
            .and_then(|events| select_event(events))
        {
            Some(event) if event.is_canceled() => MonitoringCell {
                curriculum_week_id: week.id,
                visible: true,
                status_label: t("monitoring.canceled"),
                occurrence_date: Some(date),
                event_id: Some(event.id),
                class_group_id: Some(group.id),
                attendance: None,
                workbook: None,
                makeup_links: Vec::new(),
            },
            Some(event) => self.cell_for_event(student, week, group, date, event),
            // Pseudo-evento ainda não materializado
            None => MonitoringCell {
                curriculum_week_id: week.id,
                visible: true,
                status_label: t("monitoring.pending"),
                occurrence_date: Some(date),
                event_id: None,
                class_group_id: Some(group.id),
                attendance: None,
                workbook: Some(student.workbook),
                makeup_links: Vec::new(),
            },
        }
    }

    /// Encontra a vigência e a data concreta da ocorrência na semana
    ///
    /// Janelas históricas não se sobrepõem; havendo troca de turma no
    /// meio da semana, vence a vigência de início mais recente cuja
    /// ocorrência caia dentro da própria janela.
    fn resolve_slot(&self, student_id: i64, week: &CurriculumWeek) -> SlotResolution<'_> {
        let windows = match self.windows_by_student.get(&student_id) {
            Some(ws) => ws,
            None => return SlotResolution::NoEnrollment,
        };

        let mut candidates: Vec<&EnrollmentWindow> = windows
            .iter()
            .filter(|w| w.intersects(week.start_date, week.end_date))
            .collect();
        if candidates.is_empty() {
            return SlotResolution::NoEnrollment;
        }
        candidates.sort_by_key(|w| std::cmp::Reverse(w.valid_from));

        let mut saw_unknown_group = false;
        for window in candidates {
            let group = match self.groups_by_id.get(&window.class_group_id) {
                Some(g) => g,
                None => {
                    saw_unknown_group = true;
                    continue;
                }
            };
            let date = match week.occurrence_date_for_weekday(group.day_of_week) {
                Some(d) => d,
                None => continue,
            };
            if !window.covers(date) {
                continue;
            }
            return SlotResolution::Resolved { group, date };
        }

        if saw_unknown_group {
            SlotResolution::Unresolved
        } else {
            SlotResolution::NoEnrollment
        }
    }

    /// Célula para uma ocorrência com evento persistido não cancelado
    fn cell_for_event(
        &self,
        student: &Student,
        week: &CurriculumWeek,
        group: &ClassGroup,
        date: NaiveDate,
        event: &Event,
    ) -> MonitoringCell {
        match self.parts_by_event_student.get(&(event.id, student.id)) {
            Some(part) if part.is_active() => MonitoringCell {
                curriculum_week_id: week.id,
                visible: true,
                status_label: attendance_label(part.attendance),
                occurrence_date: Some(date),
                event_id: Some(event.id),
                class_group_id: Some(group.id),
                attendance: part.attendance,
                workbook: Some(part.workbook),
                makeup_links: Vec::new(),
            },
            Some(part) => {
                // Participação desativada: reposição transferida ou remoção manual
                let links = self.makeup_links_from(event.id, student.id);
                if links.is_empty() {
                    MonitoringCell {
                        curriculum_week_id: week.id,
                        visible: true,
                        status_label: t("monitoring.pending"),
                        occurrence_date: Some(date),
                        event_id: Some(event.id),
                        class_group_id: Some(group.id),
                        attendance: None,
                        workbook: Some(student.workbook),
                        makeup_links: Vec::new(),
                    }
                } else {
                    MonitoringCell {
                        curriculum_week_id: week.id,
                        visible: true,
                        status_label: t("monitoring.makeup"),
                        occurrence_date: Some(date),
                        event_id: Some(event.id),
                        class_group_id: Some(group.id),
                        attendance: part.attendance,
                        workbook: Some(part.workbook),
                        makeup_links: links,
                    }
                }
            }
            // Aluno sem participação no evento materializado da turma
            None => MonitoringCell {
                curriculum_week_id: week.id,
                visible: true,
                status_label: t("monitoring.pending"),
                occurrence_date: Some(date),
                event_id: Some(event.id),
                class_group_id: Some(group.id),
                attendance: None,
                workbook: Some(student.workbook),
                makeup_links: Vec::new(),
            },
        }
    }

    /// Converte a cadeia bruta em elos anotados com semana e feriado
    fn makeup_links_from(&self, event_id: i64, student_id: i64) -> Vec<MakeupLink> {
        self.makeup_chains
            .get(&(event_id, student_id))
            .map(|raw| raw.iter().map(|link| self.annotate_link(link)).collect())
            .unwrap_or_default()
    }

    fn annotate_link(&self, raw: &RawMakeupLink) -> MakeupLink {
        let date = raw.event.occurrence_date();
        let week = self.week_covering(date);
        let holiday = self.holiday_on(date).map(str::to_string);

        let status_label = if let Some(name) = holiday.as_deref() {
            t_with_args("monitoring.holiday_auto_canceled", &[("holiday", name)])
        } else if raw.event.is_canceled() {
            t("monitoring.canceled")
        } else {
            attendance_label(raw.participation.attendance)
        };

        MakeupLink {
            event_id: raw.event.id,
            occurrence_date: date,
            attendance: raw.participation.attendance,
            week_number: week.map(|w| w.week_number),
            theme: week.map(|w| w.theme.clone()),
            holiday,
            status_label,
        }
    }
}

/// Rótulo de presença para exibição
pub(super) fn attendance_label(attendance: Option<bool>) -> String {
    match attendance {
        Some(true) => t("monitoring.present"),
        Some(false) => t("monitoring.absent"),
        None => t("monitoring.pending"),
    }
}

/// Entre eventos da mesma turma e data, prefere um ativo; sem ativo,
/// o de maior id (último cadastro)
pub(super) fn select_event(events: &[Event]) -> Option<&Event> {
    events
        .iter()
        .find(|e| e.is_active())
        .or_else(|| events.iter().max_by_key(|e| e.id))
}
