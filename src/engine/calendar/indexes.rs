use crate::domain::class_group::{ClassGroup, EnrollmentWindow, Student};
use crate::domain::curriculum::CurriculumWeek;
use crate::domain::event::Event;
use crate::domain::participation::{StudentParticipation, TeacherParticipation};
use crate::domain::types::EventType;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

// ==========================================
// CalendarIndexes - índices de consulta por requisição
// ==========================================
// Montados uma única vez por chamada de calendário; as buscas de
// supressão e de vínculo viram lookups em memória em vez de uma
// consulta por dia/turma.
pub(super) struct CalendarIndexes {
    /// Presença de evento por (turma, data) - cancelados contam
    pub class_event_dates: HashSet<(i64, NaiveDate)>,

    /// Datas com oficina persistida - cancelados contam
    pub workshop_dates: HashSet<NaiveDate>,

    /// Datas com reunião persistida - cancelados contam
    pub meeting_dates: HashSet<NaiveDate>,

    /// Participações de aluno ativas por evento
    pub student_parts_by_event: HashMap<i64, Vec<StudentParticipation>>,

    /// Professores com participação ativa por evento
    pub teacher_ids_by_event: HashMap<i64, Vec<i64>>,

    /// Cadastro de alunos por id
    pub students_by_id: HashMap<i64, Student>,

    /// Turmas ativas por id
    pub groups_by_id: HashMap<i64, ClassGroup>,

    /// Vigências de matrícula por turma
    pub windows_by_group: HashMap<i64, Vec<EnrollmentWindow>>,

    /// Semanas de roteiro do intervalo, ordenadas por início
    weeks: Vec<CurriculumWeek>,
}

impl CalendarIndexes {
    pub fn build(
        events: &[Event],
        student_parts: Vec<StudentParticipation>,
        teacher_parts: Vec<TeacherParticipation>,
        students: Vec<Student>,
        groups: &[ClassGroup],
        windows: Vec<EnrollmentWindow>,
        weeks: Vec<CurriculumWeek>,
    ) -> Self {
        let mut class_event_dates = HashSet::new();
        let mut workshop_dates = HashSet::new();
        let mut meeting_dates = HashSet::new();

        for event in events {
            let date = event.occurrence_date();
            if let Some(group_id) = event.class_group_id {
                class_event_dates.insert((group_id, date));
            }
            match event.event_type {
                EventType::Workshop => {
                    workshop_dates.insert(date);
                }
                EventType::Meeting => {
                    meeting_dates.insert(date);
                }
                _ => {}
            }
        }

        let mut student_parts_by_event: HashMap<i64, Vec<StudentParticipation>> = HashMap::new();
        for part in student_parts.into_iter().filter(|p| p.is_active()) {
            student_parts_by_event
                .entry(part.event_id)
                .or_default()
                .push(part);
        }

        let mut teacher_ids_by_event: HashMap<i64, Vec<i64>> = HashMap::new();
        for part in teacher_parts.into_iter().filter(|p| p.is_active()) {
            teacher_ids_by_event
                .entry(part.event_id)
                .or_default()
                .push(part.teacher_id);
        }

        let students_by_id = students.into_iter().map(|s| (s.id, s)).collect();
        let groups_by_id = groups.iter().map(|g| (g.id, g.clone())).collect();

        let mut windows_by_group: HashMap<i64, Vec<EnrollmentWindow>> = HashMap::new();
        for window in windows {
            windows_by_group
                .entry(window.class_group_id)
                .or_default()
                .push(window);
        }

        Self {
            class_event_dates,
            workshop_dates,
            meeting_dates,
            student_parts_by_event,
            teacher_ids_by_event,
            students_by_id,
            groups_by_id,
            windows_by_group,
            weeks,
        }
    }

    /// Semana de roteiro que cobre a data
    pub fn week_covering(&self, date: NaiveDate) -> Option<&CurriculumWeek> {
        self.weeks.iter().find(|w| w.covers(date))
    }

    /// Semana de roteiro por id
    pub fn week_by_id(&self, week_id: i64) -> Option<&CurriculumWeek> {
        self.weeks.iter().find(|w| w.id == week_id)
    }

    /// Alunos com vigência na turma cobrindo a data, ordenados por id
    pub fn enrolled_student_ids(&self, class_group_id: i64, date: NaiveDate) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .windows_by_group
            .get(&class_group_id)
            .map(|windows| {
                windows
                    .iter()
                    .filter(|w| w.covers(date))
                    .map(|w| w.student_id)
                    .collect()
            })
            .unwrap_or_default();

        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
