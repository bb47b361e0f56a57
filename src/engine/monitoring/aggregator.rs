// ==========================================
// Agenda Escolar - agregador da matriz anual
// ==========================================
// Carrega o ano inteiro em uma única tomada de lock e resolve as
// células em memória. O feed de feriados roda em paralelo com a
// carga do banco; falha do feed degrada para matriz sem feriados.
// ==========================================

use crate::domain::class_group::{ClassGroup, EnrollmentWindow, Student};
use crate::domain::curriculum::{CurriculumWeek, Holiday};
use crate::domain::event::Event;
use crate::domain::participation::StudentParticipation;
use crate::engine::holiday_feed::HolidayFeed;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{
    ClassGroupRepository, CurriculumWeekRepository, EnrollmentWindowRepository, EventRepository,
    StudentParticipationRepository, StudentRepository,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::resolve::{RawMakeupLink, ResolutionContext};
use super::types::{MonitoringFilters, StudentRow, WeekColumn, YearMatrix};

// ==========================================
// MonitoringAggregator - montagem da matriz
// ==========================================
pub struct MonitoringAggregator {
    conn: Arc<Mutex<Connection>>,
    holiday_feed: Arc<dyn HolidayFeed>,
}

/// Dados do ano carregados sob um único lock
struct YearData {
    weeks: Vec<CurriculumWeek>,
    students: Vec<Student>,
    windows: Vec<EnrollmentWindow>,
    groups: Vec<ClassGroup>,
    events: Vec<Event>,
    participations: Vec<StudentParticipation>,
    makeup_chains: HashMap<(i64, i64), Vec<RawMakeupLink>>,
}

impl MonitoringAggregator {
    pub fn new(conn: Arc<Mutex<Connection>>, holiday_feed: Arc<dyn HolidayFeed>) -> Self {
        Self { conn, holiday_feed }
    }

    /// Matriz anual de acompanhamento aluno x semana de roteiro
    pub async fn get_year_matrix(
        &self,
        year: i32,
        filters: &MonitoringFilters,
    ) -> RepositoryResult<YearMatrix> {
        let conn = Arc::clone(&self.conn);
        let load_task = tokio::task::spawn_blocking(move || Self::load_year(&conn, year));

        let feed = Arc::clone(&self.holiday_feed);
        let holidays_task = async move {
            match feed.fetch_year(year).await {
                Ok(holidays) => holidays,
                Err(e) => {
                    warn!(year, error = %e, "feed de feriados indisponível, matriz sem feriados");
                    Vec::new()
                }
            }
        };

        let (loaded, holidays) = tokio::join!(load_task, holidays_task);
        let data = loaded
            .map_err(|e| RepositoryError::InternalError(format!("carga do ano abortada: {}", e)))??;

        let matrix = Self::assemble(year, data, holidays, filters);
        debug!(
            year,
            semanas = matrix.weeks.len(),
            alunos = matrix.rows.len(),
            "matriz anual montada"
        );
        Ok(matrix)
    }

    /// Carrega tudo que a resolução precisa, em uma tomada de lock
    fn load_year(conn: &Arc<Mutex<Connection>>, year: i32) -> RepositoryResult<YearData> {
        let conn = conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "year".to_string(),
                message: format!("ano inválido: {}", year),
            }
        })?;
        let to = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "year".to_string(),
                message: format!("ano inválido: {}", year),
            }
        })?;

        let weeks = CurriculumWeekRepository::weeks_for_year_in(&conn, year)?;
        let students = StudentRepository::list_all_in(&conn)?;
        let windows = EnrollmentWindowRepository::find_intersecting_range_in(&conn, from, to)?;
        let groups = ClassGroupRepository::list_active_in(&conn)?;
        let events = EventRepository::find_in_range_in(&conn, from, to)?;
        let participations = StudentParticipationRepository::find_in_event_range_in(&conn, from, to)?;

        // Cadeias de reposição saem do intervalo do ano; precisam ser
        // seguidas aqui, com a conexão ainda em mãos
        let makeup_chains = Self::load_makeup_chains(&conn, &participations)?;

        Ok(YearData {
            weeks,
            students,
            windows,
            groups,
            events,
            participations,
            makeup_chains,
        })
    }

    fn load_makeup_chains(
        conn: &Connection,
        participations: &[StudentParticipation],
    ) -> RepositoryResult<HashMap<(i64, i64), Vec<RawMakeupLink>>> {
        let mut chains: HashMap<(i64, i64), Vec<RawMakeupLink>> = HashMap::new();

        for part in participations.iter().filter(|p| !p.is_active()) {
            let key = (part.event_id, part.student_id);
            if chains.contains_key(&key) {
                continue;
            }
            let links = Self::follow_chain(conn, part.event_id, part.student_id)?;
            if !links.is_empty() {
                chains.insert(key, links);
            }
        }

        Ok(chains)
    }

    /// Segue a cadeia de reposição a partir do evento de origem
    fn follow_chain(
        conn: &Connection,
        source_event_id: i64,
        student_id: i64,
    ) -> RepositoryResult<Vec<RawMakeupLink>> {
        let mut links = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(source_event_id);

        let mut current_event_id = source_event_id;
        loop {
            let follow = match StudentParticipationRepository::find_makeup_follow_up_in(
                conn,
                current_event_id,
                student_id,
            )? {
                Some(p) => p,
                None => break,
            };

            // Guarda contra ciclo em cadastro corrompido
            if !visited.insert(follow.event_id) {
                warn!(
                    student_id,
                    event_id = follow.event_id,
                    "ciclo na cadeia de reposição, interrompendo"
                );
                break;
            }

            let event = match EventRepository::find_by_id_in(conn, follow.event_id)? {
                Some(e) => e,
                None => break,
            };

            current_event_id = event.id;
            let transferred_again = !follow.is_active();
            links.push(RawMakeupLink {
                event,
                participation: follow,
            });

            if !transferred_again {
                break;
            }
        }

        Ok(links)
    }

    /// Monta o contexto de resolução e percorre aluno x semana
    fn assemble(
        year: i32,
        data: YearData,
        holidays: Vec<Holiday>,
        filters: &MonitoringFilters,
    ) -> YearMatrix {
        let week_columns: Vec<WeekColumn> = data.weeks.iter().map(WeekColumn::from).collect();

        let groups_by_id: HashMap<i64, ClassGroup> =
            data.groups.into_iter().map(|g| (g.id, g)).collect();

        let mut windows_by_student: HashMap<i64, Vec<EnrollmentWindow>> = HashMap::new();
        for window in data.windows {
            windows_by_student
                .entry(window.student_id)
                .or_default()
                .push(window);
        }

        let mut events_by_group_date: HashMap<(i64, NaiveDate), Vec<Event>> = HashMap::new();
        for event in data.events {
            if let Some(group_id) = event.class_group_id {
                events_by_group_date
                    .entry((group_id, event.occurrence_date()))
                    .or_default()
                    .push(event);
            }
        }

        // Participação ativa tem precedência; entre desativadas, a de
        // maior id (último registro)
        let mut parts_by_event_student: HashMap<(i64, i64), StudentParticipation> = HashMap::new();
        for part in data.participations {
            let key = (part.event_id, part.student_id);
            match parts_by_event_student.get(&key) {
                Some(existing) if existing.is_active() => {}
                Some(existing) if !part.is_active() && part.id < existing.id => {}
                _ => {
                    parts_by_event_student.insert(key, part);
                }
            }
        }

        let holidays_by_date: HashMap<NaiveDate, String> = holidays
            .into_iter()
            .map(|h| (h.date, h.description))
            .collect();

        let ctx = ResolutionContext {
            weeks: data.weeks,
            groups_by_id,
            windows_by_student,
            events_by_group_date,
            parts_by_event_student,
            holidays_by_date,
            makeup_chains: data.makeup_chains,
        };

        let mut rows = Vec::new();
        for student in &data.students {
            if !filters.allows_student(student.id) {
                continue;
            }
            let windows = match ctx.windows_by_student.get(&student.id) {
                Some(ws) if !ws.is_empty() => ws,
                // Sem vigência no ano o aluno fica fora da matriz
                _ => continue,
            };
            if let Some(group_id) = filters.class_group_id {
                if !windows.iter().any(|w| w.class_group_id == group_id) {
                    continue;
                }
            }

            let cells = ctx
                .weeks
                .iter()
                .map(|week| ctx.resolve_cell(student, week))
                .collect();
            rows.push(StudentRow {
                student_id: student.id,
                student_name: student.name.clone(),
                cells,
            });
        }

        YearMatrix {
            year,
            weeks: week_columns,
            rows,
        }
    }
}
