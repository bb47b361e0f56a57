// ==========================================
// Testes da resolução de células da matriz
// ==========================================

use super::resolve::{attendance_label, select_event, RawMakeupLink, ResolutionContext};
use super::types::MonitoringFilters;
use crate::domain::class_group::{ClassGroup, EnrollmentWindow, Student};
use crate::domain::curriculum::CurriculumWeek;
use crate::domain::event::Event;
use crate::domain::participation::{StudentParticipation, WorkbookProgress};
use crate::domain::types::{ContactStatus, EventType};
use crate::i18n::t;
use chrono::{Duration, NaiveDate, NaiveTime};
use std::collections::HashMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_week(id: i64, number: i32, start: NaiveDate) -> CurriculumWeek {
    CurriculumWeek {
        id,
        week_number: number,
        start_date: start,
        end_date: start + Duration::days(6),
        theme: format!("Tema {}", number),
        color_tag: None,
        is_recess: false,
    }
}

fn make_group(id: i64, day_of_week: i32) -> ClassGroup {
    ClassGroup {
        id,
        name: format!("Turma {}", id),
        day_of_week,
        time_of_day: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        duration_minutes: 120,
        room_id: 5,
        teacher_id: 1,
        max_capacity: 12,
        eligible_profiles: vec![],
        active: true,
    }
}

fn make_window(
    id: i64,
    student_id: i64,
    group_id: i64,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> EnrollmentWindow {
    EnrollmentWindow {
        id,
        student_id,
        class_group_id: group_id,
        valid_from: from,
        valid_to: to,
    }
}

fn make_student(id: i64, name: &str) -> Student {
    Student {
        id,
        name: name.to_string(),
        active: true,
        cognitive_profile: "PADRAO".to_string(),
        workbook: WorkbookProgress {
            abacus_book: Some(2),
            abacus_page: Some(10),
            challenge_book: None,
            challenge_page: None,
        },
        first_class_event_id: None,
        zero_class_event_id: None,
    }
}

fn make_event(id: i64, group_id: Option<i64>, day: NaiveDate) -> Event {
    let scheduled_at = day.and_hms_opt(10, 0, 0).unwrap();
    Event {
        id,
        event_type: EventType::RegularClass,
        scheduled_at,
        duration_minutes: 120,
        room_id: 5,
        max_capacity: 12,
        finalized: false,
        canceled_at: None,
        cancel_reason: None,
        rescheduled_from_id: None,
        class_group_id: group_id,
        curriculum_week_id: None,
        created_by: "teste".to_string(),
        created_at: scheduled_at,
        updated_at: scheduled_at,
    }
}

fn make_participation(
    id: i64,
    event_id: i64,
    student_id: i64,
    attendance: Option<bool>,
) -> StudentParticipation {
    let now = date(2026, 1, 1).and_hms_opt(8, 0, 0).unwrap();
    StudentParticipation {
        id,
        event_id,
        student_id,
        attendance,
        deactivated_at: None,
        made_up_from_event_id: None,
        contact_status: ContactStatus::NotContacted,
        workbook: WorkbookProgress {
            abacus_book: Some(3),
            abacus_page: Some(1),
            challenge_book: Some(1),
            challenge_page: Some(5),
        },
        created_at: now,
        updated_at: now,
    }
}

fn make_context(
    weeks: Vec<CurriculumWeek>,
    groups: Vec<ClassGroup>,
    windows: Vec<EnrollmentWindow>,
    events: Vec<Event>,
    parts: Vec<StudentParticipation>,
) -> ResolutionContext {
    let groups_by_id = groups.into_iter().map(|g| (g.id, g)).collect();

    let mut windows_by_student: HashMap<i64, Vec<EnrollmentWindow>> = HashMap::new();
    for w in windows {
        windows_by_student.entry(w.student_id).or_default().push(w);
    }

    let mut events_by_group_date: HashMap<(i64, NaiveDate), Vec<Event>> = HashMap::new();
    for e in events {
        if let Some(g) = e.class_group_id {
            events_by_group_date
                .entry((g, e.occurrence_date()))
                .or_default()
                .push(e);
        }
    }

    let mut parts_by_event_student = HashMap::new();
    for p in parts {
        parts_by_event_student.insert((p.event_id, p.student_id), p);
    }

    ResolutionContext {
        weeks,
        groups_by_id,
        windows_by_student,
        events_by_group_date,
        parts_by_event_student,
        holidays_by_date: HashMap::new(),
        makeup_chains: HashMap::new(),
    }
}

// Semana de 2026-03-02 (segunda) a 2026-03-08 (domingo)
fn base_week() -> CurriculumWeek {
    make_week(1, 9, date(2026, 3, 2))
}

#[test]
fn test_semana_de_recesso_oculta_celula() {
    let mut week = base_week();
    week.is_recess = true;
    let student = make_student(100, "Ana");
    let ctx = make_context(vec![week.clone()], vec![], vec![], vec![], vec![]);

    let cell = ctx.resolve_cell(&student, &week);
    assert!(!cell.visible);
    assert_eq!(cell.status_label, t("monitoring.recess"));
    assert!(cell.occurrence_date.is_none());
}

#[test]
fn test_sem_vigencia_na_semana() {
    let week = base_week();
    let student = make_student(100, "Ana");
    // Vigência encerrada antes da semana
    let window = make_window(1, 100, 10, date(2026, 1, 5), Some(date(2026, 2, 20)));
    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window],
        vec![],
        vec![],
    );

    let cell = ctx.resolve_cell(&student, &week);
    assert!(!cell.visible);
    assert_eq!(cell.status_label, t("monitoring.no_enrollment"));
}

#[test]
fn test_vigencia_apontando_turma_desconhecida() {
    let week = base_week();
    let student = make_student(100, "Ana");
    // Turma 99 não existe no cadastro carregado
    let window = make_window(1, 100, 99, date(2026, 1, 5), None);
    let ctx = make_context(vec![week.clone()], vec![], vec![window], vec![], vec![]);

    let cell = ctx.resolve_cell(&student, &week);
    assert!(!cell.visible);
    assert_eq!(cell.status_label, t("monitoring.unresolved"));
}

#[test]
fn test_feriado_cancela_ocorrencia_na_exibicao() {
    let week = base_week();
    let student = make_student(100, "Ana");
    let window = make_window(1, 100, 10, date(2026, 1, 5), None);
    let mut ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window],
        vec![],
        vec![],
    );
    ctx.holidays_by_date
        .insert(date(2026, 3, 2), "Carnaval".to_string());

    let cell = ctx.resolve_cell(&student, &week);
    assert!(!cell.visible);
    assert!(cell.status_label.contains("Carnaval"));
    assert_eq!(cell.occurrence_date, Some(date(2026, 3, 2)));
    assert_eq!(cell.class_group_id, Some(10));
}

#[test]
fn test_sem_evento_exibe_pendente_com_apostila_do_aluno() {
    let week = base_week();
    let student = make_student(100, "Ana");
    let window = make_window(1, 100, 10, date(2026, 1, 5), None);
    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window],
        vec![],
        vec![],
    );

    let cell = ctx.resolve_cell(&student, &week);
    assert!(cell.visible);
    assert_eq!(cell.status_label, t("monitoring.pending"));
    assert_eq!(cell.occurrence_date, Some(date(2026, 3, 2)));
    assert!(cell.event_id.is_none());
    assert_eq!(cell.workbook, Some(student.workbook));
}

#[test]
fn test_presenca_registrada_no_evento() {
    let week = base_week();
    let student = make_student(100, "Ana");
    let window = make_window(1, 100, 10, date(2026, 1, 5), None);
    let event = make_event(50, Some(10), date(2026, 3, 2));
    let part = make_participation(500, 50, 100, Some(true));
    let part_workbook = part.workbook;
    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window],
        vec![event],
        vec![part],
    );

    let cell = ctx.resolve_cell(&student, &week);
    assert!(cell.visible);
    assert_eq!(cell.status_label, attendance_label(Some(true)));
    assert_eq!(cell.attendance, Some(true));
    assert_eq!(cell.event_id, Some(50));
    // Apostila vem da participação, não do cadastro do aluno
    assert_eq!(cell.workbook, Some(part_workbook));
}

#[test]
fn test_falta_e_pendencia_de_presenca() {
    let week = base_week();
    let student = make_student(100, "Ana");
    let window = make_window(1, 100, 10, date(2026, 1, 5), None);
    let event = make_event(50, Some(10), date(2026, 3, 2));

    let absent = make_participation(500, 50, 100, Some(false));
    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window.clone()],
        vec![event.clone()],
        vec![absent],
    );
    let cell = ctx.resolve_cell(&student, &week);
    assert_eq!(cell.status_label, attendance_label(Some(false)));
    assert_eq!(cell.attendance, Some(false));

    let pending = make_participation(501, 50, 100, None);
    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window],
        vec![event],
        vec![pending],
    );
    let cell = ctx.resolve_cell(&student, &week);
    assert_eq!(cell.status_label, attendance_label(None));
    assert!(cell.attendance.is_none());
}

#[test]
fn test_evento_cancelado_aparece_como_cancelado() {
    let week = base_week();
    let student = make_student(100, "Ana");
    let window = make_window(1, 100, 10, date(2026, 1, 5), None);
    let mut event = make_event(50, Some(10), date(2026, 3, 2));
    event.canceled_at = Some(date(2026, 3, 1).and_hms_opt(9, 0, 0).unwrap());
    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window],
        vec![event],
        vec![],
    );

    let cell = ctx.resolve_cell(&student, &week);
    assert!(cell.visible);
    assert_eq!(cell.status_label, t("monitoring.canceled"));
    assert_eq!(cell.event_id, Some(50));
    assert!(cell.workbook.is_none());
}

#[test]
fn test_reposicao_transferida_exibe_cadeia() {
    let week = base_week();
    let dest_week = make_week(2, 10, date(2026, 3, 9));
    let student = make_student(100, "Ana");
    let window = make_window(1, 100, 10, date(2026, 1, 5), None);
    let source = make_event(50, Some(10), date(2026, 3, 2));

    // Participação de origem desativada com falta retroativa
    let mut source_part = make_participation(500, 50, 100, Some(false));
    source_part.deactivated_at = Some(date(2026, 3, 3).and_hms_opt(9, 0, 0).unwrap());

    let dest = make_event(60, Some(11), date(2026, 3, 9));
    let mut dest_part = make_participation(600, 60, 100, Some(true));
    dest_part.made_up_from_event_id = Some(50);

    let mut ctx = make_context(
        vec![week.clone(), dest_week],
        vec![make_group(10, 0), make_group(11, 0)],
        vec![window],
        vec![source],
        vec![source_part],
    );
    ctx.makeup_chains.insert(
        (50, 100),
        vec![RawMakeupLink {
            event: dest,
            participation: dest_part,
        }],
    );

    let cell = ctx.resolve_cell(&student, &week);
    assert!(cell.visible);
    assert_eq!(cell.status_label, t("monitoring.makeup"));
    assert_eq!(cell.attendance, Some(false));
    assert_eq!(cell.makeup_links.len(), 1);

    let link = &cell.makeup_links[0];
    assert_eq!(link.event_id, 60);
    assert_eq!(link.occurrence_date, date(2026, 3, 9));
    assert_eq!(link.week_number, Some(10));
    assert_eq!(link.theme.as_deref(), Some("Tema 10"));
    assert_eq!(link.status_label, attendance_label(Some(true)));
    assert!(link.holiday.is_none());
}

#[test]
fn test_destino_de_reposicao_cancelado_anotado_no_elo() {
    let week = base_week();
    let student = make_student(100, "Ana");
    let window = make_window(1, 100, 10, date(2026, 1, 5), None);
    let source = make_event(50, Some(10), date(2026, 3, 2));

    let mut source_part = make_participation(500, 50, 100, None);
    source_part.deactivated_at = Some(date(2026, 3, 3).and_hms_opt(9, 0, 0).unwrap());

    let mut dest = make_event(60, Some(11), date(2026, 3, 9));
    dest.canceled_at = Some(date(2026, 3, 8).and_hms_opt(9, 0, 0).unwrap());
    let mut dest_part = make_participation(600, 60, 100, None);
    dest_part.made_up_from_event_id = Some(50);

    let mut ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window],
        vec![source],
        vec![source_part],
    );
    ctx.makeup_chains.insert(
        (50, 100),
        vec![RawMakeupLink {
            event: dest,
            participation: dest_part,
        }],
    );

    let cell = ctx.resolve_cell(&student, &week);
    assert_eq!(cell.makeup_links[0].status_label, t("monitoring.canceled"));
}

#[test]
fn test_participacao_desativada_sem_cadeia_vira_pendente() {
    let week = base_week();
    let student = make_student(100, "Ana");
    let window = make_window(1, 100, 10, date(2026, 1, 5), None);
    let event = make_event(50, Some(10), date(2026, 3, 2));
    let mut part = make_participation(500, 50, 100, None);
    part.deactivated_at = Some(date(2026, 3, 3).and_hms_opt(9, 0, 0).unwrap());

    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0)],
        vec![window],
        vec![event],
        vec![part],
    );

    let cell = ctx.resolve_cell(&student, &week);
    assert!(cell.visible);
    assert_eq!(cell.status_label, t("monitoring.pending"));
    assert!(cell.makeup_links.is_empty());
    assert_eq!(cell.workbook, Some(student.workbook));
}

#[test]
fn test_troca_de_turma_no_meio_da_semana() {
    let week = base_week();
    let student = make_student(100, "Ana");
    // Saiu da turma de segunda no dia 3; entrou na turma de sexta no dia 4
    let old_window = make_window(1, 100, 10, date(2026, 1, 5), Some(date(2026, 3, 3)));
    let new_window = make_window(2, 100, 11, date(2026, 3, 4), None);
    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 0), make_group(11, 4)],
        vec![old_window, new_window],
        vec![],
        vec![],
    );

    let cell = ctx.resolve_cell(&student, &week);
    // A vigência mais recente vence: ocorrência na sexta (2026-03-06)
    assert_eq!(cell.occurrence_date, Some(date(2026, 3, 6)));
    assert_eq!(cell.class_group_id, Some(11));
}

#[test]
fn test_troca_recente_sem_ocorrencia_cai_na_vigencia_anterior() {
    let week = base_week();
    let student = make_student(100, "Ana");
    // Nova vigência começa na quinta, mas a nova turma é de segunda:
    // a ocorrência de segunda (02/03) não é coberta pela janela nova
    let old_window = make_window(1, 100, 10, date(2026, 1, 5), Some(date(2026, 3, 4)));
    let new_window = make_window(2, 100, 11, date(2026, 3, 5), None);
    let ctx = make_context(
        vec![week.clone()],
        vec![make_group(10, 2), make_group(11, 0)],
        vec![old_window, new_window],
        vec![],
        vec![],
    );

    let cell = ctx.resolve_cell(&student, &week);
    // Recua para a turma de quarta (04/03) da vigência anterior
    assert_eq!(cell.occurrence_date, Some(date(2026, 3, 4)));
    assert_eq!(cell.class_group_id, Some(10));
}

#[test]
fn test_select_event_prefere_ativo() {
    let mut canceled = make_event(1, Some(10), date(2026, 3, 2));
    canceled.canceled_at = Some(date(2026, 3, 1).and_hms_opt(9, 0, 0).unwrap());
    let active = make_event(2, Some(10), date(2026, 3, 2));

    let events = vec![canceled.clone(), active];
    assert_eq!(select_event(&events).map(|e| e.id), Some(2));

    // Só cancelados: vale o de maior id
    let mut canceled_later = make_event(3, Some(10), date(2026, 3, 2));
    canceled_later.canceled_at = Some(date(2026, 3, 1).and_hms_opt(10, 0, 0).unwrap());
    let events = vec![canceled, canceled_later];
    assert_eq!(select_event(&events).map(|e| e.id), Some(3));

    assert!(select_event(&[]).is_none());
}

#[test]
fn test_attendance_label() {
    assert_eq!(attendance_label(Some(true)), t("monitoring.present"));
    assert_eq!(attendance_label(Some(false)), t("monitoring.absent"));
    assert_eq!(attendance_label(None), t("monitoring.pending"));
}

#[test]
fn test_filtro_de_alunos() {
    let all = MonitoringFilters::default();
    assert!(all.allows_student(1));

    let only_two = MonitoringFilters {
        class_group_id: None,
        student_ids: Some(vec![1, 2]),
    };
    assert!(only_two.allows_student(2));
    assert!(!only_two.allows_student(3));
}
