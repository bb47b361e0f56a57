// ==========================================
// Teste de ponta a ponta - fluxo de agendamento
// ==========================================
// Jornada completa de uma semana letiva:
// 1. Materialização das aulas da semana com validação de agenda
// 2. Fechamento de presenças com avanço dos cursores de apostila
// 3. Reposição da falta em outra turma
// 4. Cancelamento com acompanhamento de contato
// 5. Conferência no calendário, na matriz anual e na auditoria
// ==========================================

mod helpers;

use agenda_escolar::api::ErrorCategory;
use agenda_escolar::config::config_keys;
use agenda_escolar::domain::types::{ContactStatus, EventStatus};
use agenda_escolar::domain::AuditAction;
use agenda_escolar::engine::{CalendarFilters, MonitoringFilters};

use helpers::api_test_helper::*;
use helpers::test_data_builder::*;

#[test]
fn test_jornada_completa_da_semana_letiva() {
    agenda_escolar::i18n::set_locale("pt-BR");
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);
    env.with_conn(|conn| {
        seed_week(
            conn,
            10,
            10,
            date(2026, 3, 2),
            date(2026, 3, 8),
            "Soma com reserva",
            false,
        )
        .expect("semana 10");
        seed_week(
            conn,
            11,
            11,
            date(2026, 3, 9),
            date(2026, 3, 15),
            "Subtração simples",
            false,
        )
        .expect("semana 11");
    });

    // ===== Passo 1: materialização da semana 10 =====
    let monday = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 2, 14, 0))
                .regular(1)
                .week(10)
                .teachers(vec![1])
                .build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("aula da turma da segunda");
    assert_eq!(monday.class_group_id, Some(1));
    assert_eq!(monday.curriculum_week_id, Some(10));

    // Vigência da turma preenche Alice e Bia
    let detail = env.event_api.get_event_detail(monday.id).expect("detalhe");
    let ids: Vec<i64> = detail
        .student_participations
        .iter()
        .map(|p| p.student_id)
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let wednesday = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 4, 16, 0))
                .regular(2)
                .room(2)
                .capacity(6)
                .week(10)
                .teachers(vec![2])
                .build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("aula da turma da quarta");

    // Semana de roteiro já ocupada para a turma 1
    let clash = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 3, 14, 0))
                .regular(1)
                .week(10)
                .build(),
            "secretaria",
        )
        .unwrap();
    assert!(!clash.success);
    assert_eq!(clash.error_category, Some(ErrorCategory::Conflict));

    // Sala 1 ocupada pela aula da segunda
    let room_clash = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 2, 14, 30)).build(),
            "secretaria",
        )
        .unwrap();
    assert!(!room_clash.success);
    assert_eq!(room_clash.error_category, Some(ErrorCategory::Conflict));

    // ===== Passo 2: fechamento com avanço de apostila =====
    assert!(env
        .event_api
        .finalize_event(
            &FinalizeRequestBuilder::new(monday.id)
                .present(1, workbook(1, 5, 1, 3))
                .absent(2, workbook(1, 1, 1, 1))
                .teacher_present(1)
                .build(),
            "professora",
        )
        .unwrap()
        .success);

    let (book, page): (i32, i32) = env.with_conn(|conn| {
        conn.query_row(
            "SELECT abacus_book, abacus_page FROM students WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("cadastro da Alice")
    });
    assert_eq!((book, page), (1, 5));

    // ===== Passo 3: reposição da falta da Bia =====
    assert!(env
        .makeup_api
        .transfer_makeup(&transfer_request(2, monday.id, wednesday.id), "secretaria")
        .unwrap()
        .success);

    assert!(env
        .event_api
        .finalize_event(
            &FinalizeRequestBuilder::new(wednesday.id)
                .present(3, workbook(2, 1, 2, 1))
                .present(2, workbook(1, 2, 1, 1))
                .build(),
            "professora",
        )
        .unwrap()
        .success);

    // O vínculo de reposição sobrevive ao fechamento
    let chain: Option<i64> = env.with_conn(|conn| {
        conn.query_row(
            "SELECT made_up_from_event_id FROM student_participations
             WHERE event_id = ?1 AND student_id = 2 AND deactivated_at IS NULL",
            [wednesday.id],
            |row| row.get(0),
        )
        .expect("participação de reposição")
    });
    assert_eq!(chain, Some(monday.id));

    // ===== Passo 4: cancelamento com acompanhamento de contato =====
    let next_monday = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 9, 14, 0))
                .regular(1)
                .week(11)
                .teachers(vec![1])
                .build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("aula da semana 11");

    assert!(env
        .event_api
        .cancel_event(next_monday.id, "reforma da sala", "coordenacao")
        .unwrap()
        .success);

    let detail = env
        .event_api
        .get_event_detail(next_monday.id)
        .expect("detalhe do cancelado");
    assert!(detail
        .student_participations
        .iter()
        .all(|p| p.contact_status == ContactStatus::ClassCanceled));

    assert!(env
        .event_api
        .update_contact_status(next_monday.id, 1, ContactStatus::Contacted, "secretaria")
        .unwrap()
        .success);

    // ===== Passo 5: calendário das duas semanas =====
    let entries = env
        .calendar_api
        .get_calendar(date(2026, 3, 2), date(2026, 3, 8), &CalendarFilters::default())
        .expect("calendário da semana 10");

    let persisted: Vec<_> = entries
        .iter()
        .filter(|e| !e.occurrence.is_synthesized())
        .collect();
    assert_eq!(persisted.len(), 2);
    assert!(persisted
        .iter()
        .all(|e| e.status == Some(EventStatus::Finalized)));

    let wed_entry = entries
        .iter()
        .find(|e| e.occurrence.persisted_id() == Some(wednesday.id))
        .expect("aula da quarta no calendário");
    let bia = wed_entry
        .students
        .iter()
        .find(|s| s.student_id == 2)
        .expect("Bia no destino");
    assert!(bia.is_makeup);
    assert_eq!(bia.attendance, Some(true));

    let entries = env
        .calendar_api
        .get_calendar(date(2026, 3, 9), date(2026, 3, 15), &CalendarFilters::default())
        .expect("calendário da semana 11");
    let canceled_entry = entries
        .iter()
        .find(|e| e.occurrence.persisted_id() == Some(next_monday.id))
        .expect("aula cancelada no calendário");
    assert_eq!(canceled_entry.status, Some(EventStatus::Canceled));

    // ===== Passo 6: matriz anual de acompanhamento =====
    let matrix = env
        .monitoring_api
        .get_year_matrix(2026, &MonitoringFilters::default())
        .expect("matriz anual");
    let row_ids: Vec<i64> = matrix.rows.iter().map(|r| r.student_id).collect();
    assert_eq!(row_ids, vec![1, 2, 3]);

    let alice = &matrix.rows[0];
    assert_eq!(alice.cells[0].status_label, "Presente");
    assert_eq!(alice.cells[1].status_label, "Aula cancelada");
    assert_eq!(alice.cells[1].event_id, Some(next_monday.id));

    let bia = &matrix.rows[1];
    assert_eq!(bia.cells[0].status_label, "Reposição");
    assert_eq!(bia.cells[0].makeup_links.len(), 1);
    let link = &bia.cells[0].makeup_links[0];
    assert_eq!(link.event_id, wednesday.id);
    assert_eq!(link.attendance, Some(true));
    assert_eq!(link.status_label, "Presente");

    let caio = &matrix.rows[2];
    assert_eq!(caio.cells[0].status_label, "Presente");
    assert_eq!(caio.cells[1].status_label, "Aula pendente");

    // ===== Passo 7: trilha de auditoria =====
    let count = |action: AuditAction| {
        env.audit_api
            .by_action(action, 50)
            .expect("trilha por ação")
            .len()
    };
    assert_eq!(count(AuditAction::CreateEvent), 3);
    assert_eq!(count(AuditAction::FinalizeEvent), 2);
    assert_eq!(count(AuditAction::TransferMakeup), 1);
    assert_eq!(count(AuditAction::CancelEvent), 1);
    assert_eq!(count(AuditAction::UpdateContactStatus), 1);
    assert_eq!(env.audit_api.recent(50).expect("trilha completa").len(), 8);
}

#[test]
fn test_configuracao_orienta_a_sintese_do_calendario() {
    agenda_escolar::i18n::set_locale("pt-BR");
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);
    env.with_conn(|conn| {
        seed_week(
            conn,
            10,
            10,
            date(2026, 3, 2),
            date(2026, 3, 8),
            "Soma com reserva",
            false,
        )
        .expect("semana 10");
    });

    // Padrão: oficina no sábado às 10:00
    let saturday = env
        .calendar_api
        .get_calendar(date(2026, 3, 7), date(2026, 3, 7), &CalendarFilters::default())
        .expect("sábado");
    assert_eq!(saturday.len(), 1);
    assert_eq!(saturday[0].title, "Oficina");
    assert_eq!(
        saturday[0].occurrence.scheduled_at(),
        datetime(2026, 3, 7, 10, 0)
    );
    assert_eq!(saturday[0].theme.as_deref(), Some("Soma com reserva"));

    // Oficina movida para o domingo às 09:30
    assert!(env
        .config_api
        .set_config_value(config_keys::WORKSHOP_WEEKDAY, "6", "direcao")
        .unwrap()
        .success);
    assert!(env
        .config_api
        .set_config_value(config_keys::WORKSHOP_TIME, "09:30", "direcao")
        .unwrap()
        .success);

    let saturday = env
        .calendar_api
        .get_calendar(date(2026, 3, 7), date(2026, 3, 7), &CalendarFilters::default())
        .expect("sábado sem oficina");
    assert!(saturday.is_empty());

    let sunday = env
        .calendar_api
        .get_calendar(date(2026, 3, 8), date(2026, 3, 8), &CalendarFilters::default())
        .expect("domingo com oficina");
    assert_eq!(sunday.len(), 1);
    assert_eq!(sunday[0].title, "Oficina");
    assert_eq!(
        sunday[0].occurrence.scheduled_at(),
        datetime(2026, 3, 8, 9, 30)
    );

    let trail = env
        .audit_api
        .by_action(AuditAction::UpdateConfig, 10)
        .expect("alterações de configuração");
    assert_eq!(trail.len(), 2);
}
