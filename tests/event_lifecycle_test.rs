// ==========================================
// Testes de integração - ciclo de vida de eventos
// ==========================================
// Escopo:
// 1. Criação com validação de entrada e preenchimento por vigência
// 2. Cancelamento com marcação de contato e trilha de auditoria
// 3. Fechamento de presenças com avanço dos cursores de apostila
// 4. Reabertura e atualização de horário/escala
// ==========================================

mod helpers;

use agenda_escolar::api::{ApiError, ErrorCategory, UpdateEventRequest};
use agenda_escolar::domain::types::{ContactStatus, EventStatus, EventType};
use agenda_escolar::domain::AuditAction;

use helpers::api_test_helper::*;
use helpers::test_data_builder::*;

#[test]
fn test_criacao_de_aula_extra_com_alunos_explicitos() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .students(vec![1])
        .teachers(vec![1])
        .build();

    let response = env
        .event_api
        .create_event(&request, "secretaria")
        .expect("criação de evento");
    assert!(response.success, "criação deveria passar: {}", response.message);

    let event = response.payload.expect("evento criado");
    assert!(event.id > 0);
    assert_eq!(event.event_type, EventType::ExtraClass);
    assert_eq!(event.room_id, 1);
    assert!(event.is_active());

    let detail = env
        .event_api
        .get_event_detail(event.id)
        .expect("detalhe do evento");
    assert_eq!(detail.status, EventStatus::Active);
    assert_eq!(detail.student_participations.len(), 1);
    assert_eq!(detail.student_participations[0].student_id, 1);
    // Snapshot dos cursores copiado do cadastro do aluno
    assert_eq!(detail.student_participations[0].workbook, workbook(1, 1, 1, 1));
    assert_eq!(detail.teacher_participations.len(), 1);
    assert_eq!(detail.teacher_participations[0].teacher_id, 1);
}

#[test]
fn test_aula_regular_preenche_alunos_pela_vigencia() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    // 2026-03-02 é segunda-feira, dia da turma 1
    let request = EventRequestBuilder::new(datetime(2026, 3, 2, 14, 0))
        .regular(1)
        .capacity(8)
        .teachers(vec![1])
        .build();

    let response = env
        .event_api
        .create_event(&request, "secretaria")
        .expect("criação de aula regular");
    assert!(response.success, "{}", response.message);

    let event = response.payload.expect("aula criada");
    let detail = env.event_api.get_event_detail(event.id).expect("detalhe");

    let mut student_ids: Vec<i64> = detail
        .student_participations
        .iter()
        .map(|p| p.student_id)
        .collect();
    student_ids.sort_unstable();
    assert_eq!(student_ids, vec![1, 2], "alunos da vigência da turma 1");
}

#[test]
fn test_validacoes_de_entrada_na_criacao() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    // Duração inválida
    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .duration(0)
        .build();
    let response = env.event_api.create_event(&request, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Validation));

    // Capacidade negativa
    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .capacity(-1)
        .build();
    let response = env.event_api.create_event(&request, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Validation));

    // Aula regular sem turma vinculada
    let request = EventRequestBuilder::new(datetime(2026, 3, 2, 14, 0))
        .event_type(EventType::RegularClass)
        .build();
    let response = env.event_api.create_event(&request, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Validation));
}

#[test]
fn test_semana_de_roteiro_nao_admite_duas_aulas_ativas() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);
    env.with_conn(|conn| {
        seed_week(conn, 10, 10, date(2026, 3, 2), date(2026, 3, 8), "Soma com reserva", false)
            .expect("semana 10");
    });

    let first = EventRequestBuilder::new(datetime(2026, 3, 2, 14, 0))
        .regular(1)
        .week(10)
        .build();
    let response = env.event_api.create_event(&first, "secretaria").unwrap();
    assert!(response.success, "{}", response.message);

    // Outra data, mesma semana do roteiro e mesma turma
    let second = EventRequestBuilder::new(datetime(2026, 3, 9, 14, 0))
        .regular(1)
        .week(10)
        .room(2)
        .build();
    let response = env.event_api.create_event(&second, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Conflict));
}

#[test]
fn test_turma_nao_admite_duas_aulas_ativas_no_mesmo_dia() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let first = EventRequestBuilder::new(datetime(2026, 3, 2, 14, 0))
        .regular(1)
        .build();
    assert!(env.event_api.create_event(&first, "secretaria").unwrap().success);

    // Mesmo dia, horário e sala diferentes: ainda assim recusa
    let second = EventRequestBuilder::new(datetime(2026, 3, 2, 16, 0))
        .regular(1)
        .room(2)
        .build();
    let response = env.event_api.create_event(&second, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Conflict));
}

#[test]
fn test_capacidade_e_aluno_inativo_na_criacao() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);
    env.with_conn(|conn| {
        seed_inactive_student(conn, 99, "Duda").expect("aluno inativo");
    });

    // Mais alunos que vagas
    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .capacity(1)
        .students(vec![1, 2])
        .build();
    let response = env.event_api.create_event(&request, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));

    // Aluno inativo na lista explícita
    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .students(vec![99])
        .build();
    let response = env.event_api.create_event(&request, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Validation));

    // Aluno inexistente: recusa sem persistir o evento
    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .students(vec![777])
        .build();
    let response = env.event_api.create_event(&request, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::NotFound));

    let events = env
        .event_api
        .list_events_in_range(date(2026, 3, 3), date(2026, 3, 3))
        .expect("listagem");
    assert!(events.is_empty(), "recusa não deve deixar evento para trás");
}

#[test]
fn test_cancelamento_marca_contato_e_registra_auditoria() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let request = EventRequestBuilder::new(datetime(2026, 3, 2, 14, 0))
        .regular(1)
        .build();
    let event = env
        .event_api
        .create_event(&request, "secretaria")
        .unwrap()
        .payload
        .expect("aula criada");

    let response = env
        .event_api
        .cancel_event(event.id, "professora doente", "coordenacao")
        .expect("cancelamento");
    assert!(response.success, "{}", response.message);

    let detail = env.event_api.get_event_detail(event.id).expect("detalhe");
    assert_eq!(detail.status, EventStatus::Canceled);
    assert_eq!(detail.event.cancel_reason.as_deref(), Some("professora doente"));
    for participation in &detail.student_participations {
        assert_eq!(participation.contact_status, ContactStatus::ClassCanceled);
    }

    // Cancelar de novo é transição inválida
    let response = env
        .event_api
        .cancel_event(event.id, "de novo", "coordenacao")
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));

    let trail = env
        .audit_api
        .by_action(AuditAction::CancelEvent, 10)
        .expect("trilha de cancelamento");
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].actor, "coordenacao");
}

#[test]
fn test_fechamento_avanca_cursores_e_trava_presencas() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .students(vec![1, 2])
        .teachers(vec![1])
        .build();
    let event = env
        .event_api
        .create_event(&request, "secretaria")
        .unwrap()
        .payload
        .expect("evento criado");

    let finalize = FinalizeRequestBuilder::new(event.id)
        .present(1, workbook(2, 5, 1, 8))
        .absent(2, workbook(1, 1, 1, 1))
        .teacher_present(1)
        .build();
    let response = env
        .event_api
        .finalize_event(&finalize, "professora")
        .expect("fechamento");
    assert!(response.success, "{}", response.message);

    let detail = env.event_api.get_event_detail(event.id).expect("detalhe");
    assert_eq!(detail.status, EventStatus::Finalized);

    let alice = detail
        .student_participations
        .iter()
        .find(|p| p.student_id == 1)
        .expect("participação da Alice");
    assert_eq!(alice.attendance, Some(true));
    assert_eq!(alice.workbook, workbook(2, 5, 1, 8));

    let bia = detail
        .student_participations
        .iter()
        .find(|p| p.student_id == 2)
        .expect("participação da Bia");
    assert_eq!(bia.attendance, Some(false));

    let ana = &detail.teacher_participations[0];
    assert_eq!(ana.attendance, Some(true));

    // Cursores avançam no cadastro do aluno
    let (book, page): (i32, i32) = env.with_conn(|conn| {
        conn.query_row(
            "SELECT abacus_book, abacus_page FROM students WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("cursores da Alice")
    });
    assert_eq!((book, page), (2, 5));

    // Fechar duas vezes é transição inválida
    let again = FinalizeRequestBuilder::new(event.id).build();
    let response = env.event_api.finalize_event(&again, "professora").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));

    let trail = env
        .audit_api
        .by_action(AuditAction::FinalizeEvent, 10)
        .expect("trilha de fechamento");
    assert_eq!(trail.len(), 1);
}

#[test]
fn test_fechamento_exige_participacao_ativa() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .students(vec![1])
        .build();
    let event = env
        .event_api
        .create_event(&request, "secretaria")
        .unwrap()
        .payload
        .expect("evento criado");

    // Aluno 3 não participa do evento
    let finalize = FinalizeRequestBuilder::new(event.id)
        .present(3, workbook(1, 1, 1, 1))
        .build();
    let response = env.event_api.finalize_event(&finalize, "professora").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Validation));
}

#[test]
fn test_reabertura_limpa_somente_o_travamento() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .students(vec![1])
        .build();
    let event = env
        .event_api
        .create_event(&request, "secretaria")
        .unwrap()
        .payload
        .expect("evento criado");

    // Reabrir sem fechar é transição inválida
    let response = env.event_api.reopen_event(event.id, "coordenacao").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));

    let finalize = FinalizeRequestBuilder::new(event.id)
        .present(1, workbook(3, 2, 2, 4))
        .build();
    assert!(env.event_api.finalize_event(&finalize, "professora").unwrap().success);

    let response = env
        .event_api
        .reopen_event(event.id, "coordenacao")
        .expect("reabertura");
    assert!(response.success, "{}", response.message);

    let detail = env.event_api.get_event_detail(event.id).expect("detalhe");
    assert_eq!(detail.status, EventStatus::Active);
    // Presenças lançadas permanecem registradas
    assert_eq!(detail.student_participations[0].attendance, Some(true));

    let trail = env
        .audit_api
        .by_action(AuditAction::ReopenEvent, 10)
        .expect("trilha de reabertura");
    assert_eq!(trail.len(), 1);
}

#[test]
fn test_atualizacao_troca_sala_escala_e_respeita_lotacao() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let request = EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
        .students(vec![1, 2])
        .teachers(vec![1])
        .build();
    let event = env
        .event_api
        .create_event(&request, "secretaria")
        .unwrap()
        .payload
        .expect("evento criado");

    // Capacidade abaixo das participações ativas
    let shrink = UpdateEventRequest {
        event_id: event.id,
        scheduled_at: event.scheduled_at,
        duration_minutes: event.duration_minutes,
        room_id: event.room_id,
        max_capacity: 1,
        curriculum_week_id: None,
        teacher_ids: None,
    };
    let response = env.event_api.update_event(&shrink, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));

    // Troca de sala, duração e escala de professores
    let update = UpdateEventRequest {
        event_id: event.id,
        scheduled_at: event.scheduled_at,
        duration_minutes: 90,
        room_id: 2,
        max_capacity: 10,
        curriculum_week_id: None,
        teacher_ids: Some(vec![2]),
    };
    let response = env
        .event_api
        .update_event(&update, "secretaria")
        .expect("atualização");
    assert!(response.success, "{}", response.message);

    let updated = response.payload.expect("evento atualizado");
    assert_eq!(updated.room_id, 2);
    assert_eq!(updated.duration_minutes, 90);

    let detail = env.event_api.get_event_detail(event.id).expect("detalhe");
    let teacher_ids: Vec<i64> = detail
        .teacher_participations
        .iter()
        .map(|p| p.teacher_id)
        .collect();
    assert_eq!(teacher_ids, vec![2], "Ana sai da escala, Bruno entra");

    // Evento cancelado é imutável
    assert!(env
        .event_api
        .cancel_event(event.id, "teste", "secretaria")
        .unwrap()
        .success);
    let response = env.event_api.update_event(&update, "secretaria").unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));
}

#[test]
fn test_listagem_recusa_intervalo_invertido() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let err = env
        .event_api
        .list_events_in_range(date(2026, 3, 9), date(2026, 3, 2))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
