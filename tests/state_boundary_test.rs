// ==========================================
// Testes de integração - participações e trilha de auditoria
// ==========================================
// Escopo:
// 1. Inclusão avulsa respeitando estado do evento, lotação e perfil
// 2. Desativação soft de participação
// 3. Acompanhamento de contato pós-falta
// 4. Consulta da trilha de auditoria
// ==========================================

mod helpers;

use agenda_escolar::api::ErrorCategory;
use agenda_escolar::domain::types::ContactStatus;
use agenda_escolar::domain::AuditAction;

use helpers::api_test_helper::*;
use helpers::test_data_builder::*;

#[test]
fn test_inclusao_avulsa_respeita_estado_e_lotacao() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let event = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
                .capacity(2)
                .build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("evento criado");

    let response = env
        .event_api
        .add_student_participation(event.id, 1, "secretaria")
        .expect("inclusão da Alice");
    assert!(response.success, "{}", response.message);
    let participation = response.payload.expect("participação criada");
    assert_eq!(participation.student_id, 1);
    assert!(participation.is_active());
    assert!(!participation.is_makeup());
    // Snapshot dos cursores copiado do cadastro
    assert_eq!(participation.workbook, workbook(1, 1, 1, 1));

    // Duplicidade
    let response = env
        .event_api
        .add_student_participation(event.id, 1, "secretaria")
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Conflict));

    // Lotação: segunda vaga fecha a conta
    assert!(env
        .event_api
        .add_student_participation(event.id, 2, "secretaria")
        .unwrap()
        .success);
    let response = env
        .event_api
        .add_student_participation(event.id, 3, "secretaria")
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));

    // Evento cancelado não aceita inclusão
    let other = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 3, 14, 0)).build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("outro evento");
    assert!(env
        .event_api
        .cancel_event(other.id, "teste", "secretaria")
        .unwrap()
        .success);
    let response = env
        .event_api
        .add_student_participation(other.id, 1, "secretaria")
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));
}

#[test]
fn test_inclusao_avulsa_respeita_perfil_da_turma() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);
    env.with_conn(|conn| {
        seed_class_group(conn, 3, "Turma Qui 18h", 3, "18:00", 60, 2, 2, 6, "TDAH")
            .expect("turma restrita");
        seed_student(conn, 4, "Davi", "TDAH").expect("aluno Davi");
    });

    // 2026-03-05 é quinta-feira, dia da turma 3
    let event = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 5, 18, 0))
                .regular(3)
                .room(2)
                .build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("aula da turma restrita");

    assert!(env
        .event_api
        .add_student_participation(event.id, 4, "secretaria")
        .unwrap()
        .success);

    let response = env
        .event_api
        .add_student_participation(event.id, 1, "secretaria")
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::Validation));
}

#[test]
fn test_desativacao_soft_de_participacao() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let event = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
                .students(vec![1, 2])
                .build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("evento criado");

    let response = env
        .event_api
        .cancel_student_participation(event.id, 1, "secretaria")
        .expect("desativação");
    assert!(response.success, "{}", response.message);

    let detail = env.event_api.get_event_detail(event.id).expect("detalhe");
    let ids: Vec<i64> = detail
        .student_participations
        .iter()
        .map(|p| p.student_id)
        .collect();
    assert_eq!(ids, vec![2]);

    // Registro permanece no banco, apenas desativado
    let count: i64 = env.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM student_participations WHERE event_id = ?1",
            [event.id],
            |row| row.get(0),
        )
        .expect("contagem de participações")
    });
    assert_eq!(count, 2);

    // Desativar de novo: não há mais participação ativa
    let response = env
        .event_api
        .cancel_student_participation(event.id, 1, "secretaria")
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::NotFound));

    // Evento finalizado trava as participações
    assert!(env
        .event_api
        .finalize_event(
            &FinalizeRequestBuilder::new(event.id)
                .present(2, workbook(1, 3, 1, 2))
                .build(),
            "professora",
        )
        .unwrap()
        .success);
    let response = env
        .event_api
        .cancel_student_participation(event.id, 2, "secretaria")
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::InvalidState));
}

#[test]
fn test_acompanhamento_de_contato_pos_falta() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let event = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0))
                .students(vec![1])
                .build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("evento criado");

    assert!(env
        .event_api
        .update_contact_status(event.id, 1, ContactStatus::Contacted, "secretaria")
        .unwrap()
        .success);
    assert!(env
        .event_api
        .update_contact_status(event.id, 1, ContactStatus::Resolved, "secretaria")
        .unwrap()
        .success);

    let detail = env.event_api.get_event_detail(event.id).expect("detalhe");
    assert_eq!(
        detail.student_participations[0].contact_status,
        ContactStatus::Resolved
    );

    // Sem participação ativa não há contato a acompanhar
    let response = env
        .event_api
        .update_contact_status(event.id, 3, ContactStatus::Contacted, "secretaria")
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.error_category, Some(ErrorCategory::NotFound));

    let trail = env
        .audit_api
        .by_action(AuditAction::UpdateContactStatus, 10)
        .expect("trilha de contato");
    assert_eq!(trail.len(), 2);
}

#[test]
fn test_consulta_da_trilha_de_auditoria() {
    let env = ApiTestEnv::new().expect("ambiente de teste");
    seed_basic_school(&env);

    let first = env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 3, 10, 0)).build(),
            "secretaria",
        )
        .unwrap()
        .payload
        .expect("primeiro evento");
    assert!(env
        .event_api
        .create_event(
            &EventRequestBuilder::new(datetime(2026, 3, 3, 14, 0)).build(),
            "secretaria",
        )
        .unwrap()
        .success);
    assert!(env
        .event_api
        .cancel_event(first.id, "remanejamento", "coordenacao")
        .unwrap()
        .success);

    let recent = env.audit_api.recent(10).expect("trilha recente");
    assert_eq!(recent.len(), 3);

    let creates = recent
        .iter()
        .filter(|log| log.action_type == "CREATE_EVENT")
        .count();
    let cancels = recent
        .iter()
        .filter(|log| log.action_type == "CANCEL_EVENT")
        .count();
    assert_eq!(creates, 2);
    assert_eq!(cancels, 1);

    // Payload estruturado acompanha cada registro
    assert!(recent.iter().all(|log| log.payload_json.is_some()));

    // Limite respeitado e filtro por ação
    assert_eq!(env.audit_api.recent(2).expect("limite").len(), 2);
    let only_cancel = env
        .audit_api
        .by_action(AuditAction::CancelEvent, 10)
        .expect("filtro por ação");
    assert_eq!(only_cancel.len(), 1);
    assert_eq!(only_cancel[0].actor, "coordenacao");
}
