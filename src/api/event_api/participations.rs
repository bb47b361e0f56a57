// ==========================================
// EventApi - participações de alunos
// ==========================================
// Inclusão avulsa, desativação e acompanhamento de contato.
// Participação nunca é removida fisicamente: desativação preserva o
// histórico para a trilha de auditoria e o monitoramento anual.

use tracing::info;

use crate::api::error::{ApiError, ApiResult, OperationResponse};
use crate::domain::audit::{AuditAction, AuditLog, AuditPayload};
use crate::domain::participation::{NewStudentParticipation, StudentParticipation};
use crate::domain::types::ContactStatus;
use crate::i18n::t;
use crate::repository::audit_log_repo::AuditLogRepository;
use crate::repository::class_group_repo::ClassGroupRepository;
use crate::repository::event_repo::EventRepository;
use crate::repository::student_participation_repo::StudentParticipationRepository;
use crate::repository::student_repo::StudentRepository;

use super::lifecycle::EventApi;

impl EventApi {
    // ==========================================
    // Inclusão avulsa
    // ==========================================

    pub fn add_student_participation(
        &self,
        event_id: i64,
        student_id: i64,
        actor: &str,
    ) -> ApiResult<OperationResponse<StudentParticipation>> {
        OperationResponse::from_result(
            self.try_add_student_participation(event_id, student_id, actor),
            t("common.success"),
        )
    }

    fn try_add_student_participation(
        &self,
        event_id: i64,
        student_id: i64,
        actor: &str,
    ) -> ApiResult<StudentParticipation> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let event = EventRepository::find_by_id_in(&tx, event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("evento (id={})", event_id)))?;
        if event.is_canceled() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "evento {} está cancelado",
                event_id
            )));
        }
        if event.finalized {
            return Err(ApiError::BusinessRuleViolation(format!(
                "evento {} já foi finalizado",
                event_id
            )));
        }

        let student = StudentRepository::find_by_id_in(&tx, student_id)?
            .ok_or_else(|| ApiError::NotFound(format!("aluno (id={})", student_id)))?;
        if !student.active {
            return Err(ApiError::InvalidInput(format!(
                "aluno {} está inativo",
                student.name
            )));
        }

        if StudentParticipationRepository::find_active_by_event_and_student_in(
            &tx, event_id, student_id,
        )?
        .is_some()
        {
            return Err(ApiError::DuplicateEnrollment(format!(
                "aluno {} já participa do evento {}",
                student_id, event_id
            )));
        }

        let active_count =
            StudentParticipationRepository::count_active_by_event_in(&tx, event_id)?;
        if active_count >= event.max_capacity as i64 {
            return Err(ApiError::CapacityExceeded(format!(
                "evento {} já tem {} de {} vagas ocupadas",
                event_id, active_count, event.max_capacity
            )));
        }

        // Evento de turma respeita o perfil cognitivo elegível
        if let Some(group_id) = event.class_group_id {
            let group = ClassGroupRepository::find_by_id_in(&tx, group_id)?
                .ok_or_else(|| ApiError::NotFound(format!("turma (id={})", group_id)))?;
            if !group.accepts_profile(&student.cognitive_profile) {
                return Err(ApiError::IncompatibleProfile(format!(
                    "perfil {} não elegível para a turma {}",
                    student.cognitive_profile, group.name
                )));
            }
        }

        let now = Self::now();
        let participation = NewStudentParticipation {
            event_id,
            student_id,
            made_up_from_event_id: None,
            workbook: student.workbook,
        };
        let participation_id =
            StudentParticipationRepository::insert_in(&tx, &participation, now)?;

        let log = AuditLog::new(AuditAction::AddStudentParticipation, actor)
            .with_payload(&AuditPayload::Participation {
                participation_id,
                event_id,
                student_id,
                made_up_from_event_id: None,
            })
            .with_detail(format!(
                "Aluno {} incluído no evento {}",
                student_id, event_id
            ));
        AuditLogRepository::insert_in(&tx, &log)?;

        let created = StudentParticipationRepository::find_by_id_in(&tx, participation_id)?
            .ok_or_else(|| {
                ApiError::InternalError("participação recém-criada não encontrada".to_string())
            })?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, student_id, actor, "participação incluída");
        Ok(created)
    }

    // ==========================================
    // Desativação
    // ==========================================

    pub fn cancel_student_participation(
        &self,
        event_id: i64,
        student_id: i64,
        actor: &str,
    ) -> ApiResult<OperationResponse<()>> {
        OperationResponse::from_result(
            self.try_cancel_student_participation(event_id, student_id, actor),
            t("common.success"),
        )
    }

    fn try_cancel_student_participation(
        &self,
        event_id: i64,
        student_id: i64,
        actor: &str,
    ) -> ApiResult<()> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let event = EventRepository::find_by_id_in(&tx, event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("evento (id={})", event_id)))?;
        if event.finalized {
            return Err(ApiError::BusinessRuleViolation(format!(
                "evento {} já foi finalizado, participações estão travadas",
                event_id
            )));
        }

        let participation = StudentParticipationRepository::find_active_by_event_and_student_in(
            &tx, event_id, student_id,
        )?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "participação ativa do aluno {} no evento {}",
                student_id, event_id
            ))
        })?;

        let now = Self::now();
        StudentParticipationRepository::deactivate_in(&tx, participation.id, now)?;

        let log = AuditLog::new(AuditAction::CancelStudentParticipation, actor)
            .with_payload(&AuditPayload::Participation {
                participation_id: participation.id,
                event_id,
                student_id,
                made_up_from_event_id: participation.made_up_from_event_id,
            })
            .with_detail(format!(
                "Participação do aluno {} no evento {} desativada",
                student_id, event_id
            ));
        AuditLogRepository::insert_in(&tx, &log)?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, student_id, actor, "participação desativada");
        Ok(())
    }

    // ==========================================
    // Contato pós-falta
    // ==========================================

    pub fn update_contact_status(
        &self,
        event_id: i64,
        student_id: i64,
        status: ContactStatus,
        actor: &str,
    ) -> ApiResult<OperationResponse<()>> {
        OperationResponse::from_result(
            self.try_update_contact_status(event_id, student_id, status, actor),
            t("common.success"),
        )
    }

    fn try_update_contact_status(
        &self,
        event_id: i64,
        student_id: i64,
        status: ContactStatus,
        actor: &str,
    ) -> ApiResult<()> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let participation = StudentParticipationRepository::find_active_by_event_and_student_in(
            &tx, event_id, student_id,
        )?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "participação ativa do aluno {} no evento {}",
                student_id, event_id
            ))
        })?;

        let now = Self::now();
        StudentParticipationRepository::set_contact_status_in(&tx, participation.id, status, now)?;

        let log = AuditLog::new(AuditAction::UpdateContactStatus, actor)
            .with_payload(&AuditPayload::Contact {
                event_id,
                student_id,
                status,
            })
            .with_detail(format!(
                "Contato do aluno {} no evento {} marcado como {}",
                student_id,
                event_id,
                status.to_db_str()
            ));
        AuditLogRepository::insert_in(&tx, &log)?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, student_id, actor, "status de contato atualizado");
        Ok(())
    }
}
