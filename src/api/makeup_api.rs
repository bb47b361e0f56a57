// ==========================================
// MakeupApi - transferência de reposição
// ==========================================
// Transfere a participação de um aluno de uma aula perdida para a
// aula equivalente de outra turma, dentro da janela configurada.
// A participação de origem é desativada (nunca apagada) e a de
// destino nasce apontando para ela via made_up_from_event_id, o que
// permite remontar a cadeia no monitoramento anual.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult, OperationResponse};
use crate::config::config_manager::ConfigManager;
use crate::domain::audit::{AuditAction, AuditLog, AuditPayload};
use crate::domain::event::Event;
use crate::domain::participation::{NewStudentParticipation, StudentParticipation};
use crate::engine::events::{OptionalNotificationPublisher, SchedulingNotification};
use crate::i18n::t;
use crate::repository::audit_log_repo::AuditLogRepository;
use crate::repository::class_group_repo::ClassGroupRepository;
use crate::repository::event_repo::EventRepository;
use crate::repository::student_participation_repo::StudentParticipationRepository;
use crate::repository::student_repo::StudentRepository;

/// Pedido de transferência de reposição.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferMakeupRequest {
    pub student_id: i64,
    pub source_event_id: i64,      // Aula perdida (ou a perder)
    pub destination_event_id: i64, // Aula equivalente de outra turma
    #[serde(default)]
    pub note: Option<String>, // Observação livre para a notificação
}

/// Fachada do protocolo de reposição.
pub struct MakeupApi {
    conn: Arc<Mutex<Connection>>,
    config: Arc<ConfigManager>,
    publisher: OptionalNotificationPublisher,
}

impl MakeupApi {
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        config: Arc<ConfigManager>,
        publisher: OptionalNotificationPublisher,
    ) -> Self {
        Self {
            conn,
            config,
            publisher,
        }
    }

    fn get_conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("falha ao adquirir o lock: {}", e)))
    }

    pub fn transfer_makeup(
        &self,
        request: &TransferMakeupRequest,
        actor: &str,
    ) -> ApiResult<OperationResponse<StudentParticipation>> {
        OperationResponse::from_result(
            self.try_transfer_makeup(request, actor),
            t("common.success"),
        )
    }

    fn try_transfer_makeup(
        &self,
        request: &TransferMakeupRequest,
        actor: &str,
    ) -> ApiResult<StudentParticipation> {
        if request.source_event_id == request.destination_event_id {
            return Err(ApiError::InvalidInput(
                "origem e destino da reposição são o mesmo evento".to_string(),
            ));
        }

        // Leitura de configuração antes do lock: o ConfigManager
        // compartilha a mesma conexão
        let window_days = self
            .config
            .get_makeup_window_days()
            .map_err(|e| ApiError::InternalError(format!("configuração da janela de reposição: {}", e)))?;

        let now = chrono::Local::now().naive_local();

        let notification;
        let created;
        {
            let conn = self.get_conn()?;
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

            let student = StudentRepository::find_by_id_in(&tx, request.student_id)?
                .ok_or_else(|| ApiError::NotFound(format!("aluno (id={})", request.student_id)))?;
            if !student.active {
                return Err(ApiError::InvalidInput(format!(
                    "aluno {} está inativo",
                    student.name
                )));
            }

            let source = Self::load_event(&tx, request.source_event_id, "evento de origem")?;
            let destination =
                Self::load_event(&tx, request.destination_event_id, "evento de destino")?;

            if source.is_canceled() {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "evento de origem {} está cancelado",
                    source.id
                )));
            }
            if destination.is_canceled() {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "evento de destino {} está cancelado",
                    destination.id
                )));
            }
            if destination.finalized {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "evento de destino {} já foi finalizado",
                    destination.id
                )));
            }

            // Reposição é sempre com outra turma
            if source.class_group_id == destination.class_group_id {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "origem {} e destino {} pertencem à mesma turma",
                    source.id, destination.id
                )));
            }

            let gap_days = (destination.scheduled_at.date() - source.scheduled_at.date())
                .num_days()
                .abs();
            if gap_days > window_days {
                return Err(ApiError::MakeupWindowExceeded(format!(
                    "{} dias entre origem e destino, janela de {} dias",
                    gap_days, window_days
                )));
            }

            if StudentParticipationRepository::find_active_by_event_and_student_in(
                &tx,
                destination.id,
                student.id,
            )?
            .is_some()
            {
                return Err(ApiError::DuplicateEnrollment(format!(
                    "aluno {} já participa do evento de destino {}",
                    student.id, destination.id
                )));
            }

            if let Some(group_id) = destination.class_group_id {
                let group = ClassGroupRepository::find_by_id_in(&tx, group_id)?
                    .ok_or_else(|| ApiError::NotFound(format!("turma (id={})", group_id)))?;
                if !group.accepts_profile(&student.cognitive_profile) {
                    return Err(ApiError::IncompatibleProfile(format!(
                        "perfil {} não elegível para a turma {}",
                        student.cognitive_profile, group.name
                    )));
                }
            }

            let active_count =
                StudentParticipationRepository::count_active_by_event_in(&tx, destination.id)?;
            if active_count >= destination.max_capacity as i64 {
                return Err(ApiError::CapacityExceeded(format!(
                    "evento de destino {} já tem {} de {} vagas ocupadas",
                    destination.id, active_count, destination.max_capacity
                )));
            }

            let source_participation =
                StudentParticipationRepository::find_active_by_event_and_student_in(
                    &tx, source.id, student.id,
                )?
                .ok_or_else(|| {
                    ApiError::NotFound(format!(
                        "participação ativa do aluno {} no evento de origem {}",
                        student.id, source.id
                    ))
                })?;
            if source_participation.attendance == Some(true) {
                return Err(ApiError::AttendedClassMakeup(format!(
                    "aluno {} já tem presença registrada no evento {}",
                    student.id, source.id
                )));
            }

            // Marco de primeira aula segue a reposição
            if student.first_class_event_id == Some(source.id) {
                StudentRepository::set_first_class_event_in(&tx, student.id, Some(destination.id))?;
            }

            // Aula de origem no passado sem presença lançada vira falta
            let retroactive_absence =
                source.scheduled_at <= now && source_participation.attendance.is_none();
            if retroactive_absence {
                StudentParticipationRepository::set_attendance_in(
                    &tx,
                    source_participation.id,
                    false,
                    now,
                )?;
            }

            StudentParticipationRepository::deactivate_in(&tx, source_participation.id, now)?;

            let destination_participation = NewStudentParticipation {
                event_id: destination.id,
                student_id: student.id,
                made_up_from_event_id: Some(source.id),
                workbook: student.workbook,
            };
            let new_participation_id =
                StudentParticipationRepository::insert_in(&tx, &destination_participation, now)?;

            let log = AuditLog::new(AuditAction::TransferMakeup, actor)
                .with_payload(&AuditPayload::Makeup {
                    student_id: student.id,
                    source_event_id: source.id,
                    destination_event_id: destination.id,
                    retroactive_absence,
                })
                .with_detail(format!(
                    "Reposição do aluno {} transferida do evento {} para o evento {}",
                    student.id, source.id, destination.id
                ));
            AuditLogRepository::insert_in(&tx, &log)?;

            created = StudentParticipationRepository::find_by_id_in(&tx, new_participation_id)?
                .ok_or_else(|| {
                    ApiError::InternalError(
                        "participação de reposição recém-criada não encontrada".to_string(),
                    )
                })?;

            notification = SchedulingNotification::makeup_transferred(
                destination.id,
                destination.class_group_id,
                destination.scheduled_at,
                student.id,
                request.note.clone(),
            );

            tx.commit()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
        }

        if let Err(e) = self.publisher.publish(notification) {
            warn!(
                student_id = request.student_id,
                destination_event_id = request.destination_event_id,
                error = %e,
                "falha ao notificar reposição"
            );
        }

        info!(
            student_id = request.student_id,
            source_event_id = request.source_event_id,
            destination_event_id = request.destination_event_id,
            actor,
            "reposição transferida"
        );
        Ok(created)
    }

    fn load_event(tx: &Connection, event_id: i64, label: &str) -> ApiResult<Event> {
        EventRepository::find_by_id_in(tx, event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("{} (id={})", label, event_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pedido_serializa_campos_opcionais() {
        let request = TransferMakeupRequest {
            student_id: 7,
            source_event_id: 100,
            destination_event_id: 200,
            note: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        let parsed: TransferMakeupRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.student_id, 7);
        assert!(parsed.note.is_none());
    }

    #[test]
    fn test_pedido_desserializa_sem_nota() {
        let json = r#"{"student_id":1,"source_event_id":2,"destination_event_id":3}"#;
        let parsed: TransferMakeupRequest = serde_json::from_str(json).unwrap();
        assert!(parsed.note.is_none());
    }
}
