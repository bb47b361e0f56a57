// ==========================================
// EventApi - operações de ciclo de vida
// ==========================================
// Cada operação mutadora segue o mesmo contorno: valida fora do lock
// o que não depende do banco, adquire o lock da conexão, abre uma
// transação, valida contra o estado corrente, grava, audita e comita.
// Notificações saem depois do commit e nunca revertem a operação.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Datelike, NaiveDateTime};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult, OperationResponse};
use crate::config::config_manager::ConfigManager;
use crate::domain::audit::{AuditAction, AuditLog, AuditPayload};
use crate::domain::event::{Event, NewEvent};
use crate::domain::participation::NewStudentParticipation;
use crate::domain::types::{ContactStatus, EventStatus, EventType};
use crate::engine::availability::{RoomAvailability, TeacherAvailability};
use crate::engine::events::{OptionalNotificationPublisher, SchedulingNotification};
use crate::engine::repositories::SchedulingRepositories;
use crate::i18n::t;
use crate::repository::audit_log_repo::AuditLogRepository;
use crate::repository::class_group_repo::{ClassGroupRepository, EnrollmentWindowRepository};
use crate::repository::event_repo::EventRepository;
use crate::repository::student_participation_repo::StudentParticipationRepository;
use crate::repository::teacher_participation_repo::TeacherParticipationRepository;
use crate::repository::reference_repo::{RoomRepository, TeacherRepository};
use crate::repository::student_repo::StudentRepository;

use super::types::{
    CreateEventRequest, FinalizeEventRequest, RescheduleEventRequest, UpdateEventRequest,
};

/// Parâmetros de um horário candidato, validados em bloco.
struct SlotCheck<'a> {
    scheduled_at: NaiveDateTime,
    duration_minutes: i32,
    room_id: i64,
    teacher_ids: &'a [i64],
    class_group_id: Option<i64>,
    ignore_event_id: Option<i64>,
}

/// Fachada de agendamento de eventos.
pub struct EventApi {
    pub(super) conn: Arc<Mutex<Connection>>,
    pub(super) repos: SchedulingRepositories,
    pub(super) config: Arc<ConfigManager>,
    pub(super) publisher: OptionalNotificationPublisher,
}

impl EventApi {
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        config: Arc<ConfigManager>,
        publisher: OptionalNotificationPublisher,
    ) -> Self {
        let repos = SchedulingRepositories::from_connection(Arc::clone(&conn));
        Self {
            conn,
            repos,
            config,
            publisher,
        }
    }

    pub(super) fn get_conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("falha ao adquirir o lock: {}", e)))
    }

    pub(super) fn now() -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    /// Salas virtuais vêm da configuração; a leitura acontece antes do
    /// lock da conexão porque o ConfigManager compartilha o mesmo lock.
    fn virtual_room_ids(&self) -> ApiResult<Vec<i64>> {
        self.config
            .get_virtual_room_ids()
            .map_err(|e| ApiError::InternalError(format!("configuração de salas virtuais: {}", e)))
    }

    // ==========================================
    // Criação
    // ==========================================

    pub fn create_event(
        &self,
        request: &CreateEventRequest,
        actor: &str,
    ) -> ApiResult<OperationResponse<Event>> {
        OperationResponse::from_result(self.try_create_event(request, actor), t("common.success"))
    }

    fn try_create_event(&self, request: &CreateEventRequest, actor: &str) -> ApiResult<Event> {
        Self::validate_duration(request.duration_minutes)?;
        if request.max_capacity < 0 {
            return Err(ApiError::InvalidInput(format!(
                "capacidade não pode ser negativa: {}",
                request.max_capacity
            )));
        }
        if request.event_type == EventType::RegularClass && request.class_group_id.is_none() {
            return Err(ApiError::InvalidInput(
                "aula regular exige turma vinculada".to_string(),
            ));
        }

        let virtual_rooms = self.virtual_room_ids()?;

        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        Self::ensure_slot_free(
            &tx,
            &virtual_rooms,
            &SlotCheck {
                scheduled_at: request.scheduled_at,
                duration_minutes: request.duration_minutes,
                room_id: request.room_id,
                teacher_ids: &request.teacher_ids,
                class_group_id: request.class_group_id,
                ignore_event_id: None,
            },
        )?;

        let mut student_ids = request.student_ids.clone();

        if let Some(group_id) = request.class_group_id {
            let group = ClassGroupRepository::find_by_id_in(&tx, group_id)?
                .ok_or_else(|| ApiError::NotFound(format!("turma (id={})", group_id)))?;
            if request.event_type == EventType::RegularClass && !group.active {
                return Err(ApiError::InvalidInput(format!(
                    "turma {} está inativa",
                    group.name
                )));
            }

            // No máximo uma aula ativa por semana do roteiro e por data
            if let Some(week_id) = request.curriculum_week_id {
                if EventRepository::exists_active_for_group_week_in(&tx, group_id, week_id, None)? {
                    return Err(ApiError::CurriculumWeekTaken(format!(
                        "turma {} já tem aula ativa na semana {} do roteiro",
                        group_id, week_id
                    )));
                }
            }
            let same_day =
                EventRepository::find_by_class_group_and_date_in(&tx, group_id, request.scheduled_at.date())?;
            if same_day.iter().any(|e| e.is_active()) {
                return Err(ApiError::ScheduleConflict(format!(
                    "turma {} já tem aula ativa em {}",
                    group_id,
                    request.scheduled_at.date().format("%d/%m/%Y")
                )));
            }

            // Aula regular sem lista explícita: alunos com vigência na data
            if request.event_type == EventType::RegularClass && student_ids.is_empty() {
                student_ids = EnrollmentWindowRepository::find_covering_date_in(
                    &tx,
                    group_id,
                    request.scheduled_at.date(),
                )?
                .into_iter()
                .map(|window| window.student_id)
                .collect();
                student_ids.dedup();
            }
        }

        if student_ids.len() as i64 > request.max_capacity as i64 {
            return Err(ApiError::CapacityExceeded(format!(
                "{} alunos para {} vagas",
                student_ids.len(),
                request.max_capacity
            )));
        }

        let now = Self::now();
        let new_event = NewEvent {
            event_type: request.event_type,
            scheduled_at: request.scheduled_at,
            duration_minutes: request.duration_minutes,
            room_id: request.room_id,
            max_capacity: request.max_capacity,
            rescheduled_from_id: None,
            class_group_id: request.class_group_id,
            curriculum_week_id: request.curriculum_week_id,
            created_by: actor.to_string(),
        };
        let event_id = EventRepository::insert_in(&tx, &new_event, now)?;

        for &student_id in &student_ids {
            let student = StudentRepository::find_by_id_in(&tx, student_id)?
                .ok_or_else(|| ApiError::NotFound(format!("aluno (id={})", student_id)))?;
            if !student.active {
                return Err(ApiError::InvalidInput(format!(
                    "aluno {} está inativo",
                    student.name
                )));
            }
            let participation = NewStudentParticipation {
                event_id,
                student_id,
                made_up_from_event_id: None,
                workbook: student.workbook,
            };
            StudentParticipationRepository::insert_in(&tx, &participation, now)?;
        }

        for &teacher_id in &request.teacher_ids {
            TeacherParticipationRepository::insert_in(&tx, event_id, teacher_id, now)?;
        }

        let event = EventRepository::find_by_id_in(&tx, event_id)?
            .ok_or_else(|| ApiError::InternalError("evento recém-criado não encontrado".to_string()))?;

        let log = AuditLog::new(AuditAction::CreateEvent, actor)
            .with_payload(&AuditPayload::Event {
                event: event.clone(),
            })
            .with_detail(format!(
                "Evento {} ({}) criado com {} alunos",
                event_id,
                event.event_type.to_db_str(),
                student_ids.len()
            ));
        AuditLogRepository::insert_in(&tx, &log)?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, actor, "evento criado");
        Ok(event)
    }

    // ==========================================
    // Atualização
    // ==========================================

    pub fn update_event(
        &self,
        request: &UpdateEventRequest,
        actor: &str,
    ) -> ApiResult<OperationResponse<Event>> {
        OperationResponse::from_result(self.try_update_event(request, actor), t("common.success"))
    }

    fn try_update_event(&self, request: &UpdateEventRequest, actor: &str) -> ApiResult<Event> {
        Self::validate_duration(request.duration_minutes)?;

        let virtual_rooms = self.virtual_room_ids()?;

        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let event = EventRepository::find_by_id_in(&tx, request.event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("evento (id={})", request.event_id)))?;
        if event.is_canceled() {
            return Err(ApiError::InvalidStateTransition {
                from: EventStatus::Canceled.to_string(),
                to: EventStatus::Active.to_string(),
            });
        }
        if event.finalized {
            return Err(ApiError::InvalidStateTransition {
                from: EventStatus::Finalized.to_string(),
                to: EventStatus::Active.to_string(),
            });
        }

        let active_count =
            StudentParticipationRepository::count_active_by_event_in(&tx, event.id)?;
        if (request.max_capacity as i64) < active_count {
            return Err(ApiError::CapacityExceeded(format!(
                "capacidade {} menor que {} participações ativas",
                request.max_capacity, active_count
            )));
        }

        let current_teachers = TeacherParticipationRepository::find_active_by_event_in(&tx, event.id)?;
        let desired_teachers: Vec<i64> = match &request.teacher_ids {
            Some(ids) => ids.clone(),
            None => current_teachers.iter().map(|p| p.teacher_id).collect(),
        };

        // Revalida o horário ignorando o próprio evento
        Self::ensure_slot_free(
            &tx,
            &virtual_rooms,
            &SlotCheck {
                scheduled_at: request.scheduled_at,
                duration_minutes: request.duration_minutes,
                room_id: request.room_id,
                teacher_ids: &desired_teachers,
                class_group_id: event.class_group_id,
                ignore_event_id: Some(event.id),
            },
        )?;

        if let (Some(group_id), Some(week_id)) = (event.class_group_id, request.curriculum_week_id) {
            if EventRepository::exists_active_for_group_week_in(&tx, group_id, week_id, Some(event.id))? {
                return Err(ApiError::CurriculumWeekTaken(format!(
                    "turma {} já tem aula ativa na semana {} do roteiro",
                    group_id, week_id
                )));
            }
        }

        let now = Self::now();
        EventRepository::update_schedule_in(
            &tx,
            event.id,
            request.scheduled_at,
            request.duration_minutes,
            request.room_id,
            request.max_capacity,
            request.curriculum_week_id,
            now,
        )?;

        // Troca de escala: desativa quem saiu, insere quem entrou
        if request.teacher_ids.is_some() {
            for participation in &current_teachers {
                if !desired_teachers.contains(&participation.teacher_id) {
                    TeacherParticipationRepository::deactivate_in(&tx, participation.id, now)?;
                }
            }
            for &teacher_id in &desired_teachers {
                if !current_teachers.iter().any(|p| p.teacher_id == teacher_id) {
                    TeacherParticipationRepository::insert_in(&tx, event.id, teacher_id, now)?;
                }
            }
        }

        let updated = EventRepository::find_by_id_in(&tx, event.id)?
            .ok_or_else(|| ApiError::InternalError("evento atualizado não encontrado".to_string()))?;

        let log = AuditLog::new(AuditAction::UpdateEvent, actor)
            .with_payload(&AuditPayload::Event {
                event: updated.clone(),
            })
            .with_detail(format!("Evento {} atualizado", event.id));
        AuditLogRepository::insert_in(&tx, &log)?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id = event.id, actor, "evento atualizado");
        Ok(updated)
    }

    // ==========================================
    // Cancelamento
    // ==========================================

    pub fn cancel_event(
        &self,
        event_id: i64,
        reason: &str,
        actor: &str,
    ) -> ApiResult<OperationResponse<Event>> {
        OperationResponse::from_result(
            self.try_cancel_event(event_id, reason, actor),
            t("common.success"),
        )
    }

    fn try_cancel_event(&self, event_id: i64, reason: &str, actor: &str) -> ApiResult<Event> {
        let notification;
        let canceled;
        {
            let conn = self.get_conn()?;
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

            let event = EventRepository::find_by_id_in(&tx, event_id)?
                .ok_or_else(|| ApiError::NotFound(format!("evento (id={})", event_id)))?;
            if event.is_canceled() {
                return Err(ApiError::InvalidStateTransition {
                    from: EventStatus::Canceled.to_string(),
                    to: EventStatus::Canceled.to_string(),
                });
            }

            let affected_students: Vec<i64> =
                StudentParticipationRepository::find_active_by_event_in(&tx, event_id)?
                    .iter()
                    .map(|p| p.student_id)
                    .collect();

            let now = Self::now();
            EventRepository::cancel_in(&tx, event_id, now, reason)?;
            StudentParticipationRepository::set_contact_status_for_event_in(
                &tx,
                event_id,
                ContactStatus::ClassCanceled,
                now,
            )?;
            // Marcos de primeira aula/aula zero não podem apontar para
            // evento cancelado
            StudentRepository::clear_event_pointers_in(&tx, event_id)?;

            let from = event.status(false).to_string();
            let log = AuditLog::new(AuditAction::CancelEvent, actor)
                .with_payload(&AuditPayload::Transition {
                    event_id,
                    from,
                    to: EventStatus::Canceled.to_string(),
                    reason: Some(reason.to_string()),
                })
                .with_detail(format!("Evento {} cancelado: {}", event_id, reason));
            AuditLogRepository::insert_in(&tx, &log)?;

            canceled = EventRepository::find_by_id_in(&tx, event_id)?
                .ok_or_else(|| ApiError::InternalError("evento cancelado não encontrado".to_string()))?;

            notification = SchedulingNotification::canceled(
                event_id,
                event.class_group_id,
                event.scheduled_at,
                affected_students,
                Some(reason.to_string()),
            );

            tx.commit()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
        }

        if let Err(e) = self.publisher.publish(notification) {
            warn!(event_id, error = %e, "falha ao notificar cancelamento");
        }

        info!(event_id, actor, "evento cancelado");
        Ok(canceled)
    }

    // ==========================================
    // Reagendamento
    // ==========================================

    pub fn reschedule_event(
        &self,
        request: &RescheduleEventRequest,
        actor: &str,
    ) -> ApiResult<OperationResponse<Event>> {
        OperationResponse::from_result(
            self.try_reschedule_event(request, actor),
            t("common.success"),
        )
    }

    fn try_reschedule_event(
        &self,
        request: &RescheduleEventRequest,
        actor: &str,
    ) -> ApiResult<Event> {
        let now = Self::now();
        if request.new_scheduled_at <= now {
            return Err(ApiError::InvalidInput(format!(
                "novo horário deve estar no futuro: {}",
                request.new_scheduled_at.format("%d/%m/%Y %H:%M")
            )));
        }

        let virtual_rooms = self.virtual_room_ids()?;

        let notification;
        let replacement;
        {
            let conn = self.get_conn()?;
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

            let source = EventRepository::find_by_id_in(&tx, request.event_id)?
                .ok_or_else(|| ApiError::NotFound(format!("evento (id={})", request.event_id)))?;
            if source.is_canceled() {
                return Err(ApiError::InvalidStateTransition {
                    from: EventStatus::Canceled.to_string(),
                    to: EventStatus::Rescheduled.to_string(),
                });
            }
            if source.finalized {
                return Err(ApiError::InvalidStateTransition {
                    from: EventStatus::Finalized.to_string(),
                    to: EventStatus::Rescheduled.to_string(),
                });
            }

            let room_id = request.new_room_id.unwrap_or(source.room_id);
            let duration_minutes = request.new_duration_minutes.unwrap_or(source.duration_minutes);
            Self::validate_duration(duration_minutes)?;

            let teacher_parts =
                TeacherParticipationRepository::find_active_by_event_in(&tx, source.id)?;
            let teacher_ids: Vec<i64> = teacher_parts.iter().map(|p| p.teacher_id).collect();

            Self::ensure_slot_free(
                &tx,
                &virtual_rooms,
                &SlotCheck {
                    scheduled_at: request.new_scheduled_at,
                    duration_minutes,
                    room_id,
                    teacher_ids: &teacher_ids,
                    class_group_id: source.class_group_id,
                    ignore_event_id: Some(source.id),
                },
            )?;

            if let Some(group_id) = source.class_group_id {
                let same_day = EventRepository::find_by_class_group_and_date_in(
                    &tx,
                    group_id,
                    request.new_scheduled_at.date(),
                )?;
                if same_day.iter().any(|e| e.is_active() && e.id != source.id) {
                    return Err(ApiError::ScheduleConflict(format!(
                        "turma {} já tem aula ativa em {}",
                        group_id,
                        request.new_scheduled_at.date().format("%d/%m/%Y")
                    )));
                }
            }

            let student_parts =
                StudentParticipationRepository::find_active_by_event_in(&tx, source.id)?;

            // Cancela o original e desativa as participações dele
            EventRepository::cancel_in(&tx, source.id, now, "reagendamento")?;
            StudentParticipationRepository::deactivate_for_event_in(&tx, source.id, now)?;
            TeacherParticipationRepository::deactivate_for_event_in(&tx, source.id, now)?;

            let new_event = NewEvent {
                event_type: source.event_type,
                scheduled_at: request.new_scheduled_at,
                duration_minutes,
                room_id,
                max_capacity: source.max_capacity,
                rescheduled_from_id: Some(source.id),
                class_group_id: source.class_group_id,
                curriculum_week_id: source.curriculum_week_id,
                created_by: actor.to_string(),
            };
            let replacement_id = EventRepository::insert_in(&tx, &new_event, now)?;

            // Transplanta as participações preservando presença e contato
            for part in &student_parts {
                let carried = NewStudentParticipation {
                    event_id: replacement_id,
                    student_id: part.student_id,
                    made_up_from_event_id: part.made_up_from_event_id,
                    workbook: part.workbook,
                };
                let new_part_id =
                    StudentParticipationRepository::insert_in(&tx, &carried, now)?;
                if let Some(attendance) = part.attendance {
                    StudentParticipationRepository::set_attendance_in(
                        &tx,
                        new_part_id,
                        attendance,
                        now,
                    )?;
                }
                if part.contact_status != ContactStatus::NotContacted {
                    StudentParticipationRepository::set_contact_status_in(
                        &tx,
                        new_part_id,
                        part.contact_status,
                        now,
                    )?;
                }
            }
            for part in &teacher_parts {
                let new_part_id = TeacherParticipationRepository::insert_in(
                    &tx,
                    replacement_id,
                    part.teacher_id,
                    now,
                )?;
                if let Some(attendance) = part.attendance {
                    TeacherParticipationRepository::write_finalization_in(
                        &tx,
                        new_part_id,
                        attendance,
                        part.observation.as_deref(),
                        now,
                    )?;
                }
            }

            let log = AuditLog::new(AuditAction::RescheduleEvent, actor)
                .with_payload(&AuditPayload::Reschedule {
                    source_event_id: source.id,
                    replacement_event_id: replacement_id,
                    new_scheduled_at: request.new_scheduled_at,
                    new_room_id: room_id,
                    carried_students: student_parts.len(),
                })
                .with_detail(format!(
                    "Evento {} reagendado para {} (substituto {})",
                    source.id,
                    request.new_scheduled_at.format("%d/%m/%Y %H:%M"),
                    replacement_id
                ));
            AuditLogRepository::insert_in(&tx, &log)?;

            replacement = EventRepository::find_by_id_in(&tx, replacement_id)?
                .ok_or_else(|| ApiError::InternalError("evento substituto não encontrado".to_string()))?;

            notification = SchedulingNotification::rescheduled(
                replacement_id,
                source.class_group_id,
                request.new_scheduled_at,
                student_parts.iter().map(|p| p.student_id).collect(),
            );

            tx.commit()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
        }

        if let Err(e) = self.publisher.publish(notification) {
            warn!(
                event_id = request.event_id,
                error = %e,
                "falha ao notificar reagendamento"
            );
        }

        info!(
            source_event_id = request.event_id,
            replacement_event_id = replacement.id,
            actor,
            "evento reagendado"
        );
        Ok(replacement)
    }

    // ==========================================
    // Fechamento
    // ==========================================

    pub fn finalize_event(
        &self,
        request: &FinalizeEventRequest,
        actor: &str,
    ) -> ApiResult<OperationResponse<Event>> {
        OperationResponse::from_result(
            self.try_finalize_event(request, actor),
            t("common.success"),
        )
    }

    fn try_finalize_event(&self, request: &FinalizeEventRequest, actor: &str) -> ApiResult<Event> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let event = EventRepository::find_by_id_in(&tx, request.event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("evento (id={})", request.event_id)))?;
        if event.is_canceled() {
            return Err(ApiError::InvalidStateTransition {
                from: EventStatus::Canceled.to_string(),
                to: EventStatus::Finalized.to_string(),
            });
        }
        if event.finalized {
            return Err(ApiError::InvalidStateTransition {
                from: EventStatus::Finalized.to_string(),
                to: EventStatus::Finalized.to_string(),
            });
        }

        let student_parts =
            StudentParticipationRepository::find_active_by_event_in(&tx, event.id)?;
        let teacher_parts =
            TeacherParticipationRepository::find_active_by_event_in(&tx, event.id)?;

        let now = Self::now();
        let mut present = 0usize;
        let mut absent = 0usize;

        for result in &request.student_results {
            let participation = student_parts
                .iter()
                .find(|p| p.student_id == result.student_id)
                .ok_or_else(|| {
                    ApiError::InvalidInput(format!(
                        "aluno {} sem participação ativa no evento {}",
                        result.student_id, event.id
                    ))
                })?;

            // Presença vinda de reposição precisa apontar para evento real
            if let Some(source_id) = result.made_up_from_event_id {
                if EventRepository::find_by_id_in(&tx, source_id)?.is_none() {
                    return Err(ApiError::NotFound(format!(
                        "evento de origem da reposição (id={})",
                        source_id
                    )));
                }
            }

            StudentParticipationRepository::write_finalization_in(
                &tx,
                participation.id,
                result.attendance,
                &result.workbook,
                result.made_up_from_event_id,
                now,
            )?;
            // Cursores do aluno avançam junto com o fechamento
            StudentRepository::update_workbook_in(&tx, result.student_id, &result.workbook)?;

            if result.attendance {
                present += 1;
            } else {
                absent += 1;
            }
        }

        for result in &request.teacher_results {
            let participation = teacher_parts
                .iter()
                .find(|p| p.teacher_id == result.teacher_id)
                .ok_or_else(|| {
                    ApiError::InvalidInput(format!(
                        "professor {} sem participação ativa no evento {}",
                        result.teacher_id, event.id
                    ))
                })?;
            TeacherParticipationRepository::write_finalization_in(
                &tx,
                participation.id,
                result.attendance,
                result.observation.as_deref(),
                now,
            )?;
        }

        EventRepository::set_finalized_in(&tx, event.id, true, now)?;

        let log = AuditLog::new(AuditAction::FinalizeEvent, actor)
            .with_payload(&AuditPayload::Finalization {
                event_id: event.id,
                present,
                absent,
            })
            .with_detail(format!(
                "Evento {} finalizado: {} presentes, {} ausentes",
                event.id, present, absent
            ));
        AuditLogRepository::insert_in(&tx, &log)?;

        let finalized = EventRepository::find_by_id_in(&tx, event.id)?
            .ok_or_else(|| ApiError::InternalError("evento finalizado não encontrado".to_string()))?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id = event.id, present, absent, actor, "evento finalizado");
        Ok(finalized)
    }

    // ==========================================
    // Reabertura
    // ==========================================

    pub fn reopen_event(&self, event_id: i64, actor: &str) -> ApiResult<OperationResponse<Event>> {
        OperationResponse::from_result(self.try_reopen_event(event_id, actor), t("common.success"))
    }

    fn try_reopen_event(&self, event_id: i64, actor: &str) -> ApiResult<Event> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let event = EventRepository::find_by_id_in(&tx, event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("evento (id={})", event_id)))?;
        if event.is_canceled() {
            return Err(ApiError::InvalidStateTransition {
                from: EventStatus::Canceled.to_string(),
                to: EventStatus::Active.to_string(),
            });
        }
        if !event.finalized {
            return Err(ApiError::InvalidStateTransition {
                from: EventStatus::Active.to_string(),
                to: EventStatus::Active.to_string(),
            });
        }

        let now = Self::now();
        EventRepository::set_finalized_in(&tx, event_id, false, now)?;

        let log = AuditLog::new(AuditAction::ReopenEvent, actor)
            .with_payload(&AuditPayload::Transition {
                event_id,
                from: EventStatus::Finalized.to_string(),
                to: EventStatus::Active.to_string(),
                reason: None,
            })
            .with_detail(format!("Evento {} reaberto para correção", event_id));
        AuditLogRepository::insert_in(&tx, &log)?;

        let reopened = EventRepository::find_by_id_in(&tx, event_id)?
            .ok_or_else(|| ApiError::InternalError("evento reaberto não encontrado".to_string()))?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, actor, "evento reaberto");
        Ok(reopened)
    }

    // ==========================================
    // Validações compartilhadas
    // ==========================================

    fn validate_duration(duration_minutes: i32) -> ApiResult<()> {
        if duration_minutes <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "duração deve ser positiva: {} minutos",
                duration_minutes
            )));
        }
        Ok(())
    }

    /// Sala livre e professores disponíveis no horário candidato.
    fn ensure_slot_free(
        tx: &Connection,
        virtual_rooms: &[i64],
        check: &SlotCheck<'_>,
    ) -> ApiResult<()> {
        if !RoomRepository::exists_active_in(tx, check.room_id)? {
            return Err(ApiError::NotFound(format!("sala (id={})", check.room_id)));
        }
        if RoomAvailability::is_occupied(
            tx,
            virtual_rooms,
            check.room_id,
            check.scheduled_at,
            check.duration_minutes,
            check.ignore_event_id,
        )? {
            return Err(ApiError::RoomConflict(format!(
                "sala {} ocupada em {}",
                check.room_id,
                check.scheduled_at.format("%d/%m/%Y %H:%M")
            )));
        }

        let day_of_week = check.scheduled_at.date().weekday().num_days_from_monday() as i32;
        for &teacher_id in check.teacher_ids {
            if !TeacherRepository::exists_active_in(tx, teacher_id)? {
                return Err(ApiError::NotFound(format!("professor (id={})", teacher_id)));
            }
            if TeacherAvailability::has_recurring_class_conflict(
                tx,
                teacher_id,
                day_of_week,
                check.scheduled_at.time(),
                check.class_group_id,
            )? {
                return Err(ApiError::TeacherConflict(format!(
                    "professor {} tem turma recorrente no mesmo dia e horário",
                    teacher_id
                )));
            }
            if TeacherAvailability::has_participation_conflict(
                tx,
                teacher_id,
                check.scheduled_at,
                check.duration_minutes,
                check.ignore_event_id,
            )? {
                return Err(ApiError::TeacherConflict(format!(
                    "professor {} já escalado em evento que sobrepõe o horário",
                    teacher_id
                )));
            }
        }
        Ok(())
    }
}
