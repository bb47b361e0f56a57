// ==========================================
// Construtores de dados para testes de integração
// ==========================================

use chrono::NaiveDateTime;

use agenda_escolar::api::event_api::{
    CreateEventRequest, FinalizeEventRequest, FinalizeStudentResult, FinalizeTeacherResult,
};
use agenda_escolar::api::makeup_api::TransferMakeupRequest;
use agenda_escolar::domain::types::EventType;
use agenda_escolar::domain::WorkbookProgress;

// ==========================================
// Construtor de CreateEventRequest
// ==========================================

/// Constrói pedidos de criação de evento; o padrão é uma aula extra
/// de 60 minutos na sala 1 com 10 vagas e sem vínculos.
pub struct EventRequestBuilder {
    event_type: EventType,
    scheduled_at: NaiveDateTime,
    duration_minutes: i32,
    room_id: i64,
    max_capacity: i32,
    class_group_id: Option<i64>,
    curriculum_week_id: Option<i64>,
    teacher_ids: Vec<i64>,
    student_ids: Vec<i64>,
}

impl EventRequestBuilder {
    pub fn new(scheduled_at: NaiveDateTime) -> Self {
        Self {
            event_type: EventType::ExtraClass,
            scheduled_at,
            duration_minutes: 60,
            room_id: 1,
            max_capacity: 10,
            class_group_id: None,
            curriculum_week_id: None,
            teacher_ids: Vec::new(),
            student_ids: Vec::new(),
        }
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    /// Aula regular vinculada à turma
    pub fn regular(mut self, class_group_id: i64) -> Self {
        self.event_type = EventType::RegularClass;
        self.class_group_id = Some(class_group_id);
        self
    }

    pub fn duration(mut self, minutes: i32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn room(mut self, room_id: i64) -> Self {
        self.room_id = room_id;
        self
    }

    pub fn capacity(mut self, max_capacity: i32) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn week(mut self, curriculum_week_id: i64) -> Self {
        self.curriculum_week_id = Some(curriculum_week_id);
        self
    }

    pub fn teachers(mut self, teacher_ids: Vec<i64>) -> Self {
        self.teacher_ids = teacher_ids;
        self
    }

    pub fn students(mut self, student_ids: Vec<i64>) -> Self {
        self.student_ids = student_ids;
        self
    }

    pub fn build(self) -> CreateEventRequest {
        CreateEventRequest {
            event_type: self.event_type,
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            room_id: self.room_id,
            max_capacity: self.max_capacity,
            class_group_id: self.class_group_id,
            curriculum_week_id: self.curriculum_week_id,
            teacher_ids: self.teacher_ids,
            student_ids: self.student_ids,
        }
    }
}

// ==========================================
// Construtor de FinalizeEventRequest
// ==========================================

pub struct FinalizeRequestBuilder {
    event_id: i64,
    student_results: Vec<FinalizeStudentResult>,
    teacher_results: Vec<FinalizeTeacherResult>,
}

impl FinalizeRequestBuilder {
    pub fn new(event_id: i64) -> Self {
        Self {
            event_id,
            student_results: Vec::new(),
            teacher_results: Vec::new(),
        }
    }

    pub fn present(mut self, student_id: i64, workbook: WorkbookProgress) -> Self {
        self.student_results.push(FinalizeStudentResult {
            student_id,
            attendance: true,
            workbook,
            made_up_from_event_id: None,
        });
        self
    }

    pub fn absent(mut self, student_id: i64, workbook: WorkbookProgress) -> Self {
        self.student_results.push(FinalizeStudentResult {
            student_id,
            attendance: false,
            workbook,
            made_up_from_event_id: None,
        });
        self
    }

    /// Presença registrada como reposição da aula de origem
    pub fn present_made_up(
        mut self,
        student_id: i64,
        from_event_id: i64,
        workbook: WorkbookProgress,
    ) -> Self {
        self.student_results.push(FinalizeStudentResult {
            student_id,
            attendance: true,
            workbook,
            made_up_from_event_id: Some(from_event_id),
        });
        self
    }

    pub fn teacher_present(mut self, teacher_id: i64) -> Self {
        self.teacher_results.push(FinalizeTeacherResult {
            teacher_id,
            attendance: true,
            observation: None,
        });
        self
    }

    pub fn teacher_absent(mut self, teacher_id: i64, observation: &str) -> Self {
        self.teacher_results.push(FinalizeTeacherResult {
            teacher_id,
            attendance: false,
            observation: Some(observation.to_string()),
        });
        self
    }

    pub fn build(self) -> FinalizeEventRequest {
        FinalizeEventRequest {
            event_id: self.event_id,
            student_results: self.student_results,
            teacher_results: self.teacher_results,
        }
    }
}

// ==========================================
// Atalhos
// ==========================================

/// Cursores de apostila totalmente preenchidos
pub fn workbook(
    abacus_book: i32,
    abacus_page: i32,
    challenge_book: i32,
    challenge_page: i32,
) -> WorkbookProgress {
    WorkbookProgress {
        abacus_book: Some(abacus_book),
        abacus_page: Some(abacus_page),
        challenge_book: Some(challenge_book),
        challenge_page: Some(challenge_page),
    }
}

/// Pedido de transferência de reposição sem observação
pub fn transfer_request(
    student_id: i64,
    source_event_id: i64,
    destination_event_id: i64,
) -> TransferMakeupRequest {
    TransferMakeupRequest {
        student_id,
        source_event_id,
        destination_event_id,
        note: None,
    }
}
