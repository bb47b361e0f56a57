// ==========================================
// Agenda Escolar - camada de domínio
// ==========================================
// Entidades, tipos e regras puras do agendamento escolar.
// Não contém acesso a dados nem lógica de engine.
// ==========================================

pub mod audit;
pub mod class_group;
pub mod curriculum;
pub mod event;
pub mod occurrence;
pub mod participation;
pub mod types;

// Reexporta entidades principais
pub use audit::{AuditAction, AuditLog, AuditPayload};
pub use class_group::{
    active_window_for_date, ClassGroup, EnrollmentWindow, Room, Student, Teacher,
};
pub use curriculum::{CurriculumWeek, Holiday};
pub use event::{Event, NewEvent};
pub use occurrence::{Occurrence, PseudoEvent};
pub use participation::{
    NewStudentParticipation, StudentParticipation, TeacherParticipation, WorkbookProgress,
};
