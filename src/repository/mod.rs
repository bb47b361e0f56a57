// ==========================================
// Agenda Escolar - camada de repositórios
// ==========================================
// Regra da camada: repositório não contém regra de negócio.
// Restrição: toda consulta é parametrizada.
// As variantes *_in recebem &Connection para compor a transação
// única das operações de escrita.
// ==========================================

pub mod audit_log_repo;
pub mod class_group_repo;
pub mod curriculum_repo;
pub mod error;
pub mod event_repo;
pub mod reference_repo;
pub mod student_participation_repo;
pub mod student_repo;
pub mod teacher_participation_repo;

// Reexporta os repositórios
pub use audit_log_repo::AuditLogRepository;
pub use class_group_repo::{ClassGroupRepository, EnrollmentWindowRepository};
pub use curriculum_repo::CurriculumWeekRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use event_repo::EventRepository;
pub use reference_repo::{RoomRepository, TeacherRepository};
pub use student_participation_repo::StudentParticipationRepository;
pub use student_repo::StudentRepository;
pub use teacher_participation_repo::TeacherParticipationRepository;
