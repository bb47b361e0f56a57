// ==========================================
// Agenda Escolar - agregado de repositórios do motor
// ==========================================
// Agrupa os repositórios que as operações de agendamento usam,
// reduzindo a lista de parâmetros dos construtores das APIs.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{
    AuditLogRepository, ClassGroupRepository, CurriculumWeekRepository,
    EnrollmentWindowRepository, EventRepository, RoomRepository, StudentParticipationRepository,
    StudentRepository, TeacherParticipationRepository, TeacherRepository,
};

/// Conjunto de repositórios do motor de agendamento
///
/// Todos compartilham a mesma conexão; as operações de escrita não
/// usam os métodos de instância e sim as variantes *_in dentro da
/// transação própria.
#[derive(Clone)]
pub struct SchedulingRepositories {
    /// Eventos
    pub event_repo: Arc<EventRepository>,
    /// Participações de aluno
    pub student_participation_repo: Arc<StudentParticipationRepository>,
    /// Participações de professor
    pub teacher_participation_repo: Arc<TeacherParticipationRepository>,
    /// Turmas
    pub class_group_repo: Arc<ClassGroupRepository>,
    /// Vigências de matrícula
    pub enrollment_window_repo: Arc<EnrollmentWindowRepository>,
    /// Alunos
    pub student_repo: Arc<StudentRepository>,
    /// Professores
    pub teacher_repo: Arc<TeacherRepository>,
    /// Salas
    pub room_repo: Arc<RoomRepository>,
    /// Semanas de roteiro
    pub curriculum_week_repo: Arc<CurriculumWeekRepository>,
    /// Trilha de auditoria
    pub audit_log_repo: Arc<AuditLogRepository>,
}

impl SchedulingRepositories {
    /// Monta o conjunto inteiro sobre uma conexão compartilhada
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            event_repo: Arc::new(EventRepository::new(conn.clone())),
            student_participation_repo: Arc::new(StudentParticipationRepository::new(conn.clone())),
            teacher_participation_repo: Arc::new(TeacherParticipationRepository::new(conn.clone())),
            class_group_repo: Arc::new(ClassGroupRepository::new(conn.clone())),
            enrollment_window_repo: Arc::new(EnrollmentWindowRepository::new(conn.clone())),
            student_repo: Arc::new(StudentRepository::new(conn.clone())),
            teacher_repo: Arc::new(TeacherRepository::new(conn.clone())),
            room_repo: Arc::new(RoomRepository::new(conn.clone())),
            curriculum_week_repo: Arc::new(CurriculumWeekRepository::new(conn.clone())),
            audit_log_repo: Arc::new(AuditLogRepository::new(conn)),
        }
    }
}

// Nota: a construção exige banco real; a validação do agregado fica
// nos testes de integração das APIs.
