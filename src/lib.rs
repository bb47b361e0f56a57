// ==========================================
// Agenda Escolar - biblioteca principal
// ==========================================
// Pilha: Rust + SQLite
// Posicionamento: motor de agendamento, detecção de
// conflitos e materialização de calendário
// ==========================================

// Inicializa o sistema de internacionalização
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// Declaração de módulos
// ==========================================

// Camada de domínio - entidades e tipos
pub mod domain;

// Camada de repositório - acesso a dados
pub mod repository;

// Camada de engine - regras de negócio de leitura
pub mod engine;

// Camada de configuração
pub mod config;

// Infraestrutura de banco (inicialização de conexão / PRAGMA)
pub mod db;

// Sistema de logs
pub mod logging;

// Internacionalização
pub mod i18n;

// Instrumentação de performance (SQL trace)
pub mod perf;

// Camada de API - operações de negócio
pub mod api;

// ==========================================
// Reexporta tipos principais
// ==========================================

// Tipos de domínio
pub use domain::types::{ContactStatus, EventStatus, EventType, MeetingKind};

// Entidades de domínio
pub use domain::{
    AuditAction, AuditLog, AuditPayload, ClassGroup, CurriculumWeek, EnrollmentWindow, Event,
    Holiday, NewEvent, NewStudentParticipation, Occurrence, PseudoEvent, Room, Student,
    StudentParticipation, Teacher, TeacherParticipation, WorkbookProgress,
};

// Engines
pub use engine::{
    CalendarEntry, CalendarFilters, CalendarMaterializer, HolidayFeed, HttpHolidayFeed,
    MonitoringAggregator, MonitoringFilters, NoOpNotificationPublisher, NotificationPublisher,
    OptionalNotificationPublisher, RoomAvailability, SchedulingNotification,
    SchedulingRepositories, TeacherAvailability, YearMatrix,
};

// APIs
pub use api::{AuditApi, CalendarApi, ConfigApi, EventApi, MakeupApi, MonitoringApi};

// ==========================================
// Constantes do sistema
// ==========================================

// Versão do sistema
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Nome do sistema
pub const APP_NAME: &str = "Agenda Escolar";

// Versão do banco de dados
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// Verificação de compilação
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
