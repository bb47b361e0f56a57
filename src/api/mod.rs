// ==========================================
// Agenda Escolar - camada de API
// ==========================================
// Fachadas de negócio consumidas pela casca de apresentação.
// Recusa de negócio vira OperationResponse com categoria; erro
// técnico continua subindo como ApiError.
// ==========================================

pub mod audit_api;
pub mod calendar_api;
pub mod config_api;
pub mod error;
pub mod event_api;
pub mod makeup_api;
pub mod monitoring_api;

// Reexporta as fachadas e os tipos de contorno
pub use audit_api::AuditApi;
pub use calendar_api::CalendarApi;
pub use config_api::{ConfigApi, ConfigEntry};
pub use error::{ApiError, ApiResult, ErrorCategory, OperationResponse};
pub use event_api::{
    CreateEventRequest, EventApi, EventDetail, FinalizeEventRequest, FinalizeStudentResult,
    FinalizeTeacherResult, RescheduleEventRequest, UpdateEventRequest,
};
pub use makeup_api::{MakeupApi, TransferMakeupRequest};
pub use monitoring_api::MonitoringApi;
