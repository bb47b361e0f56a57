// ==========================================
// Agenda Escolar - erros da camada de API
// ==========================================
// Converte os erros técnicos do repositório em erros de negócio com
// mensagem explícita. Toda recusa carrega o motivo.
// ==========================================

use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Erros da camada de API
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Conflitos de agenda
    // ==========================================
    /// Sala ocupada no intervalo pretendido
    #[error("conflito de sala: {0}")]
    RoomConflict(String),

    /// Professor ocupado no intervalo pretendido
    #[error("conflito de professor: {0}")]
    TeacherConflict(String),

    /// Conflito de agenda genérico
    #[error("conflito de agenda: {0}")]
    ScheduleConflict(String),

    /// Aluno já participa do evento
    #[error("matrícula duplicada: {0}")]
    DuplicateEnrollment(String),

    /// Semana de roteiro já ocupada por outra aula da turma
    #[error("semana de roteiro já ocupada: {0}")]
    CurriculumWeekTaken(String),

    /// Destino da reposição fora da janela permitida
    #[error("janela de reposição excedida: {0}")]
    MakeupWindowExceeded(String),

    // ==========================================
    // Estado e regra de negócio
    // ==========================================
    #[error("transição de estado inválida: de {from} para {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Evento de destino sem vaga
    #[error("capacidade excedida: {0}")]
    CapacityExceeded(String),

    /// Reposição a partir de aula com presença registrada
    #[error("aula de origem já assistida: {0}")]
    AttendedClassMakeup(String),

    #[error("violação de regra de negócio: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // Validação de entrada
    // ==========================================
    #[error("entrada inválida: {0}")]
    InvalidInput(String),

    /// Perfil cognitivo do aluno não aceito pela turma
    #[error("perfil incompatível: {0}")]
    IncompatibleProfile(String),

    #[error("falha de validação de dados: {0}")]
    ValidationError(String),

    // ==========================================
    // Recursos
    // ==========================================
    #[error("recurso não encontrado: {0}")]
    NotFound(String),

    // ==========================================
    // Dependências externas
    // ==========================================
    #[error("falha de dependência externa: {0}")]
    ExternalDependencyFailure(String),

    // ==========================================
    // Acesso a dados
    // ==========================================
    #[error("erro de banco de dados: {0}")]
    DatabaseError(String),

    #[error("falha de conexão com o banco: {0}")]
    DatabaseConnectionError(String),

    #[error("falha em transação: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // Genéricos
    // ==========================================
    #[error("erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// Categoria de erro
// ==========================================
// Agrupamento estável para a casca de apresentação decidir o
// tratamento (reexibir formulário, alertar, abortar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    InvalidState,
    Validation,
    ExternalDependency,
    Internal,
}

impl ApiError {
    /// Categoria estável do erro
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::RoomConflict(_)
            | ApiError::TeacherConflict(_)
            | ApiError::ScheduleConflict(_)
            | ApiError::DuplicateEnrollment(_)
            | ApiError::CurriculumWeekTaken(_)
            | ApiError::MakeupWindowExceeded(_) => ErrorCategory::Conflict,

            ApiError::InvalidStateTransition { .. }
            | ApiError::CapacityExceeded(_)
            | ApiError::AttendedClassMakeup(_)
            | ApiError::BusinessRuleViolation(_) => ErrorCategory::InvalidState,

            ApiError::InvalidInput(_)
            | ApiError::IncompatibleProfile(_)
            | ApiError::ValidationError(_) => ErrorCategory::Validation,

            ApiError::NotFound(_) => ErrorCategory::NotFound,

            ApiError::ExternalDependencyFailure(_) => ErrorCategory::ExternalDependency,

            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Erros internos sobem como Err; os demais viram resposta de recusa
    pub fn is_internal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }
}

// ==========================================
// Conversão de RepositoryError
// ==========================================
// Restrições do banco carregam o nome da tabela na mensagem; é o
// que permite classificar unicidade em matrícula duplicada ou
// semana de roteiro ocupada.
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) não encontrado", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("falha ao adquirir o lock: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),

            RepositoryError::UniqueConstraintViolation(msg) => {
                if msg.contains("student_participations") {
                    ApiError::DuplicateEnrollment(msg)
                } else if msg.contains("curriculum_week") {
                    ApiError::CurriculumWeekTaken(msg)
                } else {
                    ApiError::BusinessRuleViolation(format!("violação de unicidade: {}", msg))
                }
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("referência inexistente: {}", msg))
            }

            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }

            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("campo {}: {}", field, message))
            }

            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

/// Alias de Result da camada
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// Envelope de resposta das operações
// ==========================================
// Recusas de negócio voltam como resposta com success=false; só
// erros internos sobem como Err.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResponse<T> {
    /// Operação concluída
    pub success: bool,
    /// Mensagem para exibição (catálogo i18n ou motivo da recusa)
    pub message: String,
    /// Categoria do erro quando success=false
    pub error_category: Option<ErrorCategory>,
    /// Carga útil quando success=true
    pub payload: Option<T>,
}

impl<T> OperationResponse<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_category: None,
            payload: Some(payload),
        }
    }

    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_category: None,
            payload: None,
        }
    }

    pub fn fail(error: &ApiError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            error_category: Some(error.category()),
            payload: None,
        }
    }

    /// Dobra o resultado: recusa de negócio vira resposta, erro
    /// interno continua subindo
    pub fn from_result(result: ApiResult<T>, success_message: impl Into<String>) -> ApiResult<Self> {
        match result {
            Ok(payload) => Ok(Self::ok(success_message, payload)),
            Err(e) if e.is_internal() => Err(e),
            Err(e) => Ok(Self::fail(&e)),
        }
    }
}
