// ==========================================
// Agenda Escolar - erros da camada de repositório
// ==========================================
// Ferramenta: macro derive do thiserror
// ==========================================

use thiserror::Error;

/// Erros da camada de repositório
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Erros de banco =====
    #[error("registro não encontrado: {entity} com id={id}")]
    NotFound { entity: String, id: String },

    #[error("falha ao conectar ao banco: {0}")]
    DatabaseConnectionError(String),

    #[error("falha ao adquirir o lock do banco: {0}")]
    LockError(String),

    #[error("falha em transação: {0}")]
    DatabaseTransactionError(String),

    #[error("falha em consulta: {0}")]
    DatabaseQueryError(String),

    #[error("violação de restrição de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("violação de chave estrangeira: {0}")]
    ForeignKeyViolation(String),

    // ===== Erros de regra de negócio =====
    #[error("violação de regra de negócio: {0}")]
    BusinessRuleViolation(String),

    #[error("transição de estado inválida: de {from} para {to}")]
    InvalidStateTransition { from: String, to: String },

    // ===== Erros de regra de dados =====
    #[error("falha de validação de dados: {0}")]
    ValidationError(String),

    #[error("valor inválido no campo {field}: {message}")]
    FieldValueError { field: String, message: String },

    // ===== Erros genéricos =====
    #[error("erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// Classifica erros do rusqlite nas variantes próprias
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "desconhecida".to_string(),
                id: "desconhecido".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Alias de Result da camada
pub type RepositoryResult<T> = Result<T, RepositoryError>;
