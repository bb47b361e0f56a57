// ==========================================
// Agenda Escolar - camada de configuração
// ==========================================
// Armazenamento: tabela config_kv (escopo global)
// ==========================================

pub mod config_manager;

// Reexporta o gerenciador de configuração
pub use config_manager::{config_keys, ConfigManager};
