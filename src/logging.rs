// ==========================================
// Inicialização do sistema de logs
// ==========================================
// Usa tracing e tracing-subscriber
// Nível de log configurável por variável de ambiente
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Inicializa o sistema de logs
///
/// # Variáveis de ambiente
/// - RUST_LOG: filtro de nível de log (padrão: info)
///   Exemplos: RUST_LOG=debug ou RUST_LOG=agenda_escolar=trace
///
/// # Exemplo
/// ```no_run
/// use agenda_escolar::logging;
/// logging::init();
/// ```
pub fn init() {
    // Lê o nível de log do ambiente, padrão info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Formato do log
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Inicializa o sistema de logs para testes
///
/// Usa nível mais detalhado para facilitar depuração
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
