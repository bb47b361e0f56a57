// ==========================================
// MonitoringApi - matriz anual de acompanhamento
// ==========================================
// Fachada síncrona sobre o agregador assíncrono. A carga do banco e
// a busca de feriados correm em paralelo dentro do agregador; aqui
// apenas resolvemos o runtime: reutiliza o corrente quando há um,
// senão cria um avulso para a chamada.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::engine::holiday_feed::{HolidayFeed, HttpHolidayFeed};
use crate::engine::monitoring::{MonitoringAggregator, MonitoringFilters, YearMatrix};
use crate::perf::PerfGuard;

pub struct MonitoringApi {
    conn: Arc<Mutex<Connection>>,
    config: Arc<ConfigManager>,
    holiday_feed: Option<Arc<dyn HolidayFeed>>,
}

impl MonitoringApi {
    /// Feed de feriados construído a partir da configuração.
    pub fn new(conn: Arc<Mutex<Connection>>, config: Arc<ConfigManager>) -> Self {
        Self {
            conn,
            config,
            holiday_feed: None,
        }
    }

    /// Variante com feed injetado (testes e ambientes sem rede).
    pub fn with_feed(
        conn: Arc<Mutex<Connection>>,
        config: Arc<ConfigManager>,
        holiday_feed: Arc<dyn HolidayFeed>,
    ) -> Self {
        Self {
            conn,
            config,
            holiday_feed: Some(holiday_feed),
        }
    }

    /// Matriz anual: uma linha por aluno com vigência no ano, uma
    /// coluna por semana do roteiro.
    pub fn get_year_matrix(
        &self,
        year: i32,
        filters: &MonitoringFilters,
    ) -> ApiResult<YearMatrix> {
        let feed: Arc<dyn HolidayFeed> = match &self.holiday_feed {
            Some(feed) => Arc::clone(feed),
            None => {
                let base_url = self.config.get_holiday_feed_base_url().map_err(|e| {
                    ApiError::InternalError(format!("configuração do feed de feriados: {}", e))
                })?;
                Arc::new(HttpHolidayFeed::new(base_url))
            }
        };
        let aggregator = MonitoringAggregator::new(Arc::clone(&self.conn), feed);

        let _perf = PerfGuard::new("get_year_matrix");
        let future = aggregator.get_year_matrix(year, filters);
        let result = match tokio::runtime::Handle::try_current() {
            // Dentro de runtime multi-thread: bloqueia o worker atual
            Ok(handle) => tokio::task::block_in_place(|| handle.block_on(future)),
            // Fora de runtime: um avulso só para esta chamada
            Err(_) => tokio::runtime::Runtime::new()
                .map_err(|e| ApiError::InternalError(format!("criação do runtime: {}", e)))?
                .block_on(future),
        };
        Ok(result?)
    }
}
