// ==========================================
// CalendarApi - calendário materializado
// ==========================================
// Fachada fina sobre o materializador: valida o intervalo pedido e
// mede o tempo da operação. A mistura de eventos persistidos com
// pseudo-eventos sintetizados mora na engine.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::engine::calendar::{CalendarEntry, CalendarFilters, CalendarMaterializer};
use crate::perf::PerfGuard;

pub struct CalendarApi {
    materializer: CalendarMaterializer,
}

impl CalendarApi {
    pub fn new(conn: Arc<Mutex<Connection>>, config: Arc<ConfigManager>) -> Self {
        Self {
            materializer: CalendarMaterializer::new(conn, config),
        }
    }

    /// Calendário do intervalo [from, to], inclusivo nas duas pontas.
    pub fn get_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        filters: &CalendarFilters,
    ) -> ApiResult<Vec<CalendarEntry>> {
        if from > to {
            return Err(ApiError::InvalidInput(format!(
                "intervalo invertido: {} > {}",
                from.format("%d/%m/%Y"),
                to.format("%d/%m/%Y")
            )));
        }

        let _perf = PerfGuard::new("get_calendar");
        Ok(self.materializer.get_calendar(from, to, filters)?)
    }
}
