// ==========================================
// Agenda Escolar - feed externo de feriados
// ==========================================
// Consulta best-effort: o monitoramento degrada para conjunto vazio
// quando o feed falha. Formato esperado (BrasilAPI):
// GET {base_url}/{ano} -> [{"date":"2026-02-17","name":"Carnaval","type":"national"}]
// ==========================================

use crate::domain::curriculum::Holiday;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::error::Error;

// ==========================================
// Trait do feed
// ==========================================

/// Fonte de feriados por ano civil
#[async_trait]
pub trait HolidayFeed: Send + Sync {
    /// Busca os feriados do ano
    async fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, Box<dyn Error + Send + Sync>>;
}

// ==========================================
// Implementação HTTP
// ==========================================

/// Item bruto devolvido pelo feed
#[derive(Debug, Deserialize)]
struct FeedHoliday {
    date: String,
    name: String,
}

/// Feed de feriados via HTTP
pub struct HttpHolidayFeed {
    base_url: String,
    client: reqwest::Client,
}

impl HttpHolidayFeed {
    /// Cria o feed apontando para a URL base configurada
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Converte os itens brutos, descartando datas malformadas
    fn parse_items(items: Vec<FeedHoliday>) -> Vec<Holiday> {
        let mut holidays = Vec::with_capacity(items.len());

        for item in items {
            match NaiveDate::parse_from_str(&item.date, "%Y-%m-%d") {
                Ok(date) => holidays.push(Holiday {
                    date,
                    description: item.name,
                }),
                Err(_) => {
                    tracing::warn!(
                        raw_date = %item.date,
                        name = %item.name,
                        "data de feriado malformada no feed, item ignorado"
                    );
                }
            }
        }

        holidays
    }
}

#[async_trait]
impl HolidayFeed for HttpHolidayFeed {
    async fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, Box<dyn Error + Send + Sync>> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), year);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(format!("feed de feriados respondeu {}", response.status()).into());
        }

        let items = response.json::<Vec<FeedHoliday>>().await?;

        Ok(Self::parse_items(items))
    }
}

// ==========================================
// Implementação estática
// ==========================================

/// Feed com lista fixa de feriados
///
/// Para testes e para operação offline.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidayFeed {
    holidays: Vec<Holiday>,
}

impl StaticHolidayFeed {
    /// Cria com a lista dada
    pub fn new(holidays: Vec<Holiday>) -> Self {
        Self { holidays }
    }

    /// Cria sem nenhum feriado
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HolidayFeed for StaticHolidayFeed {
    async fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, Box<dyn Error + Send + Sync>> {
        Ok(self
            .holidays
            .iter()
            .filter(|h| h.date.year() == year)
            .cloned()
            .collect())
    }
}
