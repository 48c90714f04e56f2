// src/analyze/prompt.rs
//! Prompt templates. Fields are interpolated verbatim, no escaping.

/// Sentinel the model is asked to return for reports outside the city.
pub const OUTSIDE_CITY: &str = "Externo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    LocalReports,
    NewsFeed,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportPromptFields<'a> {
    pub title: &'a str,
    pub details: &'a str,
    pub location: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct NewsPromptFields<'a> {
    pub title: &'a str,
    pub summary: &'a str,
}

pub enum PromptFields<'a> {
    Report(ReportPromptFields<'a>),
    News(NewsPromptFields<'a>),
}

impl PromptFields<'_> {
    pub fn kind(&self) -> SourceKind {
        match self {
            PromptFields::Report(_) => SourceKind::LocalReports,
            PromptFields::News(_) => SourceKind::NewsFeed,
        }
    }
}

/// Render the template matching the fields' source kind.
pub fn render(fields: &PromptFields<'_>) -> String {
    match fields {
        PromptFields::Report(f) => report_prompt(f),
        PromptFields::News(f) => news_prompt(f),
    }
}

pub fn report_prompt(f: &ReportPromptFields<'_>) -> String {
    format!(
        r#"Analise este relato de saúde participativa:
Título: {title}
Detalhes: {details}
Local: {location}

Responda APENAS um JSON:
{{
    "nivel_risco": "Alto, Médio ou Baixo",
    "bairro_estimado": "Nome do bairro em Manaus (se não for Manaus, coloque '{outside}')",
    "latitude": "float (estime a lat de Manaus)",
    "longitude": "float (estime a long de Manaus)"
}}"#,
        title = f.title,
        details = f.details,
        location = f.location,
        outside = OUTSIDE_CITY,
    )
}

pub fn news_prompt(f: &NewsPromptFields<'_>) -> String {
    format!(
        r#"Analise esta notícia de saúde pública global:
Título: {title}
Resumo: {summary}

1. É uma doença infecciosa ou surto?
2. É relevante para o Brasil/Amazonas? (Sim/Não)
3. Qual o nível de risco?

Responda estritamente neste formato JSON:
{{
    "relevante": true/false,
    "doenca": "Nome da doença",
    "local": "Cidade/País mencionado",
    "nivel_risco": "Alto/Médio/Baixo"
}}"#,
        title = f.title,
        summary = f.summary,
    )
}
