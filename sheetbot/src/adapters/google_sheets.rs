use std::time::Duration;

use reqwest::{Client, Url};
use sheetbot_core::config::SourceConfig;
use sheetbot_core::error::SourceError;
use sheetbot_core::grid::{Grid, ValueRange};
use sheetbot_core::{GridSource, SheetKind, SheetProfile};
use tracing::debug;

#[derive(Clone, Debug)]
pub enum Credential {
    ApiKey(String),
    Bearer(String),
}

/// Reads sheets through the Sheets v4 `values.get` endpoint.
pub struct GoogleSheetsSource {
    client: Client,
    api_base: Url,
    primary_id: String,
    secondary_id: String,
    credential: Credential,
}

impl GoogleSheetsSource {
    pub fn new(config: &SourceConfig, credential: Credential) -> Result<Self, SourceError> {
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| SourceError::Unavailable(format!("bad api_base: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            api_base,
            primary_id: config.spreadsheet_id(SheetKind::Primary).to_string(),
            secondary_id: config.spreadsheet_id(SheetKind::Secondary).to_string(),
            credential,
        })
    }

    fn values_url(&self, kind: SheetKind, profile: &SheetProfile) -> Result<Url, SourceError> {
        let spreadsheet = match kind {
            SheetKind::Primary => &self.primary_id,
            SheetKind::Secondary => &self.secondary_id,
        };
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::Unavailable("api_base cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet.as_str(), "values"])
            .push(&a1_range(profile));
        if let Credential::ApiKey(key) = &self.credential {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

/// `'sheet name'!A1:ZZ1000`; quotes inside the name are doubled.
pub fn a1_range(profile: &SheetProfile) -> String {
    format!("'{}'!{}", profile.sheet_name.replace('\'', "''"), profile.range)
}

fn transport(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Unavailable(e.to_string())
    }
}

impl GridSource for GoogleSheetsSource {
    async fn fetch(&self, kind: SheetKind, profile: &SheetProfile) -> Result<Grid, SourceError> {
        let url = self.values_url(kind, profile)?;
        debug!(sheet = %kind, range = %a1_range(profile), "requesting values");
        let mut request = self.client.get(url);
        if let Credential::Bearer(token) = &self.credential {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?;
        let body: ValueRange = response.json().await.map_err(transport)?;
        debug!(
            sheet = %kind,
            returned = body.range.as_deref().unwrap_or("-"),
            rows = body.values.height(),
            "received values"
        );
        Ok(body.values)
    }
}
