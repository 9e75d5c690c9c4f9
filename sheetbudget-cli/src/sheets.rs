//! Thin Google Sheets v4 / Drive v3 client: just the calls the ledger needs.

use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use sheetbudget_ingest::SheetRow;
use std::time::Duration;

use crate::auth::Session;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Google session expired; sign in again (sheetbudget auth login)")]
    SessionExpired,
    #[error("Google API error: {status} {body}")]
    Api { status: StatusCode, body: String },
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<Value>>>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    session: Session,
}

impl SheetsClient {
    pub fn new(session: Session, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { http, session })
    }

    async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let resp = req
            .header(AUTHORIZATION, self.session.bearer())
            .send()
            .await
            .with_context(|| format!("{what} request"))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SheetsError::SessionExpired.into());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::Error::new(SheetsError::Api { status, body }).context(what.to_string()));
        }
        Ok(resp)
    }

    /// Id of the most recently modified, non-trashed spreadsheet named `name`.
    pub async fn find_file_by_name(&self, name: &str) -> Result<Option<String>> {
        let req = self.http.get(DRIVE_FILES_URL).query(&[
            ("q", drive_query(name).as_str()),
            ("fields", "files(id,name,modifiedTime)"),
            ("orderBy", "modifiedTime desc"),
        ]);
        let list: FileList = self
            .send(req, "drive file search")
            .await?
            .json()
            .await
            .context("parse drive file list")?;

        if list.files.len() > 1 {
            tracing::info!(name, count = list.files.len(), "several spreadsheets share this name; using the newest");
        }
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    /// Create a spreadsheet whose first sheet holds a single header row.
    pub async fn create_spreadsheet(&self, title: &str, sheet: &str, headers: &[&str]) -> Result<String> {
        let req = self
            .http
            .post(SHEETS_API_BASE)
            .json(&create_spreadsheet_body(title, sheet, headers));
        let created: CreatedSpreadsheet = self
            .send(req, "create spreadsheet")
            .await?
            .json()
            .await
            .context("parse create spreadsheet response")?;
        tracing::info!(title, id = %created.spreadsheet_id, "created spreadsheet");
        Ok(created.spreadsheet_id)
    }

    /// All rows in `range` (e.g. `Sheet1`), header included.
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<SheetRow>> {
        let url = values_url(spreadsheet_id, range)?;
        let vr: ValueRange = self
            .send(self.http.get(url), "read sheet values")
            .await?
            .json()
            .await
            .context("parse sheet values")?;
        Ok(rows_from_values(vr.values.unwrap_or_default()))
    }

    pub async fn append_row(&self, spreadsheet_id: &str, range: &str, row: &SheetRow) -> Result<()> {
        let url = values_url(spreadsheet_id, &format!("{range}:append"))?;
        let req = self
            .http
            .post(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": [row] }));
        self.send(req, "append row").await?;
        Ok(())
    }

    pub async fn update_cell(&self, spreadsheet_id: &str, range: &str, value: &str) -> Result<()> {
        let url = values_url(spreadsheet_id, range)?;
        let req = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": [[value]] }));
        self.send(req, "update cell").await?;
        tracing::debug!(range, "updated cell");
        Ok(())
    }
}

fn values_url(spreadsheet_id: &str, range: &str) -> Result<Url> {
    let mut url = Url::parse(SHEETS_API_BASE)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("sheets base url cannot take path segments"))?
        .push(spreadsheet_id)
        .push("values")
        .push(range);
    Ok(url)
}

fn drive_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name='{escaped}' and mimeType='application/vnd.google-apps.spreadsheet' and trashed=false"
    )
}

fn create_spreadsheet_body(title: &str, sheet: &str, headers: &[&str]) -> Value {
    let cells: Vec<Value> = headers
        .iter()
        .map(|h| json!({ "userEnteredValue": { "stringValue": h } }))
        .collect();
    json!({
        "properties": { "title": title },
        "sheets": [{
            "properties": { "title": sheet },
            "data": [{
                "startRow": 0,
                "startColumn": 0,
                "rowData": [{ "values": cells }],
            }],
        }],
    })
}

/// Cells come back as JSON strings, numbers or booleans; normalize to text.
fn rows_from_values(values: Vec<Vec<Value>>) -> Vec<SheetRow> {
    values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|v| match v {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_url_keeps_a1_notation() {
        let url = values_url("abc123", "Sheet1!D7").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Sheet1!D7"
        );
        let url = values_url("abc123", "My Sheet!A1:append").unwrap();
        assert!(url.as_str().ends_with("/values/My%20Sheet!A1:append"));
    }

    #[test]
    fn test_drive_query_escapes_quotes() {
        assert_eq!(
            drive_query("Bob's Budgets"),
            "name='Bob\\'s Budgets' and mimeType='application/vnd.google-apps.spreadsheet' and trashed=false"
        );
    }

    #[test]
    fn test_rows_from_values() {
        let vr: ValueRange = serde_json::from_value(json!({
            "range": "Sheet1!A1:D3",
            "values": [["Amount", "Merchant"], [12.5, "CAFE", null, true]]
        }))
        .unwrap();
        let rows = rows_from_values(vr.values.unwrap());
        assert_eq!(rows[0], vec!["Amount", "Merchant"]);
        assert_eq!(rows[1], vec!["12.5", "CAFE", "", "true"]);
    }

    #[test]
    fn test_empty_sheet_has_no_values_key() {
        let vr: ValueRange = serde_json::from_value(json!({ "range": "Sheet1" })).unwrap();
        assert!(vr.values.is_none());
    }

    #[test]
    fn test_create_body_has_headers() {
        let body = create_spreadsheet_body("Budgets", "Sheet1", &["ID", "Name"]);
        assert_eq!(body["properties"]["title"], "Budgets");
        let cells = &body["sheets"][0]["data"][0]["rowData"][0]["values"];
        assert_eq!(cells[1]["userEnteredValue"]["stringValue"], "Name");
    }

    #[test]
    fn test_session_expired_downcasts() {
        let err: anyhow::Error = SheetsError::SessionExpired.into();
        assert!(matches!(err.downcast_ref::<SheetsError>(), Some(SheetsError::SessionExpired)));
    }
}
