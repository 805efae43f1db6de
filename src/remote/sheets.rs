use std::fs;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::{a1_range, col_letters, Record, RemoteError, RemoteTable};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const TIMEOUT_SECS: u64 = 30;

/// One worksheet of a remote spreadsheet, driven over its values REST API.
/// Constructed explicitly and handed to the drivers; there is no shared
/// process-wide client.
pub struct SheetsClient {
    http: Client,
    spreadsheet_id: String,
    worksheet: String,
    token: String,
}

impl SheetsClient {
    pub fn connect(
        sheet_url: &str,
        credential_path: &Path,
        worksheet: &str,
    ) -> Result<Self, RemoteError> {
        let spreadsheet_id = extract_spreadsheet_id(sheet_url)?;
        let token = load_access_token(credential_path)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(SheetsClient {
            http,
            spreadsheet_id,
            worksheet: worksheet.to_string(),
            token,
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!("{API_BASE}/{}/values/{range}", self.spreadsheet_id)
    }

    fn get_json(&self, url: &str) -> Result<Value, RemoteError> {
        let resp = self.http.get(url).bearer_auth(&self.token).send()?;
        read_json(resp)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Value, RemoteError> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()?;
        read_json(resp)
    }

    fn put_json(&self, url: &str, body: &Value) -> Result<Value, RemoteError> {
        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()?;
        read_json(resp)
    }

    /// Fetches a range as a grid of strings. Absent trailing cells come
    /// back absent from the API; callers treat short rows as empty cells.
    fn fetch_values(&self, range: &str, by_columns: bool) -> Result<Vec<Vec<String>>, RemoteError> {
        let mut url = self.values_url(range);
        if by_columns {
            url.push_str("?majorDimension=COLUMNS");
        }
        let body = self.get_json(&url)?;
        Ok(parse_values(&body))
    }

    /// The whole worksheet, rows-major.
    fn grid(&self) -> Result<Vec<Vec<String>>, RemoteError> {
        self.fetch_values(&self.worksheet, false)
    }

    /// Numeric id of the worksheet, needed by structural updates.
    fn sheet_id(&self) -> Result<i64, RemoteError> {
        let url = format!(
            "{API_BASE}/{}?fields=sheets.properties",
            self.spreadsheet_id
        );
        let body = self.get_json(&url)?;

        let sheets = body
            .get("sheets")
            .and_then(|v| v.as_array())
            .ok_or_else(|| RemoteError::Protocol("missing sheets in metadata".to_string()))?;

        for sheet in sheets {
            let props = sheet.get("properties").unwrap_or(&Value::Null);
            let title = props.get("title").and_then(|v| v.as_str()).unwrap_or("");
            if title == self.worksheet {
                if let Some(id) = props.get("sheetId").and_then(|v| v.as_i64()) {
                    return Ok(id);
                }
            }
        }

        Err(RemoteError::Protocol(format!(
            "worksheet {:?} not found in spreadsheet",
            self.worksheet
        )))
    }
}

impl RemoteTable for SheetsClient {
    fn row_values(&self, row: usize) -> Result<Vec<String>, RemoteError> {
        let range = format!("{}!{row}:{row}", self.worksheet);
        let mut rows = self.fetch_values(&range, false)?;
        Ok(if rows.is_empty() { Vec::new() } else { rows.remove(0) })
    }

    fn col_values(&self, col: usize) -> Result<Vec<String>, RemoteError> {
        let letters = col_letters(col);
        let range = format!("{}!{letters}:{letters}", self.worksheet);
        let mut cols = self.fetch_values(&range, true)?;
        Ok(if cols.is_empty() { Vec::new() } else { cols.remove(0) })
    }

    fn records(&self) -> Result<Vec<Record>, RemoteError> {
        let grid = self.grid()?;
        Ok(records_from_grid(&grid))
    }

    fn find_in_row(&self, row: usize, needle: &str) -> Result<Option<usize>, RemoteError> {
        let values = self.row_values(row)?;
        Ok(values.iter().position(|v| v == needle).map(|i| i + 1))
    }

    fn find_in_col(&self, col: usize, needle: &str) -> Result<Option<usize>, RemoteError> {
        let values = self.col_values(col)?;
        Ok(values.iter().position(|v| v == needle).map(|i| i + 1))
    }

    fn append_row(&mut self, row: Vec<String>) -> Result<(), RemoteError> {
        let url = format!(
            "{}:append?valueInputOption=RAW",
            self.values_url(&self.worksheet)
        );
        self.post_json(&url, &json!({ "values": [row] }))?;
        Ok(())
    }

    fn delete_rows(&mut self, rows: &[usize]) -> Result<(), RemoteError> {
        if rows.is_empty() {
            return Ok(());
        }

        let sheet_id = self.sheet_id()?;

        // Highest-first so one deletion cannot shift the next.
        let mut ordered: Vec<usize> = rows.to_vec();
        ordered.sort_unstable();
        ordered.dedup();
        ordered.reverse();

        let requests: Vec<Value> = ordered
            .iter()
            .map(|&row| {
                json!({
                    "deleteDimension": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "ROWS",
                            "startIndex": row - 1,
                            "endIndex": row,
                        }
                    }
                })
            })
            .collect();

        let url = format!("{API_BASE}/{}:batchUpdate", self.spreadsheet_id);
        self.post_json(&url, &json!({ "requests": requests }))?;
        Ok(())
    }

    fn update_range(
        &mut self,
        row: usize,
        col: usize,
        values: Vec<Vec<String>>,
    ) -> Result<(), RemoteError> {
        let rows = values.len();
        let cols = values.iter().map(Vec::len).max().unwrap_or(0);
        let range = format!("{}!{}", self.worksheet, a1_range(row, col, rows, cols));

        let url = format!("{}?valueInputOption=RAW", self.values_url(&range));
        self.put_json(&url, &json!({ "values": values }))?;
        Ok(())
    }
}

fn extract_spreadsheet_id(sheet_url: &str) -> Result<String, RemoteError> {
    let re = Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)")
        .map_err(|e| RemoteError::Protocol(e.to_string()))?;

    re.captures(sheet_url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            RemoteError::Protocol(format!("cannot extract spreadsheet id from {sheet_url:?}"))
        })
}

/// Pulls the bearer token out of the decoded credential file. Token
/// acquisition itself happens outside this process; the credential is
/// expected to already carry a usable access token.
fn load_access_token(credential_path: &Path) -> Result<String, RemoteError> {
    let text = fs::read_to_string(credential_path)
        .map_err(|e| RemoteError::Credential(format!("cannot read credential file: {e}")))?;

    let value: Value = serde_json::from_str(&text)
        .map_err(|e| RemoteError::Credential(format!("credential file is not JSON: {e}")))?;

    value
        .get("access_token")
        .or_else(|| value.get("token"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            RemoteError::Credential("credential file has no access_token field".to_string())
        })
}

/// Reads a response as text first so error bodies survive JSON failures.
fn read_json(resp: reqwest::blocking::Response) -> Result<Value, RemoteError> {
    let status = resp.status();
    let text = resp.text()?;

    if !status.is_success() {
        let snippet: String = text.chars().take(300).collect();
        return Err(RemoteError::Protocol(format!("status {status}: {snippet}")));
    }

    serde_json::from_str(&text)
        .map_err(|e| RemoteError::Protocol(format!("invalid JSON body: {e}")))
}

fn parse_values(body: &Value) -> Vec<Vec<String>> {
    let Some(rows) = body.get("values").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    rows.iter()
        .map(|row| {
            row.as_array()
                .map(|cells| cells.iter().map(cell_to_string).collect())
                .unwrap_or_default()
        })
        .collect()
}

fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn records_from_grid(grid: &[Vec<String>]) -> Vec<Record> {
    let Some((header, data)) = grid.split_first() else {
        return Vec::new();
    };

    data.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}
