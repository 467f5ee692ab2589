//! Wire shapes for the Sheets v4 and OAuth token endpoints.

use serde::{Deserialize, Serialize};

/// JWT claims for the service-account bearer assertion.
#[derive(Debug, Serialize)]
pub(super) struct AssertionClaims<'a> {
    pub iss: &'a str,
    pub scope: &'a str,
    pub aud: &'a str,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SpreadsheetDto {
    pub properties: SpreadsheetPropertiesDto,
    #[serde(default)]
    pub sheets: Vec<SheetDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SpreadsheetPropertiesDto {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SheetDto {
    pub properties: SheetPropertiesDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SheetPropertiesDto {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
}

/// A values read or write payload.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueRangeDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl ValueRangeDto {
    pub fn rows(range: String, values: Vec<Vec<String>>) -> Self {
        Self {
            range: Some(range),
            major_dimension: Some("ROWS".to_owned()),
            values,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct BatchUpdateDto {
    pub requests: Vec<BatchRequestDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BatchRequestDto {
    pub delete_dimension: DeleteDimensionDto,
}

#[derive(Debug, Serialize)]
pub(super) struct DeleteDimensionDto {
    pub range: DimensionRangeDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DimensionRangeDto {
    pub sheet_id: i64,
    pub dimension: &'static str,
    pub start_index: usize,
    pub end_index: usize,
}

impl BatchUpdateDto {
    /// Delete one zero-based row from `sheet_id`.
    pub fn delete_row(sheet_id: i64, zero_based_row: usize) -> Self {
        Self {
            requests: vec![BatchRequestDto {
                delete_dimension: DeleteDimensionDto {
                    range: DimensionRangeDto {
                        sheet_id,
                        dimension: "ROWS",
                        start_index: zero_based_row,
                        end_index: zero_based_row + 1,
                    },
                },
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorEnvelope {
    pub error: ApiErrorDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDto {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delete_row_request_uses_half_open_range() {
        let body = serde_json::to_value(BatchUpdateDto::delete_row(7, 4)).expect("serialise");
        assert_eq!(
            body,
            json!({
                "requests": [{
                    "deleteDimension": {
                        "range": {
                            "sheetId": 7,
                            "dimension": "ROWS",
                            "startIndex": 4,
                            "endIndex": 5
                        }
                    }
                }]
            })
        );
    }

    #[test]
    fn value_range_tolerates_missing_values() {
        let decoded: ValueRangeDto =
            serde_json::from_str(r#"{"range":"Sheet1!A1:A1000","majorDimension":"ROWS"}"#)
                .expect("decode");
        assert!(decoded.values.is_empty());
    }

    #[test]
    fn spreadsheet_metadata_decodes_sheet_ids() {
        let decoded: SpreadsheetDto = serde_json::from_value(json!({
            "properties": { "title": "Admissions" },
            "sheets": [
                { "properties": { "sheetId": 0, "title": "Sheet1" } },
                { "properties": { "sheetId": 912, "title": "Archive" } }
            ]
        }))
        .expect("decode");
        assert_eq!(decoded.properties.title, "Admissions");
        assert_eq!(decoded.sheets.len(), 2);
        assert!(
            decoded
                .sheets
                .iter()
                .any(|sheet| sheet.properties.sheet_id == 912 && sheet.properties.title == "Archive")
        );
    }
}
