//! Spreadsheet double holding one workbook in memory.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{SheetLocator, SheetTarget, SpreadsheetClient, SpreadsheetError};

struct Workbook {
    spreadsheet_id: String,
    sheet_names: Vec<String>,
    rows: Vec<Vec<String>>,
    outage: Option<SpreadsheetError>,
}

/// In-memory spreadsheet with a single editable worksheet.
pub struct InMemorySpreadsheet {
    workbook: Mutex<Workbook>,
}

impl InMemorySpreadsheet {
    /// A workbook `spreadsheet_id` whose worksheets are `sheet_names`.
    pub fn new(spreadsheet_id: &str, sheet_names: &[&str]) -> Self {
        Self {
            workbook: Mutex::new(Workbook {
                spreadsheet_id: spreadsheet_id.to_owned(),
                sheet_names: sheet_names.iter().map(|name| (*name).to_owned()).collect(),
                rows: Vec::new(),
                outage: None,
            }),
        }
    }

    /// Fail every call with `error` until cleared with `None`.
    pub fn set_outage(&self, error: Option<SpreadsheetError>) {
        self.lock().outage = error;
    }

    /// Current rows, header included.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.lock().rows.clone()
    }

    /// Values of column A below the header.
    pub fn ids(&self) -> Vec<String> {
        self.lock()
            .rows
            .iter()
            .skip(1)
            .filter_map(|row| row.first().cloned())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Workbook> {
        match self.workbook.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("workbook mutex"),
        }
    }

    fn available(&self) -> Result<MutexGuard<'_, Workbook>, SpreadsheetError> {
        let workbook = self.lock();
        match &workbook.outage {
            Some(error) => Err(error.clone()),
            None => Ok(workbook),
        }
    }
}

#[async_trait]
impl SpreadsheetClient for InMemorySpreadsheet {
    async fn open(&self, locator: &SheetLocator) -> Result<SheetTarget, SpreadsheetError> {
        let workbook = self.available()?;
        if locator.spreadsheet_id != workbook.spreadsheet_id {
            return Err(SpreadsheetError::not_found(format!(
                "spreadsheet {}",
                locator.spreadsheet_id
            )));
        }
        let Some(sheet_id) = workbook
            .sheet_names
            .iter()
            .position(|name| *name == locator.sheet_name)
        else {
            return Err(SpreadsheetError::not_found(format!(
                "worksheet {}",
                locator.sheet_name
            )));
        };
        Ok(SheetTarget {
            spreadsheet_id: workbook.spreadsheet_id.clone(),
            sheet_name: locator.sheet_name.clone(),
            sheet_id: i64::try_from(sheet_id).unwrap_or_default(),
            title: "Admissions archive".to_owned(),
            sheet_names: workbook.sheet_names.clone(),
        })
    }

    async fn read_ids(&self, _target: &SheetTarget) -> Result<Vec<String>, SpreadsheetError> {
        let workbook = self.available()?;
        Ok(workbook
            .rows
            .iter()
            .map(|row| row.first().cloned().unwrap_or_default())
            .collect())
    }

    async fn clear(&self, _target: &SheetTarget) -> Result<(), SpreadsheetError> {
        self.available()?.rows.clear();
        Ok(())
    }

    async fn write_rows(
        &self,
        _target: &SheetTarget,
        first_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SpreadsheetError> {
        let mut workbook = self.available()?;
        let start = first_row.saturating_sub(1);
        if workbook.rows.len() < start + rows.len() {
            workbook.rows.resize(start + rows.len(), Vec::new());
        }
        for (offset, row) in rows.iter().enumerate() {
            workbook.rows[start + offset] = row.clone();
        }
        Ok(())
    }

    async fn append_row(
        &self,
        _target: &SheetTarget,
        row: &[String],
    ) -> Result<(), SpreadsheetError> {
        self.available()?.rows.push(row.to_vec());
        Ok(())
    }

    async fn delete_row(&self, _target: &SheetTarget, row: usize) -> Result<(), SpreadsheetError> {
        let mut workbook = self.available()?;
        let index = row.saturating_sub(1);
        if index < workbook.rows.len() {
            workbook.rows.remove(index);
        }
        Ok(())
    }
}
