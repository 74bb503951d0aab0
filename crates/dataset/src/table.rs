use crate::error::DatasetError;

/// Format-agnostic named-column table. All cells are strings; the empty
/// string means unset. CSV is the only on-disk representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column index, or `MissingKeyColumn` naming the table for context.
    pub fn require_column(&self, name: &str, table: &str) -> Result<usize, DatasetError> {
        self.column_index(name)
            .ok_or_else(|| DatasetError::MissingKeyColumn {
                table: table.into(),
                column: name.into(),
            })
    }

    /// Append a column, back-filling existing rows with `""`.
    /// Returns the new column's index; a no-op if it already exists.
    pub fn add_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.columns.len() - 1
    }

    /// Append a row, padding or truncating to the current column count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn get(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: String) {
        self.rows[row][col] = value;
    }

    /// Trimmed values of the key column, in row order.
    pub fn key_values(&self, key: &str, table: &str) -> Result<Vec<String>, DatasetError> {
        let idx = self.require_column(key, table)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row[idx].trim().to_string())
            .collect())
    }

    pub fn from_csv(data: &str) -> Result<Table, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());
        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| DatasetError::Csv(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut table = Table::new(columns);
        for record in reader.records() {
            let record = record.map_err(|e| DatasetError::Csv(e.to_string()))?;
            table.push_row(record.iter().map(|v| v.to_string()).collect());
        }
        Ok(table)
    }

    pub fn to_csv(&self) -> Result<String, DatasetError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.columns)
            .map_err(|e| DatasetError::Csv(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| DatasetError::Csv(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| DatasetError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| DatasetError::Csv(e.to_string()))
    }
}
