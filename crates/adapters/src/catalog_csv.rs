//! CSV catalog: a listings table and a tags table joined by identifier

use async_trait::async_trait;
use listing_seo_domain::{
    CatalogError, CatalogSink, CatalogSource, ListingRecord, RewriteResult, WriteMode,
    WriteSummary,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Column names used in both tables
#[derive(Debug, Clone)]
pub struct CsvColumns {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Tag columns are `<prefix>1`, `<prefix>2`, ...
    pub tag_prefix: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            id: "listing_id".to_string(),
            title: "title".to_string(),
            description: "description".to_string(),
            tag_prefix: "tag_".to_string(),
        }
    }
}

/// Where the catalog tables live and how they are formatted
#[derive(Debug, Clone)]
pub struct CsvCatalogConfig {
    pub listings_path: PathBuf,
    /// Tags table; listings get no tags when absent
    pub tags_path: Option<PathBuf>,
    pub listings_output: PathBuf,
    pub tags_output: Option<PathBuf>,
    pub delimiter: u8,
    pub columns: CsvColumns,
    /// Minimum number of tag columns written
    pub tag_columns: usize,
}

impl CsvCatalogConfig {
    pub fn new(listings_path: impl Into<PathBuf>, listings_output: impl Into<PathBuf>) -> Self {
        Self {
            listings_path: listings_path.into(),
            tags_path: None,
            listings_output: listings_output.into(),
            tags_output: None,
            delimiter: b';',
            columns: CsvColumns::default(),
            tag_columns: 13,
        }
    }
}

/// Catalog source and sink over semicolon-separated exports
pub struct CsvCatalog {
    config: CsvCatalogConfig,
}

impl CsvCatalog {
    pub fn new(config: CsvCatalogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CsvCatalogConfig {
        &self.config
    }

    async fn read_table(&self, path: &Path) -> Result<Table, CatalogError> {
        let data = tokio::fs::read(path).await?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .flexible(true)
            .from_reader(data.as_slice());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| parse_error(path, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| parse_error(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Table {
            file: path.display().to_string(),
            headers,
            rows,
        })
    }

    async fn load_tags(&self) -> Result<HashMap<String, Vec<String>>, CatalogError> {
        let Some(path) = &self.config.tags_path else {
            return Ok(HashMap::new());
        };

        let table = self.read_table(path).await?;
        let id_idx = table.column(&self.config.columns.id)?;
        let tag_idx = table.tag_columns(&self.config.columns.tag_prefix);

        let mut tags = HashMap::new();
        for row in &table.rows {
            let id = Table::cell(row, id_idx).trim().to_string();
            let values: Vec<String> = tag_idx
                .iter()
                .map(|idx| Table::cell(row, *idx).trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect();
            if tags.insert(id.clone(), values).is_some() {
                tracing::warn!(listing_id = %id, file = %table.file, "Duplicate tags row, keeping last");
            }
        }

        Ok(tags)
    }

    /// Listings table with the title and description cells of rewritten
    /// records replaced. Every other column and row is kept as read.
    async fn listings_csv(&self, results: &[RewriteResult]) -> Result<Vec<u8>, CatalogError> {
        let mut table = self.read_table(&self.config.listings_path).await?;
        let columns = &self.config.columns;
        let id_idx = table.column(&columns.id)?;
        let title_idx = table.column(&columns.title)?;
        let description_idx = table.column(&columns.description)?;
        let width = table.headers.len();

        let mut pending = records_by_id(results);
        for row in &mut table.rows {
            let id = Table::cell(row, id_idx).trim().to_string();
            // Only the first row of a duplicated id was rewritten
            let Some(record) = pending.remove(id.as_str()) else {
                continue;
            };
            pad_row(row, width);
            row[title_idx] = record.title.clone();
            row[description_idx] = record.description.clone();
        }

        for id in pending.keys() {
            tracing::warn!(listing_id = %id, file = %table.file, "Rewritten record has no row in listings table");
        }

        self.encode(&table)
    }

    /// Tags table with the tag cells of rewritten records replaced. Extra
    /// tag columns are appended when a record needs more slots; listings
    /// without a tags row get a new row at the end.
    async fn tags_csv(&self, results: &[RewriteResult]) -> Result<Vec<u8>, CatalogError> {
        let columns = &self.config.columns;
        let mut table = match &self.config.tags_path {
            Some(path) => self.read_table(path).await?,
            None => Table {
                file: "tags".to_string(),
                headers: vec![columns.id.clone()],
                rows: vec![],
            },
        };
        let id_idx = table.column(&columns.id)?;

        let slots = results
            .iter()
            .map(|r| r.record.tags.len())
            .max()
            .unwrap_or(0)
            .max(self.config.tag_columns);
        let mut tag_idx = table.tag_columns(&columns.tag_prefix);
        let mut next = table.next_tag_number(&columns.tag_prefix);
        while tag_idx.len() < slots {
            table.headers.push(format!("{}{}", columns.tag_prefix, next));
            tag_idx.push(table.headers.len() - 1);
            next += 1;
        }
        let width = table.headers.len();

        let mut pending = records_by_id(results);
        for row in &mut table.rows {
            pad_row(row, width);
            let id = Table::cell(row, id_idx).trim().to_string();
            if let Some(record) = pending.remove(id.as_str()) {
                fill_tags(row, &tag_idx, &record.tags);
            }
        }

        for result in results {
            let record = &result.record;
            if pending.remove(record.id.as_str()).is_none() {
                continue;
            }
            let mut row = vec![String::new(); width];
            row[id_idx] = record.id.clone();
            fill_tags(&mut row, &tag_idx, &record.tags);
            table.rows.push(row);
        }

        self.encode(&table)
    }

    fn encode(&self, table: &Table) -> Result<Vec<u8>, CatalogError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .quote_style(csv::QuoteStyle::Always)
            .flexible(true)
            .from_writer(Vec::new());
        writer
            .write_record(&table.headers)
            .map_err(serialization_error)?;
        for row in &table.rows {
            writer.write_record(row).map_err(serialization_error)?;
        }
        writer
            .into_inner()
            .map_err(|e| CatalogError::Serialization(e.to_string()))
    }

    fn destination(&self) -> String {
        match &self.config.tags_output {
            Some(tags) => format!(
                "{} + {}",
                self.config.listings_output.display(),
                tags.display()
            ),
            None => self.config.listings_output.display().to_string(),
        }
    }
}

struct Table {
    file: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn column(&self, name: &str) -> Result<usize, CatalogError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CatalogError::MissingColumn {
                column: name.to_string(),
                file: self.file.clone(),
            })
    }

    /// Indices of `<prefix>N` columns ordered by N
    fn tag_columns(&self, prefix: &str) -> Vec<usize> {
        let mut numbered: Vec<(usize, usize)> = self
            .headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| {
                let n = h.strip_prefix(prefix)?.parse::<usize>().ok()?;
                Some((n, idx))
            })
            .collect();
        numbered.sort();
        numbered.into_iter().map(|(_, idx)| idx).collect()
    }

    /// First free `<prefix>N` number
    fn next_tag_number(&self, prefix: &str) -> usize {
        self.headers
            .iter()
            .filter_map(|h| h.strip_prefix(prefix)?.parse::<usize>().ok())
            .max()
            .unwrap_or(0)
            + 1
    }

    fn cell(row: &[String], idx: usize) -> &str {
        row.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// First record per id
fn records_by_id(results: &[RewriteResult]) -> HashMap<&str, &ListingRecord> {
    let mut records = HashMap::new();
    for result in results {
        records
            .entry(result.record.id.as_str())
            .or_insert(&result.record);
    }
    records
}

fn pad_row(row: &mut Vec<String>, width: usize) {
    if row.len() < width {
        row.resize(width, String::new());
    }
}

fn fill_tags(row: &mut [String], tag_idx: &[usize], tags: &[String]) {
    for (slot, idx) in tag_idx.iter().enumerate() {
        row[*idx] = tags.get(slot).cloned().unwrap_or_default();
    }
}

fn parse_error(path: &Path, error: csv::Error) -> CatalogError {
    CatalogError::Parse {
        file: path.display().to_string(),
        message: error.to_string(),
    }
}

fn serialization_error(error: csv::Error) -> CatalogError {
    CatalogError::Serialization(error.to_string())
}

async fn write_file(path: &Path, bytes: Vec<u8>) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[async_trait]
impl CatalogSource for CsvCatalog {
    async fn load(&self) -> Result<Vec<ListingRecord>, CatalogError> {
        let table = self.read_table(&self.config.listings_path).await?;
        let columns = &self.config.columns;
        let id_idx = table.column(&columns.id)?;
        let title_idx = table.column(&columns.title)?;
        let description_idx = table.column(&columns.description)?;

        let mut tags = self.load_tags().await?;

        let records: Vec<ListingRecord> = table
            .rows
            .iter()
            .map(|row| {
                let id = Table::cell(row, id_idx).trim().to_string();
                ListingRecord {
                    tags: tags.remove(&id).unwrap_or_default(),
                    title: Table::cell(row, title_idx).to_string(),
                    description: Table::cell(row, description_idx).to_string(),
                    id,
                }
            })
            .collect();

        for id in tags.keys() {
            tracing::warn!(listing_id = %id, "Tags row has no matching listing, ignoring");
        }

        tracing::debug!(
            file = %table.file,
            records = records.len(),
            "Loaded listings table"
        );

        Ok(records)
    }

    fn describe(&self) -> String {
        match &self.config.tags_path {
            Some(tags) => format!(
                "{} + {}",
                self.config.listings_path.display(),
                tags.display()
            ),
            None => self.config.listings_path.display().to_string(),
        }
    }
}

#[async_trait]
impl CatalogSink for CsvCatalog {
    async fn write(
        &self,
        results: &[RewriteResult],
        mode: WriteMode,
    ) -> Result<WriteSummary, CatalogError> {
        let destination = self.destination();

        if !mode.is_apply() {
            tracing::info!(
                destination = %destination,
                records = results.len(),
                "Preview mode, catalog files left untouched"
            );
            return Ok(WriteSummary {
                mode,
                written: 0,
                destination,
            });
        }

        let listings = self.listings_csv(results).await?;
        write_file(&self.config.listings_output, listings).await?;

        if let Some(tags_output) = &self.config.tags_output {
            let tags = self.tags_csv(results).await?;
            write_file(tags_output, tags).await?;
        }

        Ok(WriteSummary {
            mode,
            written: results.len(),
            destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LISTINGS: &str = "listing_id;sku;title;description\n\
        \"101\";\"KOK-1\";\"Kokardki Różowe - Handmade Earrings, Polymer Clay\";\"Pink bows; light as air.\"\n\
        \"102\";\"DAI-2\";\"Daisy Studs\";\"\"\n";

    const TAGS: &str = "listing_id;title;tag_1;tag_2;tag_10;tag_3\n\
        101;x;cute;gift;last;earrings\n\
        999;x;orphan;;;\n";

    fn setup(dir: &TempDir) -> CsvCatalogConfig {
        let listings = dir.path().join("listings.csv");
        let tags = dir.path().join("tags.csv");
        std::fs::write(&listings, LISTINGS).unwrap();
        std::fs::write(&tags, TAGS).unwrap();

        let mut config = CsvCatalogConfig::new(listings, dir.path().join("out/listings.csv"));
        config.tags_path = Some(tags);
        config.tags_output = Some(dir.path().join("out/tags.csv"));
        config
    }

    fn result(record: ListingRecord) -> RewriteResult {
        RewriteResult {
            record,
            changes: vec![],
        }
    }

    #[tokio::test]
    async fn test_load_joins_tags_by_id() {
        let dir = TempDir::new().unwrap();
        let catalog = CsvCatalog::new(setup(&dir));

        let records = catalog.load().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "101");
        assert_eq!(
            records[0].title,
            "Kokardki Różowe - Handmade Earrings, Polymer Clay"
        );
        assert_eq!(records[0].description, "Pink bows; light as air.");
        assert_eq!(records[0].tags, vec!["cute", "gift", "earrings", "last"]);
        assert!(records[1].tags.is_empty());
    }

    #[tokio::test]
    async fn test_load_without_tags_table() {
        let dir = TempDir::new().unwrap();
        let mut config = setup(&dir);
        config.tags_path = None;

        let records = CsvCatalog::new(config).load().await.unwrap();

        assert!(records.iter().all(|r| r.tags.is_empty()));
    }

    #[tokio::test]
    async fn test_missing_column_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut config = setup(&dir);
        config.columns.title = "nowy_tytul_seo".to_string();

        let result = CsvCatalog::new(config).load().await;

        assert!(matches!(
            result,
            Err(CatalogError::MissingColumn { ref column, .. }) if column == "nowy_tytul_seo"
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let config = CsvCatalogConfig::new(dir.path().join("nope.csv"), dir.path().join("o.csv"));

        let result = CsvCatalog::new(config).load().await;

        assert!(matches!(result, Err(CatalogError::Io(_))));
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir);
        let output = config.listings_output.clone();
        let catalog = CsvCatalog::new(config);

        let records = catalog.load().await.unwrap();
        let results: Vec<_> = records.into_iter().map(result).collect();
        let summary = catalog.write(&results, WriteMode::Preview).await.unwrap();

        assert_eq!(summary.written, 0);
        assert_eq!(summary.mode, WriteMode::Preview);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_apply_writes_both_tables_and_reloads() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir);
        let catalog = CsvCatalog::new(config.clone());

        let records = catalog.load().await.unwrap();
        let results: Vec<_> = records.clone().into_iter().map(result).collect();
        let summary = catalog.write(&results, WriteMode::Apply).await.unwrap();
        assert_eq!(summary.written, 2);

        let tags_text = std::fs::read_to_string(config.tags_output.as_ref().unwrap()).unwrap();
        let header = tags_text.lines().next().unwrap();
        assert!(header.starts_with("\"listing_id\";\"title\";\"tag_1\";\"tag_2\";\"tag_10\""));
        assert!(header.ends_with("\"tag_19\""));

        let mut reload = config.clone();
        reload.listings_path = config.listings_output.clone();
        reload.tags_path = config.tags_output.clone();
        let reloaded = CsvCatalog::new(reload).load().await.unwrap();

        assert_eq!(reloaded, records);
    }

    #[tokio::test]
    async fn test_apply_keeps_untouched_columns_and_rows() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir);
        let catalog = CsvCatalog::new(config.clone());

        let mut records = catalog.load().await.unwrap();
        records[0].title = "Polymer Clay Earrings Kokardki".to_string();
        records[1].tags = vec!["Clay Earrings".to_string()];
        // Only the first listing was rewritten; the second one was skipped
        let results = vec![result(records[0].clone())];
        catalog.write(&results, WriteMode::Apply).await.unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_path(&config.listings_output)
            .unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["listing_id", "sku", "title", "description"]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "KOK-1");
        assert_eq!(&rows[0][2], "Polymer Clay Earrings Kokardki");
        assert_eq!(&rows[0][3], "Pink bows; light as air.");
        assert_eq!(&rows[1][1], "DAI-2");
        assert_eq!(&rows[1][2], "Daisy Studs");

        let tags_text = std::fs::read_to_string(config.tags_output.as_ref().unwrap()).unwrap();
        assert!(tags_text.contains("\"999\";\"x\";\"orphan\""));
        assert!(!tags_text.contains("Clay Earrings"));
    }

    #[tokio::test]
    async fn test_apply_adds_tags_row_for_listing_without_one() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir);
        let catalog = CsvCatalog::new(config.clone());

        let mut records = catalog.load().await.unwrap();
        records[1].tags = vec!["Clay Earrings".to_string(), "daisy".to_string()];
        let results: Vec<_> = records.clone().into_iter().map(result).collect();
        catalog.write(&results, WriteMode::Apply).await.unwrap();

        let mut reload = config.clone();
        reload.listings_path = config.listings_output.clone();
        reload.tags_path = config.tags_output.clone();
        let reloaded = CsvCatalog::new(reload).load().await.unwrap();

        assert_eq!(reloaded[1].tags, vec!["Clay Earrings", "daisy"]);
        assert_eq!(reloaded[0].tags, records[0].tags);
    }
}
