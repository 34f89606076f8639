use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{PdfFit, Series, SeriesKind, XAxis};

// ---------------------------------------------------------------------------
// Whitespace-delimited text columns (.xye, .xy, .gr, …)
// ---------------------------------------------------------------------------

/// Read whitespace-separated numeric columns, transposed to one `Vec` per column.
///
/// The first `header_rows` lines are skipped unconditionally; after that,
/// blank lines and lines starting with `#` are ignored. Every remaining row
/// must have the same number of fields.
pub fn load_columns(path: &Path, header_rows: usize) -> Result<Vec<Vec<f64>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_columns(&text, header_rows).with_context(|| format!("parsing {}", path.display()))
}

fn parse_columns(text: &str, header_rows: usize) -> Result<Vec<Vec<f64>>> {
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (line_no, line) in text.lines().enumerate().skip(header_rows) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row: Vec<f64> = line
            .split_whitespace()
            .enumerate()
            .map(|(j, tok)| {
                tok.parse::<f64>().with_context(|| {
                    format!("line {}, column {j}: '{tok}' is not a number", line_no + 1)
                })
            })
            .collect::<Result<_>>()?;

        if columns.is_empty() {
            columns = vec![Vec::new(); row.len()];
        } else if row.len() != columns.len() {
            bail!(
                "line {}: expected {} columns, found {}",
                line_no + 1,
                columns.len(),
                row.len()
            );
        }
        for (col, value) in columns.iter_mut().zip(row) {
            col.push(value);
        }
    }

    if columns.is_empty() {
        bail!("no data rows after {header_rows} header rows");
    }
    Ok(columns)
}

/// Load a diffraction pattern.
///
/// `.xye` needs three columns (x, intensity, uncertainty), `.xy` two. Other
/// extensions are accepted with either width.
pub fn load_xrd(path: &Path, header_rows: usize, axis: XAxis) -> Result<SeriesKind> {
    let mut columns = load_columns(path, header_rows)?;
    let expected = match extension(path).as_str() {
        "xye" => Some(3),
        "xy" => Some(2),
        _ => None,
    };
    let width = columns.len();
    match (expected, width) {
        (Some(n), w) if n != w => bail!("{}: expected {n} columns, found {w}", path.display()),
        (None, w) if w != 2 && w != 3 => {
            bail!("{}: expected 2 or 3 columns, found {w}", path.display())
        }
        _ => {}
    }

    let uncertainty = (width == 3).then(|| Series::from(columns.remove(2)));
    let intensity = Series::from(columns.remove(1));
    let x = Series::from(columns.remove(0));
    Ok(SeriesKind::Xrd {
        axis,
        x,
        intensity,
        uncertainty,
    })
}

/// Load a PDF: `r, G` or a refinement export `r, G, Gdiff, Gcalc`.
pub fn load_pdf(path: &Path, header_rows: usize) -> Result<SeriesKind> {
    let mut columns = load_columns(path, header_rows)?;
    let fit = match columns.len() {
        2 => None,
        4 => {
            let calc = Series::from(columns.remove(3));
            let diff = Series::from(columns.remove(2));
            Some(PdfFit { calc, diff })
        }
        w => bail!("{}: expected 2 or 4 columns, found {w}", path.display()),
    };
    let g = Series::from(columns.remove(1));
    let r = Series::from(columns.remove(0));
    Ok(SeriesKind::Pdf { r, g, fit })
}

// ---------------------------------------------------------------------------
// Named-column tables (CSV / TSV / JSON / Parquet)
// ---------------------------------------------------------------------------

/// Numeric columns addressed by header name, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl Table {
    fn push_column(&mut self, name: &str, values: Vec<f64>) {
        if !self.columns.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.columns.insert(name.to_string(), values);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// First column whose header matches one of `candidates` (case-insensitive).
    pub fn find(&self, candidates: &[&str]) -> Option<&[f64]> {
        candidates.iter().find_map(|cand| {
            self.names
                .iter()
                .find(|n| n.trim().eq_ignore_ascii_case(cand))
                .and_then(|n| self.get(n))
        })
    }

    fn require(&self, what: &str, candidates: &[&str]) -> Result<Series> {
        self.find(candidates)
            .map(|c| Series::from(c.to_vec()))
            .with_context(|| format!("no {what} column (looked for {candidates:?}, found {:?})", self.names))
    }
}

/// Load a table of numeric columns.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`                  – comma-separated, header row
/// * `.tsv` / `.txt` / `.mpt` – tab-separated, header row; an EC-Lab
///   preamble is skipped and Latin-1 text is accepted
/// * `.json`                 – `{ "time": [...], ... }` or `[{ "time": 0.0, ... }, ...]`
/// * `.parquet`              – numeric columns
pub fn load_table(path: &Path) -> Result<Table> {
    match extension(path).as_str() {
        "csv" => load_delimited(path, b','),
        "tsv" | "txt" | "mpt" => load_delimited(path, b'\t'),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

const TIME_COLUMNS: &[&str] = &["time", "time/s", "t/s"];
const POTENTIAL_COLUMNS: &[&str] = &["<Ewe>", "<Ewe>/V", "Ewe/V", "Ewe", "potential"];
const RE_Z_COLUMNS: &[&str] = &["Re(Z)/Ohm", "Re(Z)", "re_z"];
const NEG_IM_Z_COLUMNS: &[&str] = &["-Im(Z)/Ohm", "-Im(Z)", "neg_im_z"];

/// Load one half of a chronopotentiometry run from a tabular export.
pub fn load_cp(path: &Path) -> Result<SeriesKind> {
    let table = load_table(path)?;
    Ok(SeriesKind::Cp {
        time: table.require("time", TIME_COLUMNS)?,
        potential: table.require("potential", POTENTIAL_COLUMNS)?,
    })
}

/// Load an impedance trace from a tabular export.
pub fn load_eis(path: &Path) -> Result<SeriesKind> {
    let table = load_table(path)?;
    Ok(SeriesKind::Eis {
        time: table.require("time", TIME_COLUMNS)?,
        re_z: table.require("Re(Z)", RE_Z_COLUMNS)?,
        neg_im_z: table.require("-Im(Z)", NEG_IM_Z_COLUMNS)?,
    })
}

// -- CSV / TSV --

const EC_LAB_MAGIC: &str = "EC-Lab ASCII FILE";

/// EC-Lab text exports are Latin-1; map each byte to its code point.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Byte offset of the column header row.
///
/// EC-Lab `.mpt` files open with `EC-Lab ASCII FILE` and a
/// `Nb header lines : N` line; the column header is the `N`th line (the
/// first non-blank one from there on). Anything else starts with its header.
fn header_offset(bytes: &[u8]) -> Result<usize> {
    let mut lines = bytes.split_inclusive(|&b| b == b'\n');
    let Some(first) = lines.next() else {
        return Ok(0);
    };
    if latin1(first).trim() != EC_LAB_MAGIC {
        return Ok(0);
    }

    let mut offset = first.len();
    let mut line_no = 1;
    let mut declared = None;
    for line in lines {
        let text = latin1(line);
        let text = text.trim();
        if line_no + 1 >= declared.unwrap_or(usize::MAX) && !text.is_empty() {
            return Ok(offset);
        }
        if declared.is_none() {
            if let Some(rest) = text.strip_prefix("Nb header lines") {
                let n = rest
                    .trim_start_matches([' ', ':'])
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("bad EC-Lab header count: '{text}'"))?;
                declared = Some(n);
            }
        }
        offset += line.len();
        line_no += 1;
    }
    bail!("EC-Lab file ends before its column header")
}

fn load_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let bytes = std::fs::read(path).with_context(|| format!("opening {}", path.display()))?;
    let offset = header_offset(&bytes)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(&bytes[offset..]);
    let headers: Vec<String> = reader
        .byte_headers()
        .context("reading headers")?
        .iter()
        .map(|h| latin1(h).trim().to_string())
        .collect();

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        for (col_idx, field) in record.iter().enumerate() {
            let Some(name) = headers.get(col_idx) else {
                bail!("row {row_no}: more fields than headers");
            };
            // EC-Lab lines end with a stray tab, giving an unnamed column
            if name.is_empty() {
                continue;
            }
            let text = latin1(field);
            let v = text.parse::<f64>().with_context(|| {
                format!("row {row_no}, column '{name}': '{text}' is not a number")
            })?;
            values[col_idx].push(v);
        }
    }

    let mut table = Table::default();
    for (name, column) in headers.iter().zip(values) {
        if !name.is_empty() {
            table.push_column(name, column);
        }
    }
    Ok(table)
}

// -- JSON --

fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let mut table = Table::default();
    match &root {
        // column-oriented: df.to_json(orient='list')
        JsonValue::Object(obj) => {
            for (key, val) in obj {
                let arr = val
                    .as_array()
                    .with_context(|| format!("column '{key}' is not an array"))?;
                let column = arr
                    .iter()
                    .enumerate()
                    .map(|(j, v)| {
                        v.as_f64()
                            .with_context(|| format!("{key}[{j}]: not a number"))
                    })
                    .collect::<Result<Vec<f64>>>()?;
                table.push_column(key, column);
            }
        }
        // record-oriented: df.to_json(orient='records')
        JsonValue::Array(records) => {
            let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
            let mut names: Vec<String> = Vec::new();
            for (i, rec) in records.iter().enumerate() {
                let obj = rec
                    .as_object()
                    .with_context(|| format!("Row {i} is not a JSON object"))?;
                for (key, val) in obj {
                    let v = val
                        .as_f64()
                        .with_context(|| format!("Row {i}, '{key}': not a number"))?;
                    if !columns.contains_key(key) {
                        names.push(key.clone());
                    }
                    columns.entry(key.clone()).or_default().push(v);
                }
            }
            for name in names {
                let column = columns.remove(&name).unwrap_or_default();
                if column.len() != records.len() {
                    bail!("column '{name}' is missing from some records");
                }
                table.push_column(&name, column);
            }
        }
        _ => bail!("Expected a JSON object of columns or an array of records"),
    }
    Ok(table)
}

// -- Parquet --

fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut names: Vec<String> = Vec::new();
    let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        for (i, field) in schema.fields().iter().enumerate() {
            let Some(values) = extract_f64_column(batch.column(i)) else {
                log::debug!("skipping non-numeric parquet column '{}'", field.name());
                continue;
            };
            if !columns.contains_key(field.name()) {
                names.push(field.name().clone());
            }
            columns.entry(field.name().clone()).or_default().extend(values);
        }
    }

    let mut table = Table::default();
    for name in names {
        let column = columns.remove(&name).unwrap_or_default();
        table.push_column(&name, column);
    }
    Ok(table)
}

/// Numeric Arrow column as `f64`, nulls as NaN. `None` for other types.
fn extract_f64_column(col: &Arc<dyn Array>) -> Option<Vec<f64>> {
    let any = col.as_any();
    match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| a.iter().map(|v| v.unwrap_or(f64::NAN)).collect()),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect()),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| a.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| a.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Directory listing
// ---------------------------------------------------------------------------

/// Files directly inside `dir`, sorted by name, optionally limited to one extension.
pub fn import_dir(dir: &Path, extension_filter: Option<&str>) -> Result<Vec<PathBuf>> {
    let wanted = extension_filter.map(|e| e.trim_start_matches('.').to_ascii_lowercase());
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry.context("reading directory entry")?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = &wanted {
            if extension(&path) != *ext {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Tag for a file: its stem, e.g. `LiCoO2` for `data/LiCoO2.xye`.
pub fn tag_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_skip_header_and_comments() {
        let text = "Title line\nx y e\n# comment\n10.0 1.0 0.1\n\n20.0 2.0 0.2\n";
        let cols = parse_columns(text, 2).unwrap();
        assert_eq!(cols, vec![vec![10.0, 20.0], vec![1.0, 2.0], vec![0.1, 0.2]]);
    }

    #[test]
    fn ec_lab_header_count_locates_column_row() {
        let text = b"EC-Lab ASCII FILE\nNb header lines : 4\nmode\ntime/s\tEwe/V\n1\t2\n";
        let offset = header_offset(text).unwrap();
        assert!(text[offset..].starts_with(b"time/s"));

        assert_eq!(header_offset(b"time\tEwe\n1\t2\n").unwrap(), 0);

        let truncated = b"EC-Lab ASCII FILE\nNb header lines : 40\nmode\n";
        assert!(header_offset(truncated).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_columns("1 2 3\n4 5\n", 0).unwrap_err();
        assert!(err.to_string().contains("expected 3 columns"));
    }

    #[test]
    fn non_numeric_field_is_reported() {
        let err = parse_columns("1 2\n3 abc\n", 0).unwrap_err();
        assert!(format!("{err:#}").contains("'abc' is not a number"));
    }

    #[test]
    fn header_only_file_has_no_data() {
        assert!(parse_columns("r G\n", 1).is_err());
    }

    #[test]
    fn table_lookup_is_case_insensitive() {
        let mut table = Table::default();
        table.push_column("Time/s", vec![0.0, 1.0]);
        table.push_column("<Ewe>/V", vec![0.1, 0.2]);
        assert_eq!(table.find(TIME_COLUMNS), Some(&[0.0, 1.0][..]));
        assert_eq!(table.find(POTENTIAL_COLUMNS), Some(&[0.1, 0.2][..]));
        assert!(table.find(RE_Z_COLUMNS).is_none());
        assert_eq!(table.names(), ["Time/s", "<Ewe>/V"]);
    }
}
