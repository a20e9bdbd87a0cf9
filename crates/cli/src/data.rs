//! Tabular IO for labelled points and classifier samples (CSV or Parquet by extension).

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use vspace::prelude::{DMatrix, DVector, Label};

/// Feature rows and labels read from one table.
pub struct Labelled {
    pub features: Vec<String>,
    pub points: Vec<DVector<f64>>,
    pub labels: Vec<Label>,
}

fn is_parquet(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "parquet")
}

pub fn read_frame(path: &Path) -> Result<DataFrame> {
    let lf = if is_parquet(path) {
        LazyFrame::scan_parquet(path, ScanArgsParquet::default())?
    } else {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .finish()?
    };
    lf.collect()
        .with_context(|| format!("reading {}", path.display()))
}

/// Split `df` into the label column and every other column as a feature.
///
/// Labels are `1`/`-1`; a `0` is read as `-1` so 0/1 tables work as-is.
pub fn labelled_points(df: &DataFrame, label_column: &str) -> Result<Labelled> {
    let mut features = Vec::new();
    let mut columns = Vec::new();
    let mut raw_labels = None;
    for series in df.iter() {
        let name = series.name().to_string();
        let values = float_values(series).with_context(|| format!("column `{name}`"))?;
        if name == label_column {
            raw_labels = Some(values);
        } else {
            features.push(name);
            columns.push(values);
        }
    }
    let Some(raw_labels) = raw_labels else {
        bail!("label column `{label_column}` not found");
    };
    if columns.is_empty() {
        bail!("no feature columns besides `{label_column}`");
    }
    let labels = raw_labels
        .into_iter()
        .map(|v| Label::try_from(if v == 0.0 { -1.0 } else { v }))
        .collect::<Result<Vec<_>, _>>()?;
    let points = (0..df.height())
        .map(|row| DVector::from_fn(columns.len(), |i, _| columns[i][row]))
        .collect();
    Ok(Labelled {
        features,
        points,
        labels,
    })
}

fn float_values(series: &Series) -> Result<Vec<f64>> {
    let cast = series.cast(&DataType::Float64)?;
    cast.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.with_context(|| format!("null at row {row}")))
        .collect()
}

/// One column per weight: `w0` is the bias, `w1..wd` the features.
pub fn samples_frame(samples: &DMatrix<f64>) -> Result<DataFrame> {
    let columns = (0..samples.ncols())
        .map(|j| {
            let values: Vec<f64> = samples.column(j).iter().copied().collect();
            Series::new(format!("w{j}").into(), values)
        })
        .collect::<Vec<_>>();
    Ok(DataFrame::new(columns)?)
}

pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    if is_parquet(path) {
        ParquetWriter::new(file).finish(df)?;
    } else {
        CsvWriter::new(file).include_header(true).finish(df)?;
    }
    Ok(())
}
