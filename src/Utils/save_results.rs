use crate::numerical::surface_sampler::{RealSlice, SampledSurface};
use csv::Writer;
use log::{info, warn};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One line per grid node: `X,Y,Re,Im,Abs,Phase`.
pub fn save_surface_to_csv(surface: &SampledSurface, filename: &Path) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(["X", "Y", "Re", "Im", "Abs", "Phase"])?;
    for (((x, y), value), (magnitude, phase)) in surface
        .xx
        .iter()
        .zip(surface.yy.iter())
        .zip(surface.values.iter())
        .zip(surface.magnitude.iter().zip(surface.phase.iter()))
    {
        writer.write_record(&[
            x.to_string(),
            y.to_string(),
            value.re.to_string(),
            value.im.to_string(),
            magnitude.to_string(),
            phase.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Real-axis trace: `t,Re,Im`.
pub fn save_real_slice_to_csv(slice: &RealSlice, filename: &Path) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(["t", "Re", "Im"])?;
    for (t, value) in slice.t.iter().zip(slice.values.iter()) {
        writer.write_record(&[t.to_string(), value.re.to_string(), value.im.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Tab separated variant of the surface table, for quick inspection.
pub fn save_surface_to_file(surface: &SampledSurface, filename: &Path) -> io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, "X\tY\tRe\tIm")?;
    for ((x, y), value) in surface
        .xx
        .iter()
        .zip(surface.yy.iter())
        .zip(surface.values.iter())
    {
        writeln!(file, "{}\t{}\t{}\t{}", x, y, value.re, value.im)?;
    }
    Ok(())
}

/// Files written for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowExport {
    pub surface: PathBuf,
    /// absent when the real-axis curve could not be evaluated
    pub real_slice: Option<PathBuf>,
    pub tsv: Option<PathBuf>,
}

impl RowExport {
    pub fn paths(&self) -> Vec<&Path> {
        let mut paths = vec![self.surface.as_path()];
        paths.extend(self.real_slice.as_deref());
        paths.extend(self.tsv.as_deref());
        paths
    }
}

/// Write the tables of row `index` into `dir`.
pub fn export_row(surface: &SampledSurface, index: usize, dir: &Path, tsv: bool) -> io::Result<RowExport> {
    std::fs::create_dir_all(dir)?;
    let surface_path = dir.join(format!("row{}_surface.csv", index));
    save_surface_to_csv(surface, &surface_path)?;
    let real_slice = match &surface.real_slice {
        Ok(slice) => {
            let slice_path = dir.join(format!("row{}_real_slice.csv", index));
            save_real_slice_to_csv(slice, &slice_path)?;
            Some(slice_path)
        }
        Err(e) => {
            warn!("row {} '{}': no real-axis table, {}", index, surface.expression, e);
            None
        }
    };
    let tsv = if tsv {
        let tsv_path = dir.join(format!("row{}_surface.tsv", index));
        save_surface_to_file(surface, &tsv_path)?;
        Some(tsv_path)
    } else {
        None
    };
    let export = RowExport {
        surface: surface_path,
        real_slice,
        tsv,
    };
    info!(
        "row {} '{}' saved to {:?}",
        index,
        surface.expression,
        export.paths()
    );
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::plot_request::{PlotRequest, compute};

    fn small_surface() -> SampledSurface {
        let output = compute(&PlotRequest::new(vec!["z**2"]).with_resolution(3)).unwrap();
        output.rows[0].surface().unwrap().clone()
    }

    #[test]
    fn test_surface_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.csv");
        save_surface_to_csv(&small_surface(), &path).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["X", "Y", "Re", "Im", "Abs", "Phase"]);
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 9);
        // first node is (X, Y) = (-2, -2): z^2 = 8i
        assert_eq!(&records[0][0], "-2");
        assert_eq!(&records[0][1], "-2");
        assert_eq!(records[0][3].parse::<f64>().unwrap(), 8.0);
    }

    #[test]
    fn test_real_slice_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice.csv");
        let surface = small_surface();
        save_real_slice_to_csv(surface.real_slice.as_ref().unwrap(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,Re,Im");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("-2,4,"));
    }

    #[test]
    fn test_export_row_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("csv");
        let export = export_row(&small_surface(), 0, &target, false).unwrap();
        assert!(export.surface.exists());
        assert!(export.real_slice.as_ref().unwrap().exists());
        assert_eq!(export.tsv, None);
        assert_eq!(export.paths().len(), 2);
    }

    #[test]
    fn test_export_row_with_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let export = export_row(&small_surface(), 3, dir.path(), true).unwrap();
        let tsv = export.tsv.unwrap();
        assert!(tsv.ends_with("row3_surface.tsv"));
        let text = std::fs::read_to_string(tsv).unwrap();
        assert!(text.starts_with("X\tY\tRe\tIm"));
        assert_eq!(text.lines().count(), 10);
    }

    #[test]
    fn test_export_row_without_real_axis_curve() {
        // gamma has a pole at the left end of the default real axis
        let output = compute(&PlotRequest::new(vec!["gamma(z)"]).with_resolution(4)).unwrap();
        let surface = output.rows[0].surface().unwrap();
        assert!(surface.real_slice.is_err());
        let dir = tempfile::tempdir().unwrap();
        let export = export_row(surface, 0, dir.path(), false).unwrap();
        assert!(export.surface.exists());
        assert_eq!(export.real_slice, None);
        assert!(!dir.path().join("row0_real_slice.csv").exists());
    }
}
