use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::builder::PossibleValue;
use clap::ValueEnum;

use crate::dimension::DimensionPair;
use crate::encoder::PixelEncoding;
use crate::error::Error;

const DEFAULT_BASE_NAME: &str = "image";
const CSV_EXTENSION: &str = "csv";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileNameStyle {
    /// `<base>_<mode>_<W>x<H>.csv`
    WithMode,
    /// `<base>_<W>x<H>.csv`
    GrayscaleOnly,
}

impl ValueEnum for FileNameStyle {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::WithMode, Self::GrayscaleOnly]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::WithMode => Some(PossibleValue::new("WithMode")),
            Self::GrayscaleOnly => Some(PossibleValue::new("GrayscaleOnly")),
        }
    }
}

/// Strips the last extension of the file name, `image` if nothing is left.
pub fn base_name(input_file: &Path) -> String {
    let file_name = input_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match file_name.rfind('.') {
        Some(index) if index + 1 < file_name.len() => &file_name[..index],
        _ => file_name.as_str(),
    };
    if stem.is_empty() {
        DEFAULT_BASE_NAME.to_owned()
    } else {
        stem.to_owned()
    }
}

pub fn output_file_name(
    input_file: &Path,
    encoding: PixelEncoding,
    dimensions: DimensionPair,
    style: FileNameStyle,
) -> String {
    let base = base_name(input_file);
    match style {
        FileNameStyle::WithMode => format!(
            "{}_{}_{}.{}",
            base,
            encoding.name(),
            dimensions,
            CSV_EXTENSION
        ),
        FileNameStyle::GrayscaleOnly => format!("{}_{}.{}", base, dimensions, CSV_EXTENSION),
    }
}

pub trait CsvSink {
    /// Persists the CSV and returns where it went.
    fn deliver(&mut self, csv: &str, file_name: &str) -> crate::Result<PathBuf>;
}

pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    fn ensure_directory_exists(&self) -> crate::Result<()> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            Error::UnableToCreateOutputDirectory(self.directory.display().to_string(), e)
        })
    }
}

fn open_output_file(file_path: &Path) -> crate::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| Error::UnableToOpenOutputFileForWriting(file_path.display().to_string(), e))
}

impl CsvSink for DirectorySink {
    fn deliver(&mut self, csv: &str, file_name: &str) -> crate::Result<PathBuf> {
        self.ensure_directory_exists()?;
        let file_path = self.directory.join(file_name);
        let output_file = open_output_file(&file_path)?;
        let mut writer = BufWriter::new(output_file);
        writer
            .write_all(csv.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| Error::FailedToWriteCsv(file_path.display().to_string(), e))?;
        log::info!("Wrote {} bytes to '{}'", csv.len(), file_path.display());
        Ok(file_path)
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::{base_name, output_file_name, CsvSink, DirectorySink, FileNameStyle};
    use crate::dimension::DimensionPair;
    use crate::encoder::PixelEncoding;

    #[test]
    fn base_name_strips_last_extension() {
        assert_eq!(base_name(Path::new("/photos/cat.png")), "cat");
        assert_eq!(base_name(Path::new("archive.tar.gz")), "archive.tar");
        assert_eq!(base_name(Path::new("README")), "README");
        assert_eq!(base_name(Path::new("trailing.")), "trailing.");
    }

    #[test]
    fn base_name_falls_back_to_image() {
        assert_eq!(base_name(Path::new(".png")), "image");
        assert_eq!(base_name(Path::new("")), "image");
    }

    #[test]
    fn file_name_with_mode() {
        let name = output_file_name(
            Path::new("dir/cat.jpeg"),
            PixelEncoding::Rgb,
            DimensionPair::new(64, 48),
            FileNameStyle::WithMode,
        );
        assert_eq!(name, "cat_rgb_64x48.csv");
    }

    #[test]
    fn file_name_grayscale_only() {
        let name = output_file_name(
            Path::new("cat.jpeg"),
            PixelEncoding::Grayscale,
            DimensionPair::new(3, 1),
            FileNameStyle::GrayscaleOnly,
        );
        assert_eq!(name, "cat_3x1.csv");
    }

    #[test]
    fn deliver_creates_directory_and_file() {
        let dir = TempDir::new().expect("tempdir should be created");
        let mut sink = DirectorySink::new(dir.path().join("nested").join("out"));
        let path = sink.deliver("1,2\n3,4", "grid.csv").expect("csv should be written");
        assert_eq!(path.file_name().unwrap(), "grid.csv");
        assert_eq!(fs::read_to_string(path).unwrap(), "1,2\n3,4");
    }

    #[test]
    fn deliver_overwrites_previous_file() {
        let dir = TempDir::new().expect("tempdir should be created");
        let mut sink = DirectorySink::new(dir.path().to_path_buf());
        sink.deliver("a much longer first version", "grid.csv")
            .expect("first csv should be written");
        let path = sink.deliver("short", "grid.csv").expect("csv should be written");
        assert_eq!(fs::read_to_string(path).unwrap(), "short");
    }
}
