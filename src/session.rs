use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use threadpool::ThreadPool;

use crate::dimension::linker::DimensionLinker;
use crate::dimension::EditedField;
use crate::encoder::{CsvEncoder, PixelEncoding};
use crate::error::Error;
use crate::raster::loader::{ImageLoader, LoadedImage};
use crate::raster::resampler::Resampler;
use crate::sink::{output_file_name, CsvSink, FileNameStyle};
use crate::status::{self, StatusReporter};

/// One user action, as typed into an interactive session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionCommand {
    Open(PathBuf),
    Width(String),
    Height(String),
    ToggleLink,
    Mode(PixelEncoding),
    Convert,
    Status,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (keyword, argument) = match line.split_once(char::is_whitespace) {
            Some((keyword, argument)) => (keyword, argument.trim()),
            None => (line, ""),
        };
        match keyword.to_ascii_lowercase().as_str() {
            "open" if !argument.is_empty() => Ok(Self::Open(PathBuf::from(argument))),
            "open" => Err("Usage: open <path>".to_owned()),
            "width" | "w" => Ok(Self::Width(argument.to_owned())),
            "height" | "h" => Ok(Self::Height(argument.to_owned())),
            "link" => Ok(Self::ToggleLink),
            "mode" => argument.parse().map(Self::Mode),
            "convert" => Ok(Self::Convert),
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(format!("Unknown command '{}'", keyword)),
        }
    }
}

struct SelectedImage {
    path: PathBuf,
    image: LoadedImage,
}

/// The conversion tool's state between user actions.
pub struct Session<'a> {
    loader: &'a dyn ImageLoader,
    resampler: &'a dyn Resampler,
    sink: &'a mut dyn CsvSink,
    reporter: &'a mut dyn StatusReporter,
    threadpool: &'a ThreadPool,
    linker: DimensionLinker,
    encoding: PixelEncoding,
    naming: FileNameStyle,
    selected: Option<SelectedImage>,
}

impl<'a> Session<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        loader: &'a dyn ImageLoader,
        resampler: &'a dyn Resampler,
        sink: &'a mut dyn CsvSink,
        reporter: &'a mut dyn StatusReporter,
        threadpool: &'a ThreadPool,
        linker: DimensionLinker,
        encoding: PixelEncoding,
        naming: FileNameStyle,
    ) -> Self {
        Self {
            loader,
            resampler,
            sink,
            reporter,
            threadpool,
            linker,
            encoding,
            naming,
            selected: None,
        }
    }

    pub fn linker(&self) -> &DimensionLinker {
        &self.linker
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    /// Decodes the image and hands its natural size to the linker. A failed
    /// decode leaves no image selected.
    pub fn select_image(&mut self, path: &Path) -> crate::Result<()> {
        self.selected = None;
        self.reporter.report(status::READING_IMAGE);
        match self.loader.load(path) {
            Ok(image) => {
                self.linker
                    .on_image_selected(image.natural_width(), image.natural_height());
                self.selected = Some(SelectedImage {
                    path: path.to_path_buf(),
                    image,
                });
                self.reporter.report(status::READY);
                Ok(())
            }
            Err(error) => {
                log::error!("{}", error);
                self.linker.on_image_failed();
                self.reporter.report(status::UNREADABLE_IMAGE);
                Err(error)
            }
        }
    }

    pub fn edit(&mut self, field: EditedField, value: i64) {
        match field {
            EditedField::Width => self.linker.on_width_edited(value),
            EditedField::Height => self.linker.on_height_edited(value),
        }
    }

    /// Takes the raw field text; an emptied field converts at the default
    /// size.
    pub fn edit_text(&mut self, field: EditedField, text: &str) {
        self.linker.on_text_edited(field, text);
    }

    pub fn toggle_link(&mut self) {
        self.linker.on_link_toggled();
    }

    pub fn set_encoding(&mut self, encoding: PixelEncoding) {
        self.encoding = encoding;
    }

    /// Resolves the final dimensions, renders the selected image at that
    /// size and delivers the CSV.
    pub fn convert(&mut self) -> crate::Result<PathBuf> {
        let Some(selected) = self.selected.as_ref() else {
            self.reporter.report(status::NO_IMAGE_SELECTED);
            return Err(Error::NoImageSelected);
        };
        let (requested_width, requested_height) = self.linker.requested_for_conversion();
        let dimensions = self
            .linker
            .resolve_for_conversion(requested_width, requested_height);
        self.reporter.report(&status::converting(dimensions));

        let raster = self.resampler.resample(&selected.image, dimensions);
        let encoder = CsvEncoder::new(Arc::new(raster), self.encoding);
        let csv = encoder.encode_with(self.threadpool);
        let file_name = output_file_name(&selected.path, self.encoding, dimensions, self.naming);
        let file_path = self.sink.deliver(&csv, &file_name)?;
        log::info!(
            "Converted {} pixels of '{}'",
            dimensions.pixel_count(),
            selected.path.display()
        );
        self.reporter.report(&status::done(&file_name));
        Ok(file_path)
    }

    /// Applies one command; returns `false` once the session should end.
    /// Failures have already been reported and do not end the session.
    pub fn apply(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Open(path) => {
                let _ = self.select_image(&path);
            }
            SessionCommand::Width(text) => self.edit_text(EditedField::Width, &text),
            SessionCommand::Height(text) => self.edit_text(EditedField::Height, &text),
            SessionCommand::ToggleLink => self.toggle_link(),
            SessionCommand::Mode(encoding) => self.set_encoding(encoding),
            SessionCommand::Convert => {
                if let Err(error) = self.convert() {
                    log::error!("Conversion failed: {}", error);
                }
            }
            SessionCommand::Status => self.report_state(),
            SessionCommand::Quit => return false,
        }
        true
    }

    /// Reads commands line by line until `quit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> crate::Result<()> {
        for line in input.lines() {
            let line = line.map_err(Error::FailedToReadCommand)?;
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<SessionCommand>() {
                Ok(command) => {
                    if !self.apply(command) {
                        break;
                    }
                }
                Err(message) => self.reporter.report(&message),
            }
        }
        Ok(())
    }

    fn report_state(&mut self) {
        let dimensions = self.linker.dimensions();
        let link_state = if self.linker.is_linked() {
            "linked"
        } else {
            "unlinked"
        };
        let image = match &self.selected {
            Some(selected) => selected.path.display().to_string(),
            None => "no image".to_owned(),
        };
        let message = format!(
            "{}, {}, {}, {}",
            image, dimensions, link_state, self.encoding
        );
        self.reporter.report(&message);
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use image::{DynamicImage, Rgba, RgbaImage};
    use threadpool::ThreadPool;

    use super::{Session, SessionCommand};
    use crate::dimension::linker::DimensionLinker;
    use crate::dimension::{DerivationPolicy, DimensionPair, EditedField};
    use crate::encoder::PixelEncoding;
    use crate::error::Error;
    use crate::raster::loader::{ImageLoader, LoadedImage};
    use crate::raster::resampler::{FilterResampler, ResamplingFilter};
    use crate::sink::{CsvSink, FileNameStyle};
    use crate::status::{self, StatusReporter};

    /// Serves 4x2 images for `*.png` paths and fails for everything else.
    struct FakeLoader;

    impl ImageLoader for FakeLoader {
        fn load(&self, path: &Path) -> crate::Result<LoadedImage> {
            if path.extension().is_some_and(|extension| extension == "png") {
                let image = RgbaImage::from_fn(4, 2, |x, _y| {
                    Rgba([x as u8 * 60, 0, 0, 255])
                });
                return Ok(LoadedImage::from(DynamicImage::ImageRgba8(image)));
            }
            Err(Error::UnableToOpenInputFileForReading(
                path.display().to_string(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        files: HashMap<String, String>,
    }

    impl CsvSink for MemorySink {
        fn deliver(&mut self, csv: &str, file_name: &str) -> crate::Result<PathBuf> {
            self.files.insert(file_name.to_owned(), csv.to_owned());
            Ok(PathBuf::from(file_name))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        messages: Vec<String>,
    }

    impl StatusReporter for RecordingReporter {
        fn report(&mut self, message: &str) {
            self.messages.push(message.to_owned());
        }
    }

    fn with_session<F>(test: F) -> (MemorySink, RecordingReporter)
    where
        F: FnOnce(&mut Session),
    {
        let loader = FakeLoader;
        let resampler = FilterResampler::new(ResamplingFilter::Nearest);
        let threadpool = ThreadPool::new(2);
        let mut sink = MemorySink::default();
        let mut reporter = RecordingReporter::default();
        {
            let linker =
                DimensionLinker::new(DimensionPair::default(), true, DerivationPolicy::LastEdited);
            let mut session = Session::new(
                &loader,
                &resampler,
                &mut sink,
                &mut reporter,
                &threadpool,
                linker,
                PixelEncoding::Grayscale,
                FileNameStyle::WithMode,
            );
            test(&mut session);
        }
        (sink, reporter)
    }

    #[test]
    fn parse_commands() {
        assert_eq!(
            "open  photos/cat.png ".parse::<SessionCommand>(),
            Ok(SessionCommand::Open(PathBuf::from("photos/cat.png")))
        );
        assert_eq!(
            "width 120".parse::<SessionCommand>(),
            Ok(SessionCommand::Width("120".to_owned()))
        );
        assert_eq!(
            "h".parse::<SessionCommand>(),
            Ok(SessionCommand::Height(String::new()))
        );
        assert_eq!(
            "LINK".parse::<SessionCommand>(),
            Ok(SessionCommand::ToggleLink)
        );
        assert_eq!(
            "mode rgb".parse::<SessionCommand>(),
            Ok(SessionCommand::Mode(PixelEncoding::Rgb))
        );
        assert_eq!("exit".parse::<SessionCommand>(), Ok(SessionCommand::Quit));
    }

    #[test]
    fn reject_malformed_commands() {
        assert!("open".parse::<SessionCommand>().is_err());
        assert!("mode sepia".parse::<SessionCommand>().is_err());
        assert!("resize 3".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn select_image_reports_ready() {
        let (_, reporter) = with_session(|session| {
            session.select_image(Path::new("cat.png")).unwrap();
            assert_eq!(session.linker().dimensions(), DimensionPair::new(64, 32));
        });
        assert_eq!(reporter.messages, vec![status::READING_IMAGE, status::READY]);
    }

    #[test]
    fn unreadable_image_clears_selection() {
        let (sink, reporter) = with_session(|session| {
            session.select_image(Path::new("cat.png")).unwrap();
            assert!(session.select_image(Path::new("notes.txt")).is_err());
            assert!(session.linker().aspect_ratio().is_none());
            assert!(matches!(session.convert(), Err(Error::NoImageSelected)));
        });
        assert!(sink.files.is_empty());
        assert!(reporter
            .messages
            .contains(&status::UNREADABLE_IMAGE.to_owned()));
        assert_eq!(
            reporter.messages.last().map(String::as_str),
            Some(status::NO_IMAGE_SELECTED)
        );
    }

    #[test]
    fn convert_writes_resolved_size() {
        let (sink, reporter) = with_session(|session| {
            session.select_image(Path::new("cat.png")).unwrap();
            session.edit(EditedField::Height, 2);
            let path = session.convert().unwrap();
            assert_eq!(path, PathBuf::from("cat_grayscale_4x2.csv"));
        });
        let csv = &sink.files["cat_grayscale_4x2.csv"];
        assert_eq!(csv, "0,13,26,38\n0,13,26,38");
        assert_eq!(
            reporter.messages[2..],
            ["Converting… (4×2)", "Done. Wrote: cat_grayscale_4x2.csv"]
        );
    }

    #[test]
    fn run_replays_typed_commands() {
        let script = "open cat.png\n\nwidth 8\nlink\nheight 1\nlink\nmode rgb\nconvert\nquit\nconvert\n";
        let (sink, _) = with_session(|session| {
            session.run(script.as_bytes()).unwrap();
            assert_eq!(session.encoding(), PixelEncoding::Rgb);
        });
        assert_eq!(sink.files.len(), 1);
        let csv = &sink.files["cat_rgb_2x1.csv"];
        assert_eq!(csv.split(',').count(), 2);
    }

    #[test]
    fn emptied_width_converts_at_default_size() {
        let (sink, _) = with_session(|session| {
            session.run("open cat.png\nwidth\nconvert\n".as_bytes()).unwrap();
            assert_eq!(session.linker().dimensions(), DimensionPair::new(64, 32));
        });
        assert_eq!(sink.files.len(), 1);
        assert!(sink.files.contains_key("cat_grayscale_64x32.csv"));
    }

    #[test]
    fn oversized_width_is_clamped() {
        let (sink, _) = with_session(|session| {
            session
                .run("open cat.png\nlink\nwidth 99999999999\nheight 1\nconvert\n".as_bytes())
                .unwrap();
        });
        let csv = &sink.files["cat_grayscale_4096x1.csv"];
        assert_eq!(csv.split(',').count(), 4096);
    }

    #[test]
    fn run_reports_unknown_commands_and_continues() {
        let (sink, reporter) = with_session(|session| {
            session.run("frobnicate\nopen cat.png\nconvert\n".as_bytes()).unwrap();
        });
        assert_eq!(reporter.messages[0], "Unknown command 'frobnicate'");
        assert_eq!(sink.files.len(), 1);
    }

    #[test]
    fn status_describes_state() {
        let (_, reporter) = with_session(|session| {
            session.apply(SessionCommand::Status);
        });
        assert_eq!(reporter.messages, vec!["no image, 64x64, linked, grayscale"]);
    }
}
