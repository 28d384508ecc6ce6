use std::io;
use std::path::{Path, PathBuf};

pub use cli::CLIParser;
use dimension::{linker::DimensionLinker, DerivationPolicy, DimensionPair, EditedField};
use encoder::PixelEncoding;
use raster::{
    loader::FileImageLoader,
    resampler::{FilterResampler, ResamplingFilter},
};
use session::Session;
use sink::{DirectorySink, FileNameStyle};
use status::ConsoleStatusReporter;
use threadpool::ThreadPool;

mod cli;
pub mod color;
pub mod dimension;
pub mod encoder;
mod error;
mod logger;
pub mod raster;
pub mod session;
pub mod sink;
pub mod status;

pub use error::Error;

pub type Result<T> = std::result::Result<T, error::Error>;

/// A value typed into one of the dimension fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimensionEdit {
    field: EditedField,
    value: i64,
}

pub struct Arguments {
    input_file: Option<PathBuf>,
    dimension_edits: Vec<DimensionEdit>,
    encoding: PixelEncoding,
    linked: bool,
    derivation_policy: DerivationPolicy,
    resampling_filter: ResamplingFilter,
    output_directory: Option<PathBuf>,
    file_name_style: FileNameStyle,
    number_of_threads: usize,
    interactive: bool,
}

impl Arguments {
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn output_directory(&self) -> PathBuf {
        if let Some(directory) = &self.output_directory {
            return directory.clone();
        }
        self.input_file
            .as_deref()
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn with_session<T, F>(arguments: &Arguments, run: F) -> Result<T>
where
    F: FnOnce(&mut Session) -> Result<T>,
{
    let loader = FileImageLoader;
    let resampler = FilterResampler::new(arguments.resampling_filter);
    let mut sink = DirectorySink::new(arguments.output_directory());
    let mut reporter = ConsoleStatusReporter;
    let threadpool = ThreadPool::new(arguments.number_of_threads.max(1));
    let linker = DimensionLinker::new(
        DimensionPair::default(),
        arguments.linked,
        arguments.derivation_policy,
    );
    let mut session = Session::new(
        &loader,
        &resampler,
        &mut sink,
        &mut reporter,
        &threadpool,
        linker,
        arguments.encoding,
        arguments.file_name_style,
    );
    run(&mut session)
}

/// Loads the input file, applies the dimension edits in the order they
/// were given and writes the CSV. Returns the path of the written file.
pub fn convert_image_to_csv(arguments: &Arguments) -> Result<PathBuf> {
    let input_file = arguments.input_file.as_deref().ok_or(Error::NoImageSelected)?;
    with_session(arguments, |session| {
        session.select_image(input_file)?;
        for edit in &arguments.dimension_edits {
            session.edit(edit.field, edit.value);
        }
        session.convert()
    })
}

/// Runs commands from standard input, starting with the input file
/// selected when one was given.
pub fn run_interactive_session(arguments: &Arguments) -> Result<()> {
    with_session(arguments, |session| {
        if let Some(input_file) = arguments.input_file.as_deref() {
            // already reported, the user can open another file
            let _ = session.select_image(input_file);
        }
        for edit in &arguments.dimension_edits {
            session.edit(edit.field, edit.value);
        }
        session.run(io::stdin().lock())
    })
}
