use crate::dimension::{parse_dimension, DerivationPolicy, EditedField, CONVERSION_FALLBACK};
use crate::encoder::PixelEncoding;
use crate::raster::resampler::ResamplingFilter;
use crate::sink::FileNameStyle;
use crate::{Arguments, DimensionEdit};
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgMatches, Command,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{io, thread};

const WIDTH_ARGUMENT: &str = "width";
const HEIGHT_ARGUMENT: &str = "height";

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_input_file_argument(command);
        let command = Self::register_width_argument(command);
        let command = Self::register_height_argument(command);
        let command = Self::register_mode_argument(command);
        let command = Self::register_unlinked_argument(command);
        let command = Self::register_derivation_argument(command);
        let command = Self::register_filter_argument(command);
        let command = Self::register_output_directory_argument(command);
        let command = Self::register_naming_argument(command);
        let command = Self::register_threads_argument(command);
        Self::register_interactive_argument(command)
    }

    fn register_input_file_argument(command: Command) -> Command {
        command.arg(Self::create_input_file_argument())
    }

    fn register_width_argument(command: Command) -> Command {
        command.arg(Self::create_width_argument())
    }

    fn register_height_argument(command: Command) -> Command {
        command.arg(Self::create_height_argument())
    }

    fn register_mode_argument(command: Command) -> Command {
        command.arg(Self::create_mode_argument())
    }

    fn register_unlinked_argument(command: Command) -> Command {
        command.arg(Self::create_unlinked_argument())
    }

    fn register_derivation_argument(command: Command) -> Command {
        command.arg(Self::create_derivation_argument())
    }

    fn register_filter_argument(command: Command) -> Command {
        command.arg(Self::create_filter_argument())
    }

    fn register_output_directory_argument(command: Command) -> Command {
        command.arg(Self::create_output_directory_argument())
    }

    fn register_naming_argument(command: Command) -> Command {
        command.arg(Self::create_naming_argument())
    }

    fn register_threads_argument(command: Command) -> Command {
        command.arg(Self::create_threads_argument())
    }

    fn register_interactive_argument(command: Command) -> Command {
        command.arg(Self::create_interactive_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_input_file_argument() -> Arg {
        Arg::new("input_file")
            .help("Path to the image to convert")
            .value_parser(value_parser!(PathBuf))
            .required_unless_present("interactive")
    }

    fn create_width_argument() -> Arg {
        arg!(width: -W --width <WIDTH> "Output width in pixels")
            .required(false)
            .allow_hyphen_values(true)
            .value_parser(value_parser!(String))
    }

    fn create_height_argument() -> Arg {
        arg!(height: -H --height <HEIGHT> "Output height in pixels")
            .required(false)
            .allow_hyphen_values(true)
            .value_parser(value_parser!(String))
    }

    fn create_mode_argument() -> Arg {
        arg!(mode: -m --mode <MODE> "Per-cell pixel encoding")
            .default_value("Grayscale")
            .value_parser(value_parser!(PixelEncoding))
    }

    fn create_unlinked_argument() -> Arg {
        arg!(unlinked: -u --unlinked "Do not keep the aspect ratio of the input image")
    }

    fn create_derivation_argument() -> Arg {
        arg!(derivation: -d --derivation <POLICY> "Field that drives the other one when linked")
            .default_value("LastEdited")
            .value_parser(value_parser!(DerivationPolicy))
    }

    fn create_filter_argument() -> Arg {
        arg!(filter: -f --filter <FILTER> "Resampling filter")
            .default_value("Triangle")
            .value_parser(value_parser!(ResamplingFilter))
    }

    fn create_output_directory_argument() -> Arg {
        arg!(output_dir: -o --output_dir <DIR> "Directory for the CSV file [default: directory of the input file]")
            .required(false)
            .value_parser(value_parser!(PathBuf))
    }

    fn create_naming_argument() -> Arg {
        arg!(naming: -n --naming <STYLE> "Output file naming style")
            .default_value("WithMode")
            .value_parser(value_parser!(FileNameStyle))
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of Threads")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn create_interactive_argument() -> Arg {
        arg!(interactive: -i --interactive "Read commands from standard input")
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            input_file: Self::extract_input_file_argument(matches),
            dimension_edits: Self::extract_dimension_edits(matches),
            encoding: Self::extract_mode_argument(matches),
            linked: !Self::extract_unlinked_argument(matches),
            derivation_policy: Self::extract_derivation_argument(matches),
            resampling_filter: Self::extract_filter_argument(matches),
            output_directory: Self::extract_output_directory_argument(matches),
            file_name_style: Self::extract_naming_argument(matches),
            number_of_threads: Self::extract_threads_argument(matches),
            interactive: Self::extract_interactive_argument(matches),
        }
    }

    fn extract_input_file_argument(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("input_file").cloned()
    }

    /// The field given later on the command line counts as edited last.
    fn extract_dimension_edits(matches: &ArgMatches) -> Vec<DimensionEdit> {
        let mut indexed_edits: Vec<(usize, DimensionEdit)> = [
            (WIDTH_ARGUMENT, EditedField::Width),
            (HEIGHT_ARGUMENT, EditedField::Height),
        ]
        .into_iter()
        .filter_map(|(id, field)| {
            let index = matches.index_of(id)?;
            let text = matches.get_one::<String>(id)?;
            let value = parse_dimension(text, CONVERSION_FALLBACK);
            Some((index, DimensionEdit { field, value }))
        })
        .collect();
        indexed_edits.sort_by_key(|(index, _)| *index);
        indexed_edits.into_iter().map(|(_, edit)| edit).collect()
    }

    fn extract_mode_argument(matches: &ArgMatches) -> PixelEncoding {
        matches
            .get_one::<PixelEncoding>("mode")
            .expect("Mode must be provided, but was unset.")
            .to_owned()
    }

    fn extract_unlinked_argument(matches: &ArgMatches) -> bool {
        matches.get_flag("unlinked")
    }

    fn extract_derivation_argument(matches: &ArgMatches) -> DerivationPolicy {
        matches
            .get_one::<DerivationPolicy>("derivation")
            .expect("Derivation policy must be provided, but was unset.")
            .to_owned()
    }

    fn extract_filter_argument(matches: &ArgMatches) -> ResamplingFilter {
        matches
            .get_one::<ResamplingFilter>("filter")
            .expect("Resampling filter must be provided, but was unset.")
            .to_owned()
    }

    fn extract_output_directory_argument(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("output_dir").cloned()
    }

    fn extract_naming_argument(matches: &ArgMatches) -> FileNameStyle {
        matches
            .get_one::<FileNameStyle>("naming")
            .expect("Naming style must be provided, but was unset.")
            .to_owned()
    }

    fn extract_threads_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("threads")
            .expect("Required argument threads not provided")
            .to_owned()
    }

    fn extract_interactive_argument(matches: &ArgMatches) -> bool {
        matches.get_flag("interactive")
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}
