use std::cmp;
use std::fmt::Display;
use std::ops::Range;
use std::str::FromStr;
use std::sync::{mpsc, Arc};

use clap::builder::PossibleValue;
use clap::ValueEnum;
use threadpool::ThreadPool;

use crate::color::{Luma, RgbaDot};
use crate::raster::Raster;

const CELL_SEPARATOR: char = ',';
const ROW_SEPARATOR: &str = "\n";
const JOBS_PER_THREAD: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelEncoding {
    Grayscale,
    Rgb,
}

impl PixelEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Rgb => "rgb",
        }
    }

    fn write_cell(&self, dot: &RgbaDot, line: &mut String) {
        match self {
            Self::Grayscale => line.push_str(&Luma::from(dot).0.to_string()),
            Self::Rgb => {
                line.push_str(&format!("\"{} {} {}\"", dot.red, dot.green, dot.blue))
            }
        }
    }

    /// longest cell this encoding can produce, used to size row buffers
    fn max_cell_length(&self) -> usize {
        match self {
            Self::Grayscale => 3,
            Self::Rgb => 13,
        }
    }
}

impl ValueEnum for PixelEncoding {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Grayscale, Self::Rgb]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Grayscale => Some(PossibleValue::new("Grayscale")),
            Self::Rgb => Some(PossibleValue::new("Rgb")),
        }
    }
}

impl FromStr for PixelEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grayscale" | "gray" => Ok(Self::Grayscale),
            "rgb" => Ok(Self::Rgb),
            _ => Err(format!("Unknown pixel encoding '{}'", s)),
        }
    }
}

impl Display for PixelEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Turns a raster into CSV text: one line per row, one cell per dot, no
/// header and no trailing newline.
pub struct CsvEncoder {
    raster: Arc<Raster>,
    encoding: PixelEncoding,
}

impl CsvEncoder {
    pub fn new(raster: Arc<Raster>, encoding: PixelEncoding) -> Self {
        Self { raster, encoding }
    }

    pub fn encode(&self) -> String {
        encode_rows(&self.raster, self.encoding, 0..self.raster.height() as usize)
    }

    /// Same output as [`Self::encode`], with row chunks spread over the pool.
    pub fn encode_with(&self, threadpool: &ThreadPool) -> String {
        let height = self.raster.height() as usize;
        let rows_per_job = Self::rows_per_job(height, threadpool.max_count());
        let (sender, receiver) = mpsc::channel();
        let mut number_of_jobs = 0;
        for first_row in (0..height).step_by(rows_per_job) {
            let last_row = cmp::min(height, first_row + rows_per_job);
            let raster = Arc::clone(&self.raster);
            let encoding = self.encoding;
            let sender = sender.clone();
            threadpool.execute(move || {
                let chunk = encode_rows(&raster, encoding, first_row..last_row);
                // receiver is alive until every job has reported
                let _ = sender.send((first_row, chunk));
            });
            number_of_jobs += 1;
        }
        drop(sender);

        let mut chunks: Vec<(usize, String)> = receiver.iter().collect();
        if chunks.len() != number_of_jobs {
            log::warn!(
                "{} of {} encoding jobs did not finish, encoding sequentially",
                number_of_jobs - chunks.len(),
                number_of_jobs
            );
            return self.encode();
        }
        chunks.sort_unstable_by_key(|(first_row, _)| *first_row);
        chunks
            .into_iter()
            .map(|(_, chunk)| chunk)
            .collect::<Vec<String>>()
            .join(ROW_SEPARATOR)
    }

    fn rows_per_job(height: usize, number_of_threads: usize) -> usize {
        let number_of_jobs = cmp::max(1, number_of_threads * JOBS_PER_THREAD);
        cmp::max(1, height.div_ceil(number_of_jobs))
    }
}

fn encode_rows(raster: &Raster, encoding: PixelEncoding, rows: Range<usize>) -> String {
    rows.map(|row_index| encode_row(raster, encoding, row_index))
        .collect::<Vec<String>>()
        .join(ROW_SEPARATOR)
}

fn encode_row(raster: &Raster, encoding: PixelEncoding, row_index: usize) -> String {
    let capacity = raster.width() as usize * (encoding.max_cell_length() + 1);
    let mut line = String::with_capacity(capacity);
    for (column_index, dot) in raster.row(row_index).enumerate() {
        if column_index > 0 {
            line.push(CELL_SEPARATOR);
        }
        encoding.write_cell(&dot, &mut line);
    }
    log::trace!("Encoded row {}", row_index);
    line
}
